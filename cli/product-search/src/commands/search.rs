use anyhow::{Context, Result, bail};
use bpaf::Bpaf;
use product_catalog::{ClientTrait, Product};
use tracing::{debug, instrument};

use super::list::{SPINNER_DELAY, format_products};
use crate::config::Config;
use crate::search::SEARCH_FAILED_MESSAGE;
use crate::utils::dialog::{Dialog, Spinner};
use crate::utils::init::init_catalog_client;
use crate::utils::message;

// Search the catalog once
#[derive(Debug, Bpaf, Clone)]
pub struct Search {
    /// Display search results as a JSON array
    #[bpaf(long)]
    pub json: bool,

    /// Text to match against product names, SKUs, brands and descriptions
    #[bpaf(positional("search-term"))]
    pub search_term: String,
}

impl Search {
    #[instrument(name = "search", fields(json = self.json, search_term = self.search_term), skip_all)]
    pub async fn handle(self, config: Config) -> Result<()> {
        let client = init_catalog_client(&config)?;
        let products = search_products(&client, &self.search_term).await?;
        debug!(n_products = products.len(), "search finished");

        if products.is_empty() && !self.json {
            message::warning(format!("No products match '{}'", self.search_term));
            return Ok(());
        }
        println!("{}", format_products(&products, self.json)?);
        Ok(())
    }
}

async fn search_products(client: &impl ClientTrait, search_term: &str) -> Result<Vec<Product>> {
    if search_term.trim().is_empty() {
        bail!("Search term must not be empty, use 'list' to show every product");
    }

    Dialog {
        message: &format!("Searching for '{search_term}'..."),
        typed: Spinner::new(client.search_products(search_term)),
    }
    .spin_with_delay(SPINNER_DELAY)
    .await
    .context(SEARCH_FAILED_MESSAGE)
}
