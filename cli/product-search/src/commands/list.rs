use std::time::Duration;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use product_catalog::{ClientTrait, Product};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::search::LOAD_FAILED_MESSAGE;
use crate::utils::dialog::{Dialog, Spinner};
use crate::utils::init::init_catalog_client;
use crate::utils::render::DisplayProducts;

/// How long to wait for the catalog before showing a spinner
pub(crate) const SPINNER_DELAY: Duration = Duration::from_millis(250);

// List every product in the catalog
#[derive(Debug, Bpaf, Clone)]
pub struct List {
    /// Display products as a JSON array
    #[bpaf(long)]
    pub json: bool,
}

impl List {
    #[instrument(name = "list", fields(json = self.json), skip_all)]
    pub async fn handle(self, config: Config) -> Result<()> {
        let client = init_catalog_client(&config)?;
        let products = list_products(&client).await?;
        debug!(n_products = products.len(), "listed products");
        println!("{}", format_products(&products, self.json)?);
        Ok(())
    }
}

pub(crate) async fn list_products(client: &impl ClientTrait) -> Result<Vec<Product>> {
    Dialog {
        message: "Loading products...",
        typed: Spinner::new(client.list_products()),
    }
    .spin_with_delay(SPINNER_DELAY)
    .await
    .context(LOAD_FAILED_MESSAGE)
}

/// Render products for one-shot commands, as cards or as JSON
pub(crate) fn format_products(products: &[Product], json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(products).context("Could not serialize products");
    }
    Ok(DisplayProducts(products).to_string())
}
