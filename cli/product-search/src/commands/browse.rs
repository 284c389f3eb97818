use anyhow::{Result, bail};
use bpaf::Bpaf;
use indoc::indoc;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::search::{Debouncer, SearchController, ViewState, run_session};
use crate::utils::dialog::Dialog;
use crate::utils::init::{init_catalog_client, redirect_logs_to_file};
use crate::utils::message;
use crate::utils::terminal::{TerminalGuard, TerminalView, terminal_inputs};

// Browse the catalog interactively
#[derive(Debug, Bpaf, Clone)]
pub struct Browse {}

impl Browse {
    #[instrument(name = "browse", skip_all)]
    pub async fn handle(self, config: Config) -> Result<()> {
        if !Dialog::can_prompt() {
            bail!(indoc! {"
                'browse' needs an interactive terminal.

                Use 'product-search list' or 'product-search search <term>' instead.
            "});
        }

        let client = init_catalog_client(&config)?;

        // the terminal UI owns stderr until the guard is dropped
        let log_file = config.log_file();
        redirect_logs_to_file(&log_file)?;
        debug!(?log_file, catalog_url = client.catalog_url(), "starting browse session");

        let debouncer = Debouncer::new(String::new(), config.debounce_delay());
        debug!(delay = ?debouncer.delay(), "debouncing search input");

        let final_state = {
            let _guard = TerminalGuard::enter()?;
            let mut view = TerminalView::new(std::io::stdout());
            run_session(
                SearchController::new(client),
                debouncer,
                terminal_inputs(),
                &mut view,
            )
            .await?
        };

        if let ViewState::Failed(message) = final_state {
            message::warning(format!(
                "{message} See {} for details.",
                log_file.display()
            ));
        }
        Ok(())
    }
}
