mod browse;
mod list;
mod search;

use std::fmt;

use anyhow::Result;
use bpaf::Bpaf;
use tracing::debug;

use crate::config::Config;

const DESCRIPTION: &str = "Search a product catalog as you type";

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(DESCRIPTION))]
pub struct SearchCli(#[bpaf(external(search_args))] pub SearchArgs);

/// Main args parser
///
/// To parse the full command line, use [`SearchCli`] via [`search_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)] // we don't want this struct to be interpreted as a group
pub struct SearchArgs {
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    /// Base URL of the product catalog
    #[bpaf(long, argument("URL"))]
    pub catalog_url: Option<String>,

    /// Milliseconds the search field has to be idle before searching
    #[bpaf(long, argument("MS"))]
    pub debounce_ms: Option<u64>,

    #[bpaf(external(commands), optional)]
    command: Option<Commands>,
}

impl SearchArgs {
    /// Apply command line overrides to `config` and run the selected command
    pub async fn handle(self, mut config: Config) -> Result<()> {
        if let Some(catalog_url) = self.catalog_url {
            config.catalog_url = catalog_url;
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config.debounce_ms = debounce_ms;
        }
        debug!(?config, command = ?self.command, "running command");

        match self.command.unwrap_or(Commands::Browse(browse::Browse {})) {
            Commands::Browse(args) => args.handle(config).await,
            Commands::List(args) => args.handle(config).await,
            Commands::Search(args) => args.handle(config).await,
        }
    }
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// Browse the catalog interactively, searching as you type (default)
    #[bpaf(command)]
    Browse(#[bpaf(external(browse::browse))] browse::Browse),

    /// List every product in the catalog
    #[bpaf(command)]
    List(#[bpaf(external(list::list))] list::List),

    /// Search the catalog once and print the results
    #[bpaf(command)]
    Search(#[bpaf(external(search::search))] search::Search),
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Commands::Browse(_) => write!(f, "browse"),
            Commands::List(_) => write!(f, "list"),
            Commands::Search(_) => write!(f, "search"),
        }
    }
}
