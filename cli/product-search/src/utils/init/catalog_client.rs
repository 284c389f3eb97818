use std::collections::BTreeMap;

use anyhow::{Context, Result};
use product_catalog::{CatalogClient, CatalogClientConfig};
use tracing::debug;

use crate::config::Config;

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("product-search/", env!("CARGO_PKG_VERSION"));

/// Initialize the catalog client from the merged configuration
pub fn init_catalog_client(config: &Config) -> Result<CatalogClient> {
    let mut extra_headers: BTreeMap<String, String> = BTreeMap::new();

    // Pass in a bool if we are running in CI, so requests can reflect this in the headers
    if std::env::var("CI").is_ok() {
        extra_headers.insert("product-search-ci".to_string(), "true".to_string());
    };

    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    debug!(catalog_url = %config.catalog_url, %user_agent, "using catalog client");
    CatalogClient::new(CatalogClientConfig {
        catalog_url: config.catalog_url.clone(),
        extra_headers,
        user_agent: Some(user_agent),
    })
    .with_context(|| format!("Could not create catalog client for '{}'", config.catalog_url))
}
