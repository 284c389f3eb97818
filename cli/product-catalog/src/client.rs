//! Catalog client for the product listing and search endpoints.

use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{self, HeaderMap};
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::CatalogClientError;
use crate::types::Product;

/// Path of the endpoint listing every product, relative to the catalog URL.
pub const PRODUCTS_PATH: &str = "products";
/// Path of the search endpoint, relative to the catalog URL.
pub const SEARCH_PATH: &str = "products/search";

const SEARCH_QUERY_PARAM: &str = "q";

/// A client for the catalog service.
///
/// This is a thin wrapper around [`reqwest::Client`] that handles:
/// - HTTP client configuration with timeouts
/// - Default headers (extra headers, user agent)
/// - Resolution of endpoint paths against the configured base URL
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let base_url = parse_base_url(&config.catalog_url)?;
        let client = build_http_client(&config)?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get the configured catalog URL.
    pub fn catalog_url(&self) -> &str {
        &self.config.catalog_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogClientError> {
        self.base_url
            .join(path)
            .map_err(|source| CatalogClientError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    /// GET a JSON array of products.
    ///
    /// Any non-2xx status is an error, the body of such responses is ignored.
    async fn fetch_products(&self, url: Url) -> Result<Vec<Product>, CatalogClientError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(CatalogClientError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogClientError::UnexpectedStatus(status));
        }

        response
            .json::<Vec<Product>>()
            .await
            .map_err(CatalogClientError::Decode)
    }
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// The catalog API interface.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the catalog API via [`CatalogClient`]
/// - **Mock** (tests): Canned responses without HTTP via [`crate::MockClient`]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// List every product in the catalog.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogClientError>;

    /// Search for products matching a search term.
    ///
    /// Blank search terms are rejected without contacting the catalog.
    async fn search_products(
        &self,
        search_term: impl AsRef<str> + Send + Sync,
    ) -> Result<Vec<Product>, CatalogClientError>;
}

impl ClientTrait for CatalogClient {
    #[instrument(skip_all)]
    async fn list_products(&self) -> Result<Vec<Product>, CatalogClientError> {
        let url = self.endpoint(PRODUCTS_PATH)?;
        debug!(%url, "listing products");

        let products = self.fetch_products(url).await?;

        debug!(n_products = products.len(), "received products");
        Ok(products)
    }

    #[instrument(skip_all, fields(search_term = %search_term.as_ref()))]
    async fn search_products(
        &self,
        search_term: impl AsRef<str> + Send + Sync,
    ) -> Result<Vec<Product>, CatalogClientError> {
        let search_term = search_term.as_ref();
        if search_term.trim().is_empty() {
            return Err(CatalogClientError::EmptySearchTerm);
        }

        let mut url = self.endpoint(SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair(SEARCH_QUERY_PARAM, search_term);
        debug!(%url, "sending search request");

        let products = self.fetch_products(url).await?;

        debug!(n_products = products.len(), "received search results");
        Ok(products)
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Parse the configured catalog URL as a base for endpoint paths.
///
/// A trailing slash is added if missing,
/// so that joining keeps any path prefix of the catalog URL.
fn parse_base_url(raw: &str) -> Result<Url, CatalogClientError> {
    let mut url = Url::parse(raw).map_err(|source| CatalogClientError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build HTTP client with default headers for the catalog API.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| CatalogClientError::Other(e.to_string()),
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| CatalogClientError::Other(e.to_string()),
            )?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(15))
        .timeout(Duration::from_secs(60));

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|e| CatalogClientError::Other(e.to_string()))
}
