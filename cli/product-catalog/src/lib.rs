//! HTTP client for the product catalog API.
//!
//! This crate provides:
//! - The [`Product`] record served by the catalog
//! - HTTP client construction with default headers and timeouts
//! - The [`ClientTrait`] seam for listing and searching products
//! - A canned-response [`MockClient`] for tests (feature-gated)
//!
//! ## Usage
//!
//! ```ignore
//! use product_catalog::{CatalogClient, CatalogClientConfig, ClientTrait};
//!
//! let config = CatalogClientConfig {
//!     catalog_url: "http://127.0.0.1:5000".to_string(),
//!     extra_headers: BTreeMap::new(),
//!     user_agent: None,
//! };
//!
//! let client = CatalogClient::new(config)?;
//! let products = client.search_products("laptop").await?;
//! ```

mod client;
mod config;
mod error;
mod types;

#[cfg(any(test, feature = "tests"))]
pub mod mock;

pub use client::{CatalogClient, ClientTrait, PRODUCTS_PATH, SEARCH_PATH};
pub use config::{CatalogClientConfig, DEFAULT_CATALOG_URL};
pub use error::CatalogClientError;
pub use reqwest::StatusCode;
#[cfg(any(test, feature = "tests"))]
pub use mock::MockClient;
pub use types::{Product, ProductId};
