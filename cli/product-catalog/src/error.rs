//! Error handling for catalog API operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Common error type for catalog API operations.
///
/// Callers presenting errors to users are not expected to distinguish
/// between these; they exist so that logs carry the actual cause.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("invalid catalog url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("search term must not be empty")]
    EmptySearchTerm,
    #[error("could not reach the catalog")]
    Transport(#[source] reqwest::Error),
    #[error("catalog responded with unexpected status {0}")]
    UnexpectedStatus(StatusCode),
    #[error("could not decode catalog response")]
    Decode(#[source] reqwest::Error),
    #[error("{0}")]
    Other(String),
}
