//! A catalog client that can be seeded with mock responses.
//!
//! Only available in tests or with the `tests` feature enabled.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;

use crate::client::ClientTrait;
use crate::error::CatalogClientError;
use crate::types::Product;

type MockField<T> = Arc<Mutex<T>>;

/// A canned response to a single request.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Products(Vec<Product>),
    Status(StatusCode),
}

#[derive(Debug, Clone)]
struct Queued {
    response: MockResponse,
    delay: Duration,
}

/// A catalog client that answers from per-endpoint queues of responses.
///
/// Clones share their queues and call history,
/// so a test can keep a handle after moving the client into its consumer.
#[derive(Debug, Default, Clone)]
pub struct MockClient {
    list_responses: MockField<VecDeque<Queued>>,
    search_responses: MockField<VecDeque<Queued>>,
    list_calls: MockField<usize>,
    search_terms: MockField<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new response for `list_products`
    pub fn push_list_response(&self, products: Vec<Product>) {
        push(&self.list_responses, MockResponse::Products(products), Duration::ZERO);
    }

    /// Push an error status for `list_products`
    pub fn push_list_error(&self, status: StatusCode) {
        push(&self.list_responses, MockResponse::Status(status), Duration::ZERO);
    }

    /// Push a new response for `search_products`
    pub fn push_search_response(&self, products: Vec<Product>) {
        self.push_search_response_delayed(products, Duration::ZERO);
    }

    /// Push a response for `search_products` that only arrives after `delay`
    pub fn push_search_response_delayed(&self, products: Vec<Product>, delay: Duration) {
        push(&self.search_responses, MockResponse::Products(products), delay);
    }

    /// Push an error status for `search_products`
    pub fn push_search_error(&self, status: StatusCode) {
        push(&self.search_responses, MockResponse::Status(status), Duration::ZERO);
    }

    /// Number of `list_products` calls received so far
    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().expect("couldn't acquire mock lock")
    }

    /// Search terms received so far, in call order
    pub fn search_terms(&self) -> Vec<String> {
        self.search_terms
            .lock()
            .expect("couldn't acquire mock lock")
            .clone()
    }
}

fn push(queue: &MockField<VecDeque<Queued>>, response: MockResponse, delay: Duration) {
    queue
        .lock()
        .expect("couldn't acquire mock lock")
        .push_back(Queued { response, delay });
}

async fn respond(queue: &MockField<VecDeque<Queued>>) -> Result<Vec<Product>, CatalogClientError> {
    let queued = queue
        .lock()
        .expect("couldn't acquire mock lock")
        .pop_front();

    let Some(Queued { response, delay }) = queued else {
        return Err(CatalogClientError::Other(
            "no mock response queued".to_string(),
        ));
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    match response {
        MockResponse::Products(products) => Ok(products),
        MockResponse::Status(status) => Err(CatalogClientError::UnexpectedStatus(status)),
    }
}

impl ClientTrait for MockClient {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogClientError> {
        *self.list_calls.lock().expect("couldn't acquire mock lock") += 1;
        respond(&self.list_responses).await
    }

    async fn search_products(
        &self,
        search_term: impl AsRef<str> + Send + Sync,
    ) -> Result<Vec<Product>, CatalogClientError> {
        let search_term = search_term.as_ref();
        if search_term.trim().is_empty() {
            return Err(CatalogClientError::EmptySearchTerm);
        }
        self.search_terms
            .lock()
            .expect("couldn't acquire mock lock")
            .push(search_term.to_string());
        respond(&self.search_responses).await
    }
}

/// Construct a product with plausible values for the remaining fields.
pub fn mock_product(id: u64, name: &str) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: Some(format!("Description of {name}")),
        category: "Accessories".to_string(),
        brand: Some("TechCorp".to_string()),
        price: 25.0,
        stock_quantity: 200,
        sku: format!("SKU-{id:04}"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn responses_are_served_in_order() {
        let client = MockClient::new();
        client.push_search_response(vec![mock_product(1, "mouse")]);
        client.push_search_error(StatusCode::BAD_GATEWAY);

        let first = client.search_products("mouse").await.unwrap();
        assert_eq!(first, vec![mock_product(1, "mouse")]);

        let second = client.search_products("keyboard").await;
        assert!(
            matches!(
                second,
                Err(CatalogClientError::UnexpectedStatus(StatusCode::BAD_GATEWAY))
            ),
            "expected UnexpectedStatus, found: {second:?}"
        );

        assert_eq!(client.search_terms(), ["mouse", "keyboard"]);
    }

    #[tokio::test]
    async fn exhausted_queue_is_an_error() {
        let client = MockClient::new();
        let result = client.list_products().await;
        assert!(matches!(result, Err(CatalogClientError::Other(_))));
        assert_eq!(client.list_calls(), 1);
    }
}
