//! Search state owned by a browse session.
//!
//! The controller decides which catalog request to issue for a query
//! and folds the responses into a single [ViewState].

use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use product_catalog::{CatalogClientError, ClientTrait, Product};
use tracing::{debug, error};

use crate::utils::errors::display_chain;

/// Shown when the initial listing fails.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to fetch products. Is the backend running?";
/// Shown when a search fails.
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to perform search.";

/// What the view displays.
///
/// A single variant at a time,
/// so a loading indicator and an error are never shown together.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Loaded(Vec<Product>),
    Failed(String),
}

impl ViewState {
    /// The displayed products, empty unless loaded.
    pub fn products(&self) -> &[Product] {
        match self {
            ViewState::Loaded(products) => products,
            ViewState::Loading | ViewState::Failed(_) => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            ViewState::Loading | ViewState::Loaded(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    ListAll,
    Search(String),
}

impl Request {
    fn failure_message(&self) -> &'static str {
        match self {
            Request::ListAll => LOAD_FAILED_MESSAGE,
            Request::Search(_) => SEARCH_FAILED_MESSAGE,
        }
    }
}

type Response = LocalBoxFuture<'static, Result<Vec<Product>, CatalogClientError>>;

struct InFlight {
    generation: u64,
    request: Request,
    response: Response,
}

/// Issues catalog requests and owns the resulting [ViewState].
///
/// At most one request is in flight.
/// Issuing a request drops the previous one, which cancels it,
/// and every request is tagged with an increasing generation
/// so that only the most recently issued request can change the state.
///
/// Requests only make progress while [SearchController::settle] is polled.
/// Dropping the controller cancels the in-flight request.
pub struct SearchController<C> {
    client: Rc<C>,
    state: ViewState,
    generation: u64,
    in_flight: Option<InFlight>,
}

impl<C: ClientTrait + 'static> SearchController<C> {
    pub fn new(client: C) -> Self {
        Self {
            client: Rc::new(client),
            state: ViewState::Loading,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn products(&self) -> &[Product] {
        self.state.products()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Consume the controller, cancelling any in-flight request.
    pub fn into_state(self) -> ViewState {
        self.state
    }

    /// Whether a request is waiting to be settled.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// List every product, replacing whatever is displayed.
    pub fn load_initial(&mut self) {
        self.issue(Request::ListAll);
    }

    /// React to a settled query.
    ///
    /// Blank queries keep the displayed state as is and issue no request.
    /// Returns whether a request was issued.
    pub fn on_query_change(&mut self, query: &str) -> bool {
        if query.trim().is_empty() {
            debug!("blank query, keeping displayed products");
            return false;
        }

        self.issue(Request::Search(query.to_string()));
        true
    }

    fn issue(&mut self, request: Request) {
        self.generation += 1;

        if let Some(superseded) = self.in_flight.take() {
            debug!(
                generation = superseded.generation,
                request = ?superseded.request,
                "cancelling superseded request"
            );
        }

        let client = Rc::clone(&self.client);
        let response: Response = match &request {
            Request::ListAll => async move { client.list_products().await }.boxed_local(),
            Request::Search(term) => {
                let term = term.clone();
                async move { client.search_products(term).await }.boxed_local()
            },
        };

        debug!(generation = self.generation, ?request, "issuing request");
        self.in_flight = Some(InFlight {
            generation: self.generation,
            request,
            response,
        });
        self.state = ViewState::Loading;
    }

    /// Drive the in-flight request to completion and apply its result.
    ///
    /// Returns immediately with `false` if nothing is in flight,
    /// otherwise returns whether the state changed.
    ///
    /// Cancel safe: dropping the returned future leaves the request in flight.
    pub async fn settle(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return false;
        };
        let result = in_flight.response.as_mut().await;

        let Some(InFlight {
            generation,
            request,
            ..
        }) = self.in_flight.take()
        else {
            return false;
        };
        self.apply(generation, &request, result)
    }

    fn apply(
        &mut self,
        generation: u64,
        request: &Request,
        result: Result<Vec<Product>, CatalogClientError>,
    ) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                latest = self.generation,
                "discarding response of superseded request"
            );
            return false;
        }

        self.state = match result {
            Ok(products) => {
                debug!(generation, n_products = products.len(), "request succeeded");
                ViewState::Loaded(products)
            },
            Err(err) => {
                error!(generation, ?request, "{}", display_chain(&err));
                ViewState::Failed(request.failure_message().to_string())
            },
        };
        true
    }
}
