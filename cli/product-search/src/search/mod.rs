//! Interactive product search: debouncing, request state and the event loop.

pub mod controller;
pub mod debounce;
pub mod session;

pub use controller::{LOAD_FAILED_MESSAGE, SEARCH_FAILED_MESSAGE, SearchController, ViewState};
pub use debounce::{DEFAULT_DEBOUNCE_DELAY, Debouncer};
pub use session::{Input, View, run_session};
