//! The browse event loop.
//!
//! Wires user input through the [Debouncer] into the [SearchController]
//! and re-renders a [View] whenever what it shows may have changed.

use anyhow::Result;
use futures::{Stream, StreamExt};
use product_catalog::ClientTrait;
use tracing::debug;

use super::controller::{SearchController, ViewState};
use super::debounce::Debouncer;

/// User input driving a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The full text of the search field after an edit.
    Query(String),
    Quit,
}

/// Something that can display the search field and the [ViewState].
pub trait View {
    fn render(&mut self, query: &str, state: &ViewState) -> Result<()>;
}

/// Run a browse session until [Input::Quit] is received.
///
/// If `inputs` ends without [Input::Quit],
/// the pending query and any in-flight request are still completed.
/// Returns the state displayed last.
pub async fn run_session<C, S, V>(
    mut controller: SearchController<C>,
    mut debouncer: Debouncer<String>,
    mut inputs: S,
    view: &mut V,
) -> Result<ViewState>
where
    C: ClientTrait + 'static,
    S: Stream<Item = Input> + Unpin,
    V: View,
{
    let mut query = debouncer.current().clone();
    let mut inputs_closed = false;

    controller.load_initial();
    view.render(&query, controller.state())?;

    loop {
        if inputs_closed && !debouncer.is_pending() && !controller.is_busy() {
            debug!("input closed and nothing pending, ending session");
            break;
        }

        tokio::select! {
            input = inputs.next(), if !inputs_closed => match input {
                Some(Input::Query(text)) => {
                    query = text;
                    debouncer.push(query.clone());
                    view.render(&query, controller.state())?;
                },
                Some(Input::Quit) => {
                    debug!("quit requested");
                    break;
                },
                None => {
                    debug!("input closed, draining pending work");
                    inputs_closed = true;
                },
            },
            settled = debouncer.settled(), if debouncer.is_pending() => {
                let issued = settled.is_some_and(|settled| controller.on_query_change(&settled));
                if issued {
                    view.render(&query, controller.state())?;
                }
            },
            changed = controller.settle(), if controller.is_busy() => {
                if changed {
                    debug!(
                        loading = controller.is_loading(),
                        n_products = controller.products().len(),
                        error = controller.error(),
                        "request settled"
                    );
                    view.render(&query, controller.state())?;
                }
            },
        }
    }

    Ok(controller.into_state())
}
