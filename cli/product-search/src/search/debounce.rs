//! Time based coalescing of rapidly changing values.

use std::fmt::Debug;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep, sleep_until};
use tracing::trace;

/// Delay after the last keystroke before a query is sent to the catalog.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Delays a changing value until it has been stable for a fixed delay.
///
/// Every [Debouncer::push] replaces the pending value and restarts the timer,
/// so a burst of updates spaced less than `delay` apart settles exactly once,
/// `delay` after the last update, with the last value.
///
/// The debouncer remembers the last value it emitted.
/// A settled value equal to it is swallowed,
/// e.g. typing a character and deleting it again does not produce an update.
///
/// The debouncer does not spawn anything;
/// the timer only advances while [Debouncer::settled] is polled.
/// Dropping the debouncer discards the pending value.
pub struct Debouncer<T> {
    delay: Duration,
    current: T,
    pending: Option<Pending<T>>,
}

struct Pending<T> {
    value: T,
    timer: Pin<Box<Sleep>>,
}

impl<T: Debug> Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("current", &self.current)
            .field("pending", &self.pending.as_ref().map(|p| &p.value))
            .finish()
    }
}

impl<T: Clone + PartialEq> Debouncer<T> {
    /// Create a debouncer whose last emitted value is `initial`.
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            current: initial,
            pending: None,
        }
    }

    /// Replace the pending value and restart the timer.
    pub fn push(&mut self, value: T) {
        let deadline = Instant::now() + self.delay;
        match &mut self.pending {
            Some(pending) => {
                trace!("restarting debounce timer");
                pending.value = value;
                pending.timer.as_mut().reset(deadline);
            },
            None => {
                trace!("starting debounce timer");
                self.pending = Some(Pending {
                    value,
                    timer: Box::pin(sleep_until(deadline)),
                });
            },
        }
    }

    /// Whether a value is waiting for its timer.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The last emitted value.
    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the pending value to settle.
    ///
    /// Returns `None` immediately if nothing is pending,
    /// and `None` once settled if the value equals the last emitted one.
    ///
    /// Cancel safe: dropping the returned future keeps the pending value
    /// and its deadline.
    pub async fn settled(&mut self) -> Option<T> {
        let pending = self.pending.as_mut()?;
        pending.timer.as_mut().await;

        let Pending { value, .. } = self.pending.take()?;
        if value == self.current {
            trace!("settled value unchanged");
            return None;
        }

        self.current = value.clone();
        Some(value)
    }
}
