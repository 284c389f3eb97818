use std::future::Future;
use std::io::IsTerminal;
use std::pin::pin;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub struct Spinner<F>(F);
impl<F: Future> Spinner<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[derive(Debug, Clone)]
pub struct Dialog<'a, Type> {
    pub message: &'a str,
    pub typed: Type,
}

impl<F: Future> Dialog<'_, Spinner<F>> {
    /// Await the wrapped future,
    /// showing a spinner if it takes longer than `start_spinning_after`.
    pub async fn spin_with_delay(self, start_spinning_after: Duration) -> F::Output {
        let mut work = pin!(self.typed.0);

        tokio::select! {
            output = &mut work => return output,
            _ = tokio::time::sleep(start_spinning_after) => {},
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {wide_msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(self.message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));

        let output = work.await;
        spinner.finish_and_clear();
        output
    }
}

impl Dialog<'_, ()> {
    /// True if stdin and stdout are ttys
    pub fn can_prompt() -> bool {
        std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fast_work_returns_output() {
        let output = Dialog {
            message: "Working...",
            typed: Spinner::new(async { 42 }),
        }
        .spin_with_delay(Duration::from_secs(1))
        .await;

        assert_eq!(output, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_work_returns_output() {
        let output = Dialog {
            message: "Working...",
            typed: Spinner::new(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "done"
            }),
        }
        .spin_with_delay(Duration::from_millis(10))
        .await;

        assert_eq!(output, "done");
    }
}
