use std::path::Path;
use std::sync::PoisonError;

use anyhow::{Context, Result, bail};
use once_cell::sync::OnceCell;
use tracing::{debug, error};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::commands::Verbosity;
use crate::utils::TERMINAL_STDERR;

/// Where formatted log lines go, swapped out while a full screen UI runs
type OutputLayer = Box<dyn Layer<Registry> + Send + Sync>;

struct LockingTerminalStderr;
impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LockingTerminalStderr {
    type Writer = LockingTerminalStderr;

    fn make_writer(&'a self) -> Self::Writer {
        LockingTerminalStderr
    }
}

impl std::io::Write for LockingTerminalStderr {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        TERMINAL_STDERR
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        TERMINAL_STDERR
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

static LOGGER_HANDLE: OnceCell<Handle<EnvFilter, Registry>> = OnceCell::new();
static OUTPUT_HANDLE: OnceCell<Handle<OutputLayer, Registry>> = OnceCell::new();

/// Log filter directives for a verbosity level.
pub(crate) fn log_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        // Show only errors
        Verbosity::Quiet => "off,product_search=error,product_catalog=error",
        // Only show warnings
        Verbosity::Verbose(0) => "off,product_search=warn,product_catalog=warn",
        // Show our own info logs
        Verbosity::Verbose(1) => "off,product_search=info,product_catalog=info",
        // Also show debug from our libraries
        Verbosity::Verbose(2) => "off,product_search=debug,product_catalog=debug",
        // Also show trace from our libraries
        Verbosity::Verbose(3) => "off,product_search=trace,product_catalog=trace",
        // Also show debug from dependencies
        Verbosity::Verbose(4) => "debug,product_search=trace,product_catalog=trace",
        Verbosity::Verbose(_) => "trace",
    }
}

pub(crate) fn init_logger(verbosity: Option<Verbosity>) {
    let verbosity = verbosity.unwrap_or_default();

    let filter_handle = LOGGER_HANDLE.get_or_init(|| {
        let (subscriber, reload_handle, output_handle) = create_registry_and_reload_handles();
        subscriber.init();
        // only set here, next to the filter handle
        let _ = OUTPUT_HANDLE.set(output_handle);
        reload_handle
    });

    update_filters(filter_handle, log_filter(verbosity));
}

pub fn update_filters(filter_handle: &Handle<EnvFilter, Registry>, log_filter: &str) {
    let result = filter_handle.modify(|layer| {
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_filter)) {
            Ok(new_filter) => *layer = new_filter,
            Err(err) => {
                error!("Updating logger filter failed: {}", err);
            },
        };
    });
    if let Err(err) = result {
        error!("Updating logger filter failed: {}", err);
    }
}

/// Send all further log lines to `log_file` instead of stderr.
///
/// Used while a full screen UI owns the terminal.
/// The file is appended to and written without ANSI styling.
pub(crate) fn redirect_logs_to_file(log_file: &Path) -> Result<()> {
    let layer = file_layer(log_file)?;

    let Some(output_handle) = OUTPUT_HANDLE.get() else {
        debug!("logger not initialized, not redirecting logs");
        return Ok(());
    };

    debug!(?log_file, "redirecting logs to file");
    output_handle
        .reload(layer)
        .context("Could not redirect logs to file")?;
    Ok(())
}

fn stderr_layer() -> OutputLayer {
    tracing_subscriber::fmt::layer()
        .with_writer(LockingTerminalStderr)
        .event_format(tracing_subscriber::fmt::format())
        .boxed()
}

fn file_layer(log_file: &Path) -> Result<OutputLayer> {
    let (Some(logs_dir), Some(file_name)) = (log_file.parent(), log_file.file_name()) else {
        bail!("Invalid log file path: {log_file:?}");
    };
    let file_name = file_name
        .to_str()
        .with_context(|| format!("Log file name is not valid unicode: {file_name:?}"))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(logs_dir)
        .with_context(|| format!("Could not open log file: {log_file:?}"))?;

    Ok(tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(appender)
        .boxed())
}

pub fn create_registry_and_reload_handles() -> (
    impl tracing_subscriber::layer::SubscriberExt,
    Handle<EnvFilter, Registry>,
    Handle<OutputLayer, Registry>,
) {
    // Start permissive and narrow down via the reload handle,
    // the first filter set bounds what later filters can enable.
    let filter = EnvFilter::new("trace");
    let (filter, filter_reload_handle) = tracing_subscriber::reload::Layer::new(filter);
    let (output, output_reload_handle) = tracing_subscriber::reload::Layer::new(stderr_layer());
    let registry = tracing_subscriber::registry().with(output.with_filter(filter));

    (registry, filter_reload_handle, output_reload_handle)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tracing::info;

    use super::*;

    #[test]
    fn verbosity_filters_parse() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Verbose(0),
            Verbosity::Verbose(1),
            Verbosity::Verbose(2),
            Verbosity::Verbose(3),
            Verbosity::Verbose(4),
            Verbosity::Verbose(9),
        ] {
            let filter = log_filter(verbosity);
            assert!(EnvFilter::try_new(filter).is_ok(), "invalid filter: {filter}");
        }
    }

    #[test]
    fn file_layer_writes_plain_text() {
        let dir = TempDir::new().unwrap();
        let log_file = dir.path().join("logs").join("browse.log");

        let subscriber = tracing_subscriber::registry().with(file_layer(&log_file).unwrap());
        tracing::subscriber::with_default(subscriber, || {
            info!(query = "mouse", "search settled");
            error!("catalog unreachable");
        });

        let contents = std::fs::read_to_string(&log_file).unwrap();
        assert!(contents.contains("search settled"));
        assert!(contents.contains("query=\"mouse\""));
        assert!(contents.contains("ERROR"));
        assert!(!contents.contains('\x1b'), "escape codes in log file: {contents:?}");
    }

    #[test]
    fn file_layer_appends_to_existing_log() {
        let dir = TempDir::new().unwrap();
        let log_file = dir.path().join("browse.log");
        std::fs::write(&log_file, "previous session\n").unwrap();

        let subscriber = tracing_subscriber::registry().with(file_layer(&log_file).unwrap());
        tracing::subscriber::with_default(subscriber, || info!("next session"));

        let contents = std::fs::read_to_string(&log_file).unwrap();
        assert!(contents.starts_with("previous session\n"));
        assert!(contents.contains("next session"));
    }
}
