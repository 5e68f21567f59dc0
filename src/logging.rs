//! Tracing subscriber setup for processes that host a pipeline.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host. [`init_logging`] is the default setup: an `EnvFilter`
//! (`RUST_LOG` wins over [`LogSettings::filter`]), a stderr fmt layer and,
//! when a directory is configured, a daily-rotated file layer.

use crate::config::LogSettings;
use crate::error::{PipelineError, PipelineResult};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Returns the file writer guard when file logging is enabled; it must be
/// kept alive for buffered lines to be flushed. Fails if a global subscriber
/// is already installed.
pub fn init_logging(settings: &LogSettings) -> PipelineResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .map_err(|e| PipelineError::Config(format!("Invalid log filter: {}", e)))?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(settings.ansi);

    let (file_layer, guard) = match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| PipelineError::Config(format!("Failed to install subscriber: {}", e)))?;

    tracing::info!("Logging initialized");
    Ok(guard)
}
