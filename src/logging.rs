//! Log output setup.
//!
//! Logs always go to stderr so stdout stays clean for command output. When a
//! log file is configured, the same events are also appended to it through a
//! non-blocking writer.

use crate::config::LogLevel;
use crate::{Error, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable overriding the configured filter (e.g. `consulta=debug`).
pub const LOG_ENV: &str = "CONSULTA_LOG";

/// Build the filter: `CONSULTA_LOG` if set, else `level`.
pub fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the global subscriber.
///
/// Hold the returned guard until the process exits; dropping it flushes and
/// stops the file writer.
pub fn init(level: LogLevel, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(level);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| Error::Config(format!("log-file has no file name: {}", path.display())))?;
            std::fs::create_dir_all(directory)?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .try_init()
                .map_err(|e| Error::Config(format!("failed to install logger: {}", e)))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .map_err(|e| Error::Config(format!("failed to install logger: {}", e)))?;
            Ok(None)
        }
    }
}
