//! Logging setup.
//!
//! Logs go to stderr and, when `logging.file` is configured, to a file
//! through a non-blocking writer. `RUST_LOG` overrides the configured level.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// Errors from installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{directives}': {reason}")]
    InvalidFilter { directives: String, reason: String },

    #[error("invalid log file {}: {}", .path.display(), .reason)]
    InvalidFile { path: PathBuf, reason: String },

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Keeps the file writer flushing until dropped.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Filter directives for the configured level.
///
/// Verbose mode raises this crate to debug while keeping dependencies at
/// info, so HTTP and TLS internals stay quiet.
fn filter_directives(level: &str, verbose: bool) -> String {
    if verbose {
        "info,rctsync=debug".to_string()
    } else {
        level.to_string()
    }
}

fn build_filter(level: &str, verbose: bool) -> Result<EnvFilter, LoggingError> {
    let directives = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env) if !env.trim().is_empty() && !verbose => env,
        _ => filter_directives(level, verbose),
    };

    EnvFilter::try_new(&directives).map_err(|e| LoggingError::InvalidFilter {
        reason: e.to_string(),
        directives,
    })
}

/// Install the global tracing subscriber.
///
/// Hold on to the returned guard for as long as logs should be written.
pub fn init_logging(
    settings: &LoggingSettings,
    verbose: bool,
) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&settings.level, verbose)?;

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, file_guard) = match &settings.file {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            std::fs::create_dir_all(dir).map_err(|e| LoggingError::InvalidFile {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr), LoggingError> {
    let name = path.file_name().ok_or_else(|| LoggingError::InvalidFile {
        path: path.to_path_buf(),
        reason: "not a file path".to_string(),
    })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok((dir, name))
}
