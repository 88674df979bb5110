//! Diagnostic logging.
//!
//! Everything at DEBUG and above goes to the debug log file;
//! warnings and errors are echoed to stderr. `RUST_LOG` overrides the file
//! filter.

use crate::errors::{AppError, AppResult};
use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered lines reach the file.
pub fn init(log_file: &Path) -> AppResult<WorkerGuard> {
    let log_dir = log_file.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(log_dir)?;

    let prefix = log_file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "debug".to_string());
    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(prefix);
    if let Some(ext) = log_file.extension() {
        builder = builder.filename_suffix(ext.to_string_lossy().to_string());
    }

    let appender = builder
        .build(log_dir)
        .map_err(|e| AppError::Other(format!("cannot open debug log: {}", e)))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chronophore=debug"));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(file_filter);

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| AppError::Other(format!("logging already initialized: {}", e)))?;

    Ok(guard)
}
