//! Process-wide logging setup
//!
//! Logging is initialized exactly once, from `main`, with two outputs:
//! a compact stdout layer and a plain-text log file under the configured
//! directory. Components log through `tracing` inside the span handed to
//! them at construction.

use crate::config::{normalize_level, LoggingConfig};
use crate::HarvestError;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Builds the filter directive from config level and CLI verbosity
///
/// `-q` wins over everything; each `-v` raises the crate's level one step
/// above the configured one.
pub fn filter_directive(config: &LoggingConfig, verbose: u8, quiet: bool) -> String {
    if quiet {
        return "error".to_string();
    }

    let configured = normalize_level(&config.level).unwrap_or("info");
    match verbose {
        0 => format!("tag_harvester={},warn", configured),
        1 => "tag_harvester=debug,info".to_string(),
        2 => "tag_harvester=trace,debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Path of the log file described by `config`
pub fn log_file_path(config: &LoggingConfig) -> PathBuf {
    Path::new(&config.directory).join(&config.file)
}

/// Initializes the global tracing subscriber
///
/// # Returns
///
/// * `Ok(WorkerGuard)` - Guard flushing the file writer; keep it alive until exit
/// * `Err(HarvestError)` - The log directory could not be created or a subscriber
///   was already installed
pub fn init_logging(
    config: &LoggingConfig,
    verbose: u8,
    quiet: bool,
) -> Result<WorkerGuard, HarvestError> {
    let directive = filter_directive(config, verbose, quiet);

    let directory = Path::new(&config.directory);
    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::never(directory, &config.file);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(EnvFilter::new(&directive));

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(EnvFilter::new(&directive));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| HarvestError::Logging(e.to_string()))?;

    tracing::debug!(
        "Logging initialized ({}), writing to {}",
        directive,
        log_file_path(config).display()
    );

    Ok(guard)
}
