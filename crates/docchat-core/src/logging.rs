//! Tracing setup for DocChat.
//!
//! The interactive client owns the terminal, so it logs to
//! `$DOCCHAT_HOME/logs/docchat.log`. One-shot commands log to stderr.

use std::fs::OpenOptions;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Config, paths};

/// Environment variable that overrides `log_filter` from the config.
pub const LOG_ENV: &str = "DOCCHAT_LOG";

/// Name of the log file inside the logs directory.
pub const LOG_FILE_NAME: &str = "docchat.log";

/// Builds the filter: `DOCCHAT_LOG` wins, then the configured filter, then `info`.
fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a file-backed subscriber.
///
/// The returned guard flushes buffered lines on drop and must be held for
/// the lifetime of the program.
pub fn init_file(config: &Config) -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter(config)).with(
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    );

    // A subscriber may already be installed (tests, embedding); keep it.
    if subscriber.try_init().is_ok() {
        tracing::info!(path = %path.display(), "logging initialized");
    }

    Ok(guard)
}

/// Installs a compact stderr subscriber for non-interactive commands.
pub fn init_stderr(config: &Config) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
