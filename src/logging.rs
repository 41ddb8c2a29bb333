//! Logging setup: detailed log file plus a summary console stream.
//!
//! CHANGELOG:
//! - 10/15/2026 - Initial implementation

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install the global subscriber. Call once, from `main`.
///
/// - file: DEBUG and up for this crate (INFO for dependencies), truncated each run, no colors
/// - stderr: INFO and up, overridable with RUST_LOG
///
/// Keep the returned guard alive until exit so buffered file lines get flushed.
pub fn init(log_file: &Path) -> Result<WorkerGuard> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
    }
    let file = File::create(log_file)
        .with_context(|| format!("Failed to create log file: {:?}", log_file))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(EnvFilter::new("info,wolfies_whatsapp=debug"));

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_filter(
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy(),
    );

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install logger")?;

    Ok(guard)
}
