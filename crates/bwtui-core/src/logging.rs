//! Tracing setup. The terminal belongs to the UI, so logs go to a file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "bwtui=info,bwtui_vault=info,bwtui_core=info";
const LOG_FILE_NAME: &str = "bwtui.log";

/// Build the filter: `RUST_LOG` wins, then an explicit level, then the default.
pub fn build_filter(level: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match level {
        Some(level) => {
            let directives = format!("bwtui={level},bwtui_vault={level},bwtui_core={level}");
            EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
        }
        None => EnvFilter::new(DEFAULT_LOG_FILTER),
    }
}

/// Initialize tracing with an append-only log file inside `log_dir`.
/// Returns the path of the log file.
pub fn init_logging(log_dir: &Path, level: Option<&str>) -> Result<PathBuf> {
    let path = log_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(path)
}
