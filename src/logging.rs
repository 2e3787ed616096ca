use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::AddinConfig;

pub const LOG_ENV: &str = "POWERTOOLS_LOG";

/// Install a file-backed subscriber under the cache directory.
///
/// The host has no console, so everything goes to `powertools.log`. Calling
/// this more than once (add-in restarted inside the same host process) is a
/// no-op.
pub fn init(config: &AddinConfig) -> Result<()> {
    std::fs::create_dir_all(&config.cache_dir)
        .with_context(|| format!("Failed to create {}", config.cache_dir.display()))?;

    let path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let default_level = if config.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Arc::new(file))
        .try_init();

    Ok(())
}
