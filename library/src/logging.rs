//! Tracing subscriber setup

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use o2launch_core::config::LogConfig;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins when it is set and valid; otherwise `[log] filter` is used.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = env_filter(std::env::var("RUST_LOG").ok().as_deref(), &config.filter)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
}

/// Pick the filter from the environment value or the configured fallback.
fn env_filter(env: Option<&str>, fallback: &str) -> Result<EnvFilter> {
    if let Some(directives) = env
        && let Ok(filter) = EnvFilter::try_new(directives)
    {
        return Ok(filter);
    }
    EnvFilter::try_new(fallback).with_context(|| format!("Invalid [log] filter '{fallback}'"))
}
