// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber. `level` is an `EnvFilter`
/// directive (e.g. `"info"`, `"redis_core_rs=debug"`); falls back to
/// `RUST_LOG`, then to `"info"`, when `level` doesn't parse.
pub fn init_logger(level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
        .context("init_logger")
}
