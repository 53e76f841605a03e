// SPDX-License-Identifier: MIT

use std::sync::Arc;

use anyhow::{Context, Result};
use redis_core_rs::cfg::{cli::resolve_config_path, config::RouterConfig, logger::init_logger};
use redis_core_rs::commands::Commands;
use redis_core_rs::Router;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger("info")?;

    let cfg = resolve_config_path("config.yaml")
        .and_then(RouterConfig::load_from_file)
        .context("failed to resolve or load router config")?;

    let router = Arc::new(Router::new(cfg.node_specs()));
    router.check_nodes().await.context("node check failed")?;
    info!(nodes = router.node_names().count(), "router ready");

    let pool = router.route(b"demo-key")?;
    let conn = pool.acquire().await.context("failed to acquire connection")?;
    let commands = Commands::new(conn);

    let pong = commands.ping().await.context("PING failed")?;
    info!(?pong, "ping reply");

    commands
        .set("demo-key", "hello", None, None)
        .await
        .context("SET failed")?;
    let value = commands.get("demo-key").await.context("GET failed")?;
    info!(?value, "get reply");

    Ok(())
}
