// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::Endpoint;
use crate::router::NodeSpec;

/// Top-level configuration for a [`crate::router::Router`]: one entry per
/// backend node plus defaults applied where a node leaves a field unset.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RouterConfig {
    pub nodes: Vec<NodeConfig>,

    /// Replica points placed on the ring per node when `NodeConfig::replicas`
    /// is omitted.
    #[serde(default = "default_replicas")]
    pub default_replicas: u32,

    /// Pool cap applied when `NodeConfig::max_clients` is omitted.
    #[serde(default = "default_max_clients")]
    pub default_max_clients: usize,
}

fn default_replicas() -> u32 {
    100
}

fn default_max_clients() -> usize {
    100
}

/// One backend node as it appears in the configuration file.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NodeConfig {
    /// Name this node is known by on the hash ring; must be unique.
    pub name: String,

    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub unix_socket: Option<String>,

    /// Logical database selected with `SELECT` after connecting.
    #[serde(default)]
    pub db: i64,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub max_clients: Option<usize>,

    #[serde(default)]
    pub replicas: Option<u32>,
}

impl RouterConfig {
    /// Loads the configuration from YAML and validates it.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let cfg: RouterConfig =
            serde_yaml::from_str(&s).context("failed to parse router config YAML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates cross-node invariants: unique names, and each node
    /// specifying exactly one of a TCP address or a unix socket path.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.nodes.is_empty(), "at least one node must be configured");
        ensure!(self.default_replicas >= 1, "default_replicas must be >= 1");
        ensure!(
            self.default_max_clients >= 1,
            "default_max_clients must be >= 1"
        );

        let mut seen = std::collections::HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            ensure!(!node.name.is_empty(), "node name must not be empty");
            ensure!(
                seen.insert(node.name.as_str()),
                "duplicate node name: {}",
                node.name
            );

            let has_tcp = node.host.is_some() || node.port.is_some();
            let has_unix = node.unix_socket.is_some();
            ensure!(
                has_tcp != has_unix,
                "node {} must set exactly one of host/port or unix_socket",
                node.name
            );
            if has_tcp {
                ensure!(
                    node.host.is_some() && node.port.is_some(),
                    "node {} must set both host and port",
                    node.name
                );
            }

            if let Some(max_clients) = node.max_clients {
                ensure!(
                    max_clients >= 1,
                    "node {} max_clients must be >= 1",
                    node.name
                );
            }
            if let Some(replicas) = node.replicas {
                ensure!(replicas >= 1, "node {} replicas must be >= 1", node.name);
            }
        }

        Ok(())
    }

    /// Converts every configured node into a [`NodeSpec`], applying this
    /// config's defaults to fields a node left unset.
    pub fn node_specs(&self) -> Vec<NodeSpec> {
        self.nodes
            .iter()
            .map(|node| NodeSpec {
                name: node.name.clone(),
                endpoint: node_endpoint(node),
                db: node.db,
                password: node.password.clone(),
                max_clients: node.max_clients.unwrap_or(self.default_max_clients),
                replicas: node.replicas.unwrap_or(self.default_replicas),
            })
            .collect()
    }
}

fn node_endpoint(node: &NodeConfig) -> Endpoint {
    if let Some(path) = &node.unix_socket {
        Endpoint::Unix {
            path: std::path::PathBuf::from(path),
        }
    } else {
        Endpoint::Tcp {
            host: node.host.clone().unwrap_or_else(|| "127.0.0.1".to_string()),
            port: node.port.unwrap_or(6379),
        }
    }
}
