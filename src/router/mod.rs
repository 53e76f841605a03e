// SPDX-License-Identifier: MIT

//! Consistent-hash routing across a fixed set of backend pools.

pub mod ring;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::oneshot;
use tracing::warn;

use crate::client::{Endpoint, Pool};
use crate::error::RedisCoreError;
use crate::protocol::Reply;
use crate::router::ring::HashRing;

/// One backend's routing parameters, independent of how it was configured.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: String,
    pub endpoint: Endpoint,
    pub db: i64,
    pub password: Option<String>,
    pub max_clients: usize,
    pub replicas: u32,
}

struct RoutedNode {
    name: String,
    pool: Arc<Pool>,
}

/// Routes keys to one of several [`Pool`]s by consistent hashing.
pub struct Router {
    nodes: Vec<RoutedNode>,
    ring: HashRing,
}

impl Router {
    /// Builds the ring and one [`Pool`] per node. Node order is preserved
    /// from `specs`; when two nodes' replica points collide, the later node
    /// in `specs` owns that position.
    pub fn new(specs: Vec<NodeSpec>) -> Self {
        let ring_input: Vec<(String, usize, u32)> = specs
            .iter()
            .enumerate()
            .map(|(idx, spec)| (spec.name.clone(), idx, spec.replicas))
            .collect();
        let ring = HashRing::build(ring_input.iter().map(|(name, idx, r)| (name.as_str(), *idx, *r)));

        let nodes = specs
            .into_iter()
            .map(|spec| RoutedNode {
                pool: Pool::new(spec.endpoint, spec.db, spec.password, spec.max_clients),
                name: spec.name,
            })
            .collect();

        Router { nodes, ring }
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// Route an arbitrary key to the pool that owns it on the ring.
    pub fn route(&self, key: &[u8]) -> Result<Arc<Pool>, RedisCoreError> {
        let idx = self
            .ring
            .locate(key)
            .ok_or_else(|| RedisCoreError::UnknownNode("<no nodes configured>".into()))?;
        Ok(Arc::clone(&self.nodes[idx].pool))
    }

    /// Route directly to a node by name, bypassing the ring. Useful for
    /// administrative commands that must target a specific backend.
    pub fn route_to(&self, name: &str) -> Result<Arc<Pool>, RedisCoreError> {
        self.nodes
            .iter()
            .find(|n| n.name == name)
            .map(|n| Arc::clone(&n.pool))
            .ok_or_else(|| RedisCoreError::UnknownNode(name.to_string()))
    }

    /// Best-effort reachability check: `SETNX` a marker key identifying this
    /// node on each pool, logging (but not failing on) unreachable nodes.
    /// Useful as a startup smoke test before serving real traffic.
    pub async fn check_nodes(&self) -> Result<(), RedisCoreError> {
        const MARKER_KEY: &str = "db_name";

        for node in &self.nodes {
            let conn = node.pool.acquire().await?;
            let (tx, rx) = oneshot::channel();
            conn.submit(
                vec![
                    Bytes::from_static(b"SETNX"),
                    Bytes::from_static(MARKER_KEY.as_bytes()),
                    Bytes::from(node.name.clone()),
                ],
                Some(Box::new(move |reply: Reply| {
                    let _ = tx.send(reply);
                })),
            )
            .await?;

            match tokio::time::timeout(Duration::from_secs(5), rx).await {
                Ok(Ok(Reply::Error(msg))) => {
                    warn!(node = %node.name, error = %msg, "node check failed");
                }
                Ok(Ok(_)) => {}
                Ok(Err(_)) => {
                    warn!(node = %node.name, "connection closed before node check replied");
                }
                Err(_) => {
                    warn!(node = %node.name, "node check timed out");
                }
            }
        }

        Ok(())
    }
}
