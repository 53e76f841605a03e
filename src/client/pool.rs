// SPDX-License-Identifier: MIT

//! A load-aware pool of connections to a single endpoint.
//!
//! New connections are primed with AUTH/SELECT (submitted, not awaited) and
//! inserted at the front of the list, so the most recently created
//! connection is checked first by `acquire()` — this mirrors how the
//! reference client keeps the "freshest" connection at the head.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::connection::Connection;
use crate::client::stream::Endpoint;
use crate::error::RedisCoreError;

/// A pool of connections to one Redis endpoint.
pub struct Pool {
    endpoint: Endpoint,
    db: i64,
    password: Option<String>,
    max_clients: usize,
    clients: Mutex<Vec<Arc<Connection>>>,
}

impl Pool {
    pub fn new(endpoint: Endpoint, db: i64, password: Option<String>, max_clients: usize) -> Arc<Self> {
        Arc::new(Pool {
            endpoint,
            db,
            password,
            max_clients: max_clients.max(1),
            clients: Mutex::new(Vec::new()),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Number of connections currently held open by this pool.
    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.lock().await.is_empty()
    }

    async fn new_primed_connection(&self) -> Result<Arc<Connection>, RedisCoreError> {
        let conn = Connection::connect(self.endpoint.clone()).await?;
        if let Some(password) = &self.password {
            conn.submit(vec![Bytes::from_static(b"AUTH"), Bytes::from(password.clone())], None)
                .await?;
        }
        conn.submit(
            vec![
                Bytes::from_static(b"SELECT"),
                Bytes::from(self.db.to_string()),
            ],
            None,
        )
        .await?;
        Ok(conn)
    }

    /// Select a connection to carry the next request, creating one if
    /// useful. The policy, in order:
    ///   1. no connections yet -> create one
    ///   2. the least-loaded existing connection is idle -> reuse it
    ///   3. there's room under `max_clients` -> create a new one
    ///   4. otherwise -> return the least-loaded connection anyway
    pub async fn acquire(&self) -> Result<Arc<Connection>, RedisCoreError> {
        let mut clients = self.clients.lock().await;
        clients.retain(|c| c.is_connected());

        if clients.is_empty() {
            let conn = self.new_primed_connection().await?;
            clients.insert(0, Arc::clone(&conn));
            return Ok(conn);
        }

        let least_loaded_idx = clients
            .iter()
            .enumerate()
            .min_by_key(|(_, c)| c.pending_len())
            .map(|(i, _)| i)
            .expect("non-empty clients checked above");

        if clients[least_loaded_idx].is_idle() {
            return Ok(Arc::clone(&clients[least_loaded_idx]));
        }

        if clients.len() < self.max_clients {
            let conn = self.new_primed_connection().await?;
            clients.insert(0, Arc::clone(&conn));
            debug!(count = clients.len(), "pool grew to serve a busy endpoint");
            return Ok(conn);
        }

        Ok(Arc::clone(&clients[least_loaded_idx]))
    }

    /// Close every connection this pool holds.
    pub async fn close_all(&self) {
        let clients = self.clients.lock().await;
        for conn in clients.iter() {
            let _ = conn.close().await;
        }
    }
}
