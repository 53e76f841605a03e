// SPDX-License-Identifier: MIT

use std::sync::Arc;

use bytes::Bytes;
use redis_core_rs::client::{Endpoint, Pool};

use crate::integration_tests::harness::{self, Action};

/// An idle pool reuses its single connection rather than opening a new one.
#[tokio::test]
async fn idle_connection_is_reused() {
    let addr = harness::spawn_scripted_server(|_args| Action::Reply(harness::ok())).await;
    let pool = Pool::new(
        Endpoint::Tcp {
            host: addr.ip().to_string(),
            port: addr.port(),
        },
        0,
        None,
        10,
    );

    let first = pool.acquire().await.expect("acquire");
    first
        .call(vec![Bytes::from_static(b"PING")])
        .await
        .expect("call");
    let second = pool.acquire().await.expect("acquire");

    assert!(same_connection(&first, &second));
    assert_eq!(pool.len().await, 1);
}

/// Once every connection is busy and the pool is under its cap, a fresh
/// connection is created rather than reusing a busy one.
#[tokio::test]
async fn busy_pool_under_cap_grows() {
    let addr = harness::spawn_scripted_server(|_args| Action::Silent).await;
    let pool = Pool::new(
        Endpoint::Tcp {
            host: addr.ip().to_string(),
            port: addr.port(),
        },
        0,
        None,
        10,
    );

    let first = pool.acquire().await.expect("acquire");
    // Leave a request permanently pending so `first` never looks idle again.
    first
        .submit(vec![Bytes::from_static(b"BLOCK")], None)
        .await
        .expect("submit");

    let second = pool.acquire().await.expect("acquire");
    assert!(!same_connection(&first, &second));
    assert_eq!(pool.len().await, 2);
}

/// Once the pool is at `max_clients` and every connection is busy, `acquire`
/// falls back to the least-loaded connection instead of growing further.
#[tokio::test]
async fn pool_at_cap_returns_least_loaded_connection() {
    let addr = harness::spawn_scripted_server(|_args| Action::Silent).await;
    let pool = Pool::new(
        Endpoint::Tcp {
            host: addr.ip().to_string(),
            port: addr.port(),
        },
        0,
        None,
        1,
    );

    let first = pool.acquire().await.expect("acquire");
    first
        .submit(vec![Bytes::from_static(b"BLOCK")], None)
        .await
        .expect("submit");

    let second = pool.acquire().await.expect("acquire");
    assert!(same_connection(&first, &second));
    assert_eq!(pool.len().await, 1);
}

fn same_connection<T>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::ptr_eq(a, b)
}
