// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use redis_core_rs::client::Endpoint;
use redis_core_rs::Connection;

use crate::integration_tests::harness::{self, Action};

/// Replies are matched back to callbacks strictly in submission order, even
/// when several requests are in flight before any reply arrives.
#[tokio::test]
async fn pipelined_replies_resolve_in_fifo_order() {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_for_server = Arc::clone(&counter);

    let addr = harness::spawn_scripted_server(move |args| {
        let n = counter_for_server.fetch_add(1, Ordering::SeqCst);
        assert_eq!(args[0], Bytes::from_static(b"PING"));
        Action::Reply(harness::integer(n as i64))
    })
    .await;

    let conn = Connection::connect(Endpoint::Tcp {
        host: addr.ip().to_string(),
        port: addr.port(),
    })
    .await
    .expect("connect");

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    for _ in 0..5 {
        let tx = tx.clone();
        conn.submit(
            vec![Bytes::from_static(b"PING")],
            Some(Box::new(move |reply| {
                let _ = tx.send(reply);
            })),
        )
        .await
        .expect("submit");
    }
    drop(tx);

    let mut rx = rx;
    let mut order = Vec::new();
    for _ in 0..5 {
        let reply = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("reply did not arrive in time")
            .expect("channel closed early");
        match reply {
            redis_core_rs::Reply::Integer(n) => order.push(n),
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    assert_eq!(order, vec![0, 1, 2, 3, 4]);
}
