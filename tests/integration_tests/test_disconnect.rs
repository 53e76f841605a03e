// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use redis_core_rs::client::Endpoint;
use redis_core_rs::{Connection, Reply};

use crate::integration_tests::harness::{self, Action};

/// When the server hangs up mid-pipeline, every outstanding callback is
/// invoked exactly once with the disconnect sentinel, in submission order.
#[tokio::test]
async fn disconnect_drains_every_pending_callback_with_sentinel() {
    let addr = harness::spawn_scripted_server(|args| {
        // Reply to the first request normally, leave SECOND/THIRD pending,
        // then hang up once the client explicitly asks it to.
        if args[0] == Bytes::from_static(b"FIRST") {
            Action::Reply(harness::ok())
        } else if args[0] == Bytes::from_static(b"CLOSE") {
            Action::Hangup
        } else {
            Action::Silent
        }
    })
    .await;

    let conn = Connection::connect(Endpoint::Tcp {
        host: addr.ip().to_string(),
        port: addr.port(),
    })
    .await
    .expect("connect");

    let results: Arc<Mutex<Vec<Reply>>> = Arc::new(Mutex::new(Vec::new()));

    for label in ["FIRST", "SECOND", "THIRD"] {
        let results = Arc::clone(&results);
        conn.submit(
            vec![Bytes::from_static(label.as_bytes())],
            Some(Box::new(move |reply| {
                results.lock().expect("lock").push(reply);
            })),
        )
        .await
        .expect("submit");
    }

    // Fire-and-forget request the server uses as the signal to hang up,
    // leaving SECOND and THIRD stranded in `pending`.
    conn.submit(vec![Bytes::from_static(b"CLOSE")], None)
        .await
        .expect("submit close signal");

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(!conn.is_connected());
    let results = results.lock().expect("lock");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Reply::SimpleString("OK".into()));
    assert_eq!(results[1], Reply::disconnected());
    assert_eq!(results[2], Reply::disconnected());
}
