// SPDX-License-Identifier: MIT

//! A minimal scripted RESP server used to drive connection/pool/router
//! tests without a real Redis instance. Requests are framed exactly like
//! replies (an array of bulk strings), so the crate's own [`RespDecoder`] is
//! reused to parse them off the wire.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use redis_core_rs::protocol::{Reply, RespDecoder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What the fake server does in response to one parsed request.
pub enum Action {
    /// Write these already-framed bytes back to the client.
    Reply(Bytes),
    /// Drop the connection without replying, simulating a server-side close
    /// mid-request.
    Hangup,
    /// Consume the request but never reply, leaving the caller pending.
    Silent,
}

/// Starts a TCP server on an ephemeral port. `respond` is called once per
/// parsed request (the command's arguments as bulk strings) and decides how
/// the server reacts; it's shared across every accepted connection.
pub async fn spawn_scripted_server<F>(respond: F) -> SocketAddr
where
    F: Fn(Vec<Bytes>) -> Action + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => return,
            };
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                serve_one(stream, respond).await;
            });
        }
    });

    addr
}

async fn serve_one<F>(mut stream: tokio::net::TcpStream, respond: Arc<F>)
where
    F: Fn(Vec<Bytes>) -> Action + Send + Sync + 'static,
{
    let mut buf = BytesMut::with_capacity(4096);
    let mut decoder = RespDecoder::new();

    loop {
        let mut chunk = [0u8; 4096];
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        loop {
            match decoder.decode(&mut buf) {
                Ok(Some(Reply::Array(Some(items)))) => {
                    let args: Vec<Bytes> = items
                        .into_iter()
                        .map(|item| match item {
                            Reply::BulkString(Some(b)) => b,
                            other => panic!("unexpected request element: {other:?}"),
                        })
                        .collect();
                    match respond(args) {
                        Action::Reply(bytes) => {
                            if stream.write_all(&bytes).await.is_err() {
                                return;
                            }
                        }
                        Action::Hangup => return,
                        Action::Silent => {}
                    }
                }
                Ok(Some(other)) => panic!("unexpected top-level request shape: {other:?}"),
                Ok(None) => break,
                Err(_) => return,
            }
        }
    }
}

/// A canned `+OK\r\n` reply.
pub fn ok() -> Bytes {
    Bytes::from_static(b"+OK\r\n")
}

/// A canned `+PONG\r\n` reply.
pub fn pong() -> Bytes {
    Bytes::from_static(b"+PONG\r\n")
}

pub fn integer(n: i64) -> Bytes {
    Bytes::from(format!(":{n}\r\n"))
}

pub fn bulk(s: &str) -> Bytes {
    Bytes::from(format!("${}\r\n{s}\r\n", s.len()))
}

pub fn null_bulk() -> Bytes {
    Bytes::from_static(b"$-1\r\n")
}
