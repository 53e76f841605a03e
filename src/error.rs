// SPDX-License-Identifier: MIT

//! Typed error taxonomy for the connection/pool/router core.
//!
//! `ServerError` (an *Error*-tagged [`crate::protocol::reply::Reply`]) is
//! deliberately absent here: a server-reported error is not a failure of the
//! client core, it is ordinary data delivered down the normal callback path.

use thiserror::Error;

/// Failure modes surfaced synchronously by the connection, pool, and router.
#[derive(Debug, Error)]
pub enum RedisCoreError {
    /// Write, read, or connect failure on the underlying stream.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The server sent bytes that do not form a valid reply.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A command other than (UN)SUBSCRIBE/(P)(UN)SUBSCRIBE was submitted on
    /// a connection already in subscription mode.
    #[error("cannot run normal command over a connection in subscribe mode")]
    MisuseInSubscribeMode,

    /// `subscribe`/`psubscribe` was called a second time with a different
    /// callback than the one already bound to the connection.
    #[error("subscribe callback already set to a different callback")]
    SubscribeCallbackConflict,

    /// The pool could not produce a connection (e.g. it has been closed).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// A router operation referenced a node name that is not on the ring.
    #[error("unknown node: {0}")]
    UnknownNode(String),
}

pub type Result<T> = std::result::Result<T, RedisCoreError>;
