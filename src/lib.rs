// SPDX-License-Identifier: MIT

//! Asynchronous client core for a Redis-compatible key/value server.
//!
//! This crate implements the pieces that sit below any convenience command
//! surface: wire framing (see [`protocol`]), a single pipelined connection
//! with pub/sub demultiplexing (see [`client::connection`]), a load-aware
//! connection pool (see [`client::pool`]), and a consistent-hash router that
//! distributes keys across a fixed set of backend pools (see [`router`]).

pub mod cfg;
pub mod client;
pub mod commands;
pub mod error;
pub mod protocol;
pub mod router;

pub use client::connection::Connection;
pub use client::pool::Pool;
pub use error::RedisCoreError;
pub use protocol::reply::Reply;
pub use router::Router;
