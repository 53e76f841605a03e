// SPDX-License-Identifier: MIT

//! Pipelined connections and the pool that holds them.

pub mod connection;
pub mod pool;
pub mod stream;

pub use connection::{Connection, ReplyCallback, SubCallback};
pub use pool::Pool;
pub use stream::Endpoint;
