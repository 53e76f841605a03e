// SPDX-License-Identifier: MIT

use bytes::Bytes;

/// A single reply value parsed off the wire.
///
/// `BulkString(None)` and `Array(None)` represent the protocol's explicit
/// null bulk string / null array (`$-1`, `*-1`); they are distinct from
/// `BulkString(Some(Bytes::new()))` and `Array(Some(Vec::new()))`, which are
/// present-but-empty values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Option<Bytes>),
    Array(Option<Vec<Reply>>),
}

impl Reply {
    /// The sentinel delivered to callbacks when a connection is closed while
    /// a request was still outstanding ("connection is gone; your command
    /// will not complete"). A single null bulk string is indistinguishable
    /// from a real null reply on the wire, which is intentional: callers
    /// that care must track connection lifetime separately.
    pub fn disconnected() -> Reply {
        Reply::BulkString(None)
    }

    /// True if this reply is a server-reported error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}
