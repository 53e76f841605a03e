// SPDX-License-Identifier: MIT

//! Protocol codec: request framing and the resumable reply decoder.

pub mod args;
pub mod codec;
pub mod reply;

pub use args::Argument;
pub use codec::{encode_request, RespDecoder};
pub use reply::Reply;
