// SPDX-License-Identifier: MIT

//! Wire framing: encoding the unified request protocol and a resumable,
//! binary-safe decoder for the five reply tags.

use bytes::{Bytes, BytesMut};

use crate::error::RedisCoreError;
use crate::protocol::reply::Reply;

/// Encodes a request as a length-prefixed array of bulk strings.
///
/// `*N\r\n` followed by `$len(ai)\r\n ai \r\n` for each argument. There is no
/// escaping: a `\r\n` inside an argument is safe because the length prefix
/// is authoritative.
pub fn encode_request<A: AsRef<[u8]>>(args: &[A]) -> Bytes {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        let arg = arg.as_ref();
        buf.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        buf.extend_from_slice(arg);
        buf.extend_from_slice(b"\r\n");
    }
    buf.freeze()
}

fn protocol_err(msg: impl Into<String>) -> RedisCoreError {
    RedisCoreError::Protocol(msg.into())
}

/// Position of the first `\r\n` in `buf`, if any.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn parse_line_number(line: &[u8]) -> Result<i64, RedisCoreError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| protocol_err("expected a decimal integer length/value"))
}

/// Resumable, binary-safe RESP decoder.
///
/// A `RespDecoder` holds no state of its own between calls beyond what's
/// already buffered by the caller: it is driven by repeatedly feeding an
/// accumulating [`BytesMut`] to [`RespDecoder::decode`], which returns the
/// next complete [`Reply`] (consuming the matching prefix of the buffer) or
/// `None` if the buffer doesn't yet hold a complete reply.
#[derive(Debug, Default, Clone, Copy)]
pub struct RespDecoder;

impl RespDecoder {
    pub fn new() -> Self {
        RespDecoder
    }

    /// Attempt to decode one reply from the front of `buf`. On success the
    /// consumed bytes are removed from `buf`. Returns `Ok(None)` if `buf`
    /// does not yet contain a complete reply; the buffer is left untouched
    /// in that case so the caller can append more bytes and retry.
    pub fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Reply>, RedisCoreError> {
        match try_parse(buf)? {
            Some((consumed, reply)) => {
                let _ = buf.split_to(consumed);
                Ok(Some(reply))
            }
            None => Ok(None),
        }
    }
}

/// Try to parse one complete reply starting at the front of `buf`, without
/// mutating it. Returns the number of bytes the reply occupies together
/// with the parsed value, or `None` if `buf` is a (possibly empty) prefix of
/// a reply.
fn try_parse(buf: &[u8]) -> Result<Option<(usize, Reply)>, RedisCoreError> {
    let Some(&tag) = buf.first() else {
        return Ok(None);
    };
    let rest = &buf[1..];
    let Some(line_len) = find_crlf(rest) else {
        return Ok(None);
    };
    let line = &rest[..line_len];
    let header_len = 1 + line_len + 2; // tag byte + line + CRLF

    match tag {
        b'+' => {
            let text = String::from_utf8(line.to_vec())
                .map_err(|_| protocol_err("simple string is not valid UTF-8"))?;
            Ok(Some((header_len, Reply::SimpleString(text))))
        }
        b'-' => {
            let text = String::from_utf8(line.to_vec())
                .map_err(|_| protocol_err("error text is not valid UTF-8"))?;
            Ok(Some((header_len, Reply::Error(text))))
        }
        b':' => {
            let n = parse_line_number(line)?;
            Ok(Some((header_len, Reply::Integer(n))))
        }
        b'$' => {
            let len = parse_line_number(line)?;
            if len == -1 {
                return Ok(Some((header_len, Reply::BulkString(None))));
            }
            if len < 0 {
                return Err(protocol_err("negative bulk string length"));
            }
            let len = len as usize;
            let total = header_len + len + 2;
            if buf.len() < total {
                return Ok(None);
            }
            if &buf[header_len + len..total] != b"\r\n" {
                return Err(protocol_err("bulk string missing trailing CRLF"));
            }
            let data = Bytes::copy_from_slice(&buf[header_len..header_len + len]);
            Ok(Some((total, Reply::BulkString(Some(data)))))
        }
        b'*' => {
            let len = parse_line_number(line)?;
            if len == -1 {
                return Ok(Some((header_len, Reply::Array(None))));
            }
            if len < 0 {
                return Err(protocol_err("negative array length"));
            }
            let mut offset = header_len;
            let mut items = Vec::with_capacity(len as usize);
            for _ in 0..len {
                match try_parse(&buf[offset..])? {
                    Some((used, reply)) => {
                        items.push(reply);
                        offset += used;
                    }
                    None => return Ok(None),
                }
            }
            Ok(Some((offset, Reply::Array(Some(items)))))
        }
        other => Err(protocol_err(format!(
            "unknown reply tag: {:?}",
            other as char
        ))),
    }
}
