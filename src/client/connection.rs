// SPDX-License-Identifier: MIT

//! A single pipelined connection with pub/sub demultiplexing.
//!
//! Requests are written to the socket as soon as they're submitted; replies
//! are matched back to callbacks strictly in submission order (FIFO), because
//! the wire protocol carries no request identifier. Once a connection is
//! asked to (p)subscribe it enters subscription mode for the rest of its
//! life: every further reply, including acks for later (un)subscribes, is
//! delivered to the single subscription callback instead of being popped off
//! the pending queue.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use once_cell::sync::OnceCell;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::select;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::client::stream::{self, Endpoint, ReadHalf, WriteHalf};
use crate::error::RedisCoreError;
use crate::protocol::{encode_request, Reply, RespDecoder};

/// One-shot completion callback for a pipelined request. `None` means the
/// caller submitted the command "fire and forget" and its reply is simply
/// discarded once it arrives.
pub type ReplyCallback = Box<dyn FnOnce(Reply) + Send>;

/// Callback bound to a connection in subscription mode. Unlike
/// [`ReplyCallback`] it is invoked repeatedly (once per published message or
/// per (un)subscribe ack) and must therefore be cloneable and comparable by
/// identity, which is why it's an `Arc<dyn Fn>` rather than a `Box<dyn FnOnce>`.
pub type SubCallback = Arc<dyn Fn(Reply) + Send + Sync>;

const READ_CHUNK: usize = 16 * 1024;

fn is_subscribe_verb(verb: &[u8]) -> bool {
    verb.eq_ignore_ascii_case(b"SUBSCRIBE")
        || verb.eq_ignore_ascii_case(b"UNSUBSCRIBE")
        || verb.eq_ignore_ascii_case(b"PSUBSCRIBE")
        || verb.eq_ignore_ascii_case(b"PUNSUBSCRIBE")
}

/// The write half and the pending queue guarded by one lock, so that writing
/// a request's bytes and enqueueing its pending slot happen as a single
/// atomic step. Two concurrent `submit`s must not be able to interleave their
/// writes and their queue pushes in different orders — wire order and
/// `pending` order have to match exactly, or a reply gets matched to the
/// wrong callback.
struct Outbound {
    writer: WriteHalf,
    pending: VecDeque<Option<ReplyCallback>>,
}

/// A single connection's pipelining and pub/sub state.
pub struct Connection {
    endpoint: Endpoint,
    outbound: Mutex<Outbound>,
    pending_len: AtomicUsize,
    sub_callback: OnceCell<SubCallback>,
    connected: AtomicBool,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .field("pending_len", &self.pending_len.load(Ordering::Relaxed))
            .field("in_subscribe_mode", &self.sub_callback.get().is_some())
            .field("connected", &self.connected.load(Ordering::Relaxed))
            .finish()
    }
}

impl Connection {
    /// Opens a new connection and spawns its read loop.
    pub async fn connect(endpoint: Endpoint) -> Result<Arc<Self>, RedisCoreError> {
        let (r, w) = stream::connect(&endpoint).await?;
        let conn = Arc::new(Connection {
            endpoint,
            outbound: Mutex::new(Outbound {
                writer: w,
                pending: VecDeque::new(),
            }),
            pending_len: AtomicUsize::new(0),
            sub_callback: OnceCell::new(),
            connected: AtomicBool::new(true),
            cancel: CancellationToken::new(),
        });

        let reader = Arc::clone(&conn);
        tokio::spawn(async move {
            reader.read_loop(r).await;
        });

        Ok(conn)
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Number of requests awaiting a reply. Always `0` once the connection
    /// has entered subscription mode, since subscribe traffic no longer uses
    /// the pending queue.
    pub fn pending_len(&self) -> usize {
        self.pending_len.load(Ordering::Acquire)
    }

    pub fn is_idle(&self) -> bool {
        self.pending_len() == 0
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn in_subscribe_mode(&self) -> bool {
        self.sub_callback.get().is_some()
    }

    /// Writes a frame without touching `pending`, for the (un)subscribe
    /// commands, whose replies never flow through the pending queue.
    async fn write_framed_only(&self, args: &[Bytes]) -> Result<(), RedisCoreError> {
        let framed = encode_request(args);
        let mut outbound = self.outbound.lock().await;
        outbound.writer.write_all(&framed).await?;
        outbound.writer.flush().await?;
        Ok(())
    }

    /// Submit a normal pipelined request. Fails synchronously without
    /// touching the socket if this connection is in subscribe mode and
    /// `args[0]` isn't one of the four (un)subscribe verbs.
    ///
    /// The write and the pending-slot enqueue happen under the same
    /// `outbound` lock so that wire order and `pending` order always match,
    /// even when two callers `submit` on this connection concurrently. When
    /// the connection is already in subscribe mode, no slot is pushed at all
    /// (even for the four (un)subscribe verbs this still allows through) —
    /// their replies are delivered to `sub_callback`, not popped off
    /// `pending`, so a slot here would never be consumed and would leave
    /// `pending_len` permanently inflated.
    pub async fn submit(
        &self,
        args: Vec<Bytes>,
        callback: Option<ReplyCallback>,
    ) -> Result<(), RedisCoreError> {
        let in_subscribe_mode = self.sub_callback.get().is_some();
        if in_subscribe_mode {
            let verb = args.first().map(|a| a.as_ref()).unwrap_or(b"");
            if !is_subscribe_verb(verb) {
                return Err(RedisCoreError::MisuseInSubscribeMode);
            }
        }

        let framed = encode_request(&args);
        let mut outbound = self.outbound.lock().await;
        outbound.writer.write_all(&framed).await?;
        outbound.writer.flush().await?;
        if !in_subscribe_mode {
            outbound.pending.push_back(callback);
            self.pending_len.fetch_add(1, Ordering::AcqRel);
        }
        Ok(())
    }

    /// Submit a request and await its reply. A convenience built on top of
    /// [`Connection::submit`] for callers that don't need to pipeline by
    /// hand; the callback closure just forwards the reply through a oneshot
    /// channel.
    pub async fn call(&self, args: Vec<Bytes>) -> Result<Reply, RedisCoreError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.submit(
            args,
            Some(Box::new(move |reply| {
                let _ = tx.send(reply);
            })),
        )
        .await?;
        rx.await.map_err(|_| {
            RedisCoreError::Transport(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "connection closed before reply arrived",
            ))
        })
    }

    fn bind_sub_callback(&self, callback: SubCallback) -> Result<(), RedisCoreError> {
        match self.sub_callback.get() {
            None => self
                .sub_callback
                .set(callback)
                .map_err(|_| RedisCoreError::SubscribeCallbackConflict),
            Some(existing) if Arc::ptr_eq(existing, &callback) => Ok(()),
            Some(_) => Err(RedisCoreError::SubscribeCallbackConflict),
        }
    }

    /// Binds `callback` as this connection's subscription callback (a no-op
    /// if it's already bound to the identical `Arc`) and issues SUBSCRIBE.
    /// The command is written directly to the socket, bypassing the pending
    /// queue: once a callback is bound every reply on this connection,
    /// including this command's own ack, is routed to it.
    pub async fn subscribe(
        &self,
        channels: &[Bytes],
        callback: SubCallback,
    ) -> Result<(), RedisCoreError> {
        self.bind_sub_callback(callback)?;
        let mut args = vec![Bytes::from_static(b"SUBSCRIBE")];
        args.extend(channels.iter().cloned());
        self.write_framed_only(&args).await
    }

    pub async fn psubscribe(
        &self,
        patterns: &[Bytes],
        callback: SubCallback,
    ) -> Result<(), RedisCoreError> {
        self.bind_sub_callback(callback)?;
        let mut args = vec![Bytes::from_static(b"PSUBSCRIBE")];
        args.extend(patterns.iter().cloned());
        self.write_framed_only(&args).await
    }

    pub async fn unsubscribe(&self, channels: &[Bytes]) -> Result<(), RedisCoreError> {
        let mut args = vec![Bytes::from_static(b"UNSUBSCRIBE")];
        args.extend(channels.iter().cloned());
        self.write_framed_only(&args).await
    }

    pub async fn punsubscribe(&self, patterns: &[Bytes]) -> Result<(), RedisCoreError> {
        let mut args = vec![Bytes::from_static(b"PUNSUBSCRIBE")];
        args.extend(patterns.iter().cloned());
        self.write_framed_only(&args).await
    }

    /// Submits QUIT and, if that succeeds, tears the connection down.
    ///
    /// Mirrors the reference client faithfully: QUIT is an ordinary command,
    /// so if this connection is already in subscribe mode `submit` rejects
    /// it with [`RedisCoreError::MisuseInSubscribeMode`] and the stream is
    /// left open.
    pub async fn close(&self) -> Result<(), RedisCoreError> {
        self.submit(vec![Bytes::from_static(b"QUIT")], None).await?;
        self.cancel.cancel();
        Ok(())
    }

    async fn dispatch(&self, reply: Reply) {
        if let Some(sub) = self.sub_callback.get() {
            invoke_sub(sub, reply);
            return;
        }
        let popped = {
            let mut outbound = self.outbound.lock().await;
            outbound.pending.pop_front()
        };
        match popped {
            Some(Some(cb)) => {
                self.pending_len.fetch_sub(1, Ordering::AcqRel);
                invoke_once(cb, reply);
            }
            Some(None) => {
                self.pending_len.fetch_sub(1, Ordering::AcqRel);
            }
            None => {
                debug!(?reply, "ignored reply with no matching pending callback");
            }
        }
    }

    async fn read_loop(self: Arc<Self>, mut reader: ReadHalf) {
        let mut buf = BytesMut::with_capacity(READ_CHUNK);
        let mut decoder = RespDecoder::new();

        loop {
            select! {
                _ = self.cancel.cancelled() => break,
                read = reader.read_buf(&mut buf) => {
                    match read {
                        Ok(0) => break,
                        Ok(n) => {
                            trace!(bytes = n, "read from connection");
                        }
                        Err(e) => {
                            warn!(error = %e, "connection read error");
                            break;
                        }
                    }
                }
            }

            loop {
                match decoder.decode(&mut buf) {
                    Ok(Some(reply)) => self.dispatch(reply).await,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "protocol error, closing connection");
                        self.close_on_disconnect().await;
                        return;
                    }
                }
            }
        }

        self.close_on_disconnect().await;
    }

    /// Drains every outstanding callback with the disconnect sentinel and
    /// marks the connection dead. Idempotent: a connection can reach this
    /// path both from EOF/error and from an explicit `close()` cancellation.
    async fn close_on_disconnect(&self) {
        if !self.connected.swap(false, Ordering::AcqRel) {
            return;
        }

        let drained: Vec<Option<ReplyCallback>> = {
            let mut outbound = self.outbound.lock().await;
            outbound.pending.drain(..).collect()
        };
        self.pending_len.store(0, Ordering::Release);

        for slot in drained {
            if let Some(cb) = slot {
                invoke_once(cb, Reply::disconnected());
            }
        }

        if let Some(sub) = self.sub_callback.get() {
            invoke_sub(sub, Reply::disconnected());
        }
    }
}

fn invoke_once(cb: ReplyCallback, reply: Reply) {
    if std::panic::catch_unwind(AssertUnwindSafe(move || cb(reply))).is_err() {
        warn!("reply callback panicked");
    }
}

fn invoke_sub(cb: &SubCallback, reply: Reply) {
    if std::panic::catch_unwind(AssertUnwindSafe(|| cb(reply))).is_err() {
        warn!("subscription callback panicked");
    }
}
