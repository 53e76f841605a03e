// SPDX-License-Identifier: MIT

//! A small enum over the two transports a [`crate::client::connection::Connection`]
//! can run on, so the rest of the client doesn't need to be generic over the
//! stream type.

use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::tcp::{OwnedReadHalf as TcpReadHalf, OwnedWriteHalf as TcpWriteHalf};
#[cfg(unix)]
use tokio::net::unix::{OwnedReadHalf as UnixReadHalf, OwnedWriteHalf as UnixWriteHalf};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;

use crate::error::RedisCoreError;

/// Where a connection's stream should be established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    Unix { path: PathBuf },
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Tcp { host, port } => write!(f, "{host}:{port}"),
            Endpoint::Unix { path } => write!(f, "{}", path.display()),
        }
    }
}

pub(crate) enum ReadHalf {
    Tcp(TcpReadHalf),
    #[cfg(unix)]
    Unix(UnixReadHalf),
}

pub(crate) enum WriteHalf {
    Tcp(TcpWriteHalf),
    #[cfg(unix)]
    Unix(UnixWriteHalf),
}

impl AsyncRead for ReadHalf {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            ReadHalf::Tcp(r) => Pin::new(r).poll_read(cx, buf),
            #[cfg(unix)]
            ReadHalf::Unix(r) => Pin::new(r).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for WriteHalf {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            WriteHalf::Tcp(w) => Pin::new(w).poll_write(cx, buf),
            #[cfg(unix)]
            WriteHalf::Unix(w) => Pin::new(w).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            WriteHalf::Tcp(w) => Pin::new(w).poll_flush(cx),
            #[cfg(unix)]
            WriteHalf::Unix(w) => Pin::new(w).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            WriteHalf::Tcp(w) => Pin::new(w).poll_shutdown(cx),
            #[cfg(unix)]
            WriteHalf::Unix(w) => Pin::new(w).poll_shutdown(cx),
        }
    }
}

pub(crate) async fn connect(endpoint: &Endpoint) -> Result<(ReadHalf, WriteHalf), RedisCoreError> {
    match endpoint {
        Endpoint::Tcp { host, port } => {
            let stream = TcpStream::connect((host.as_str(), *port)).await?;
            stream.set_nodelay(true)?;
            let (r, w) = stream.into_split();
            Ok((ReadHalf::Tcp(r), WriteHalf::Tcp(w)))
        }
        #[cfg(unix)]
        Endpoint::Unix { path } => {
            let stream = UnixStream::connect(path).await?;
            let (r, w) = stream.into_split();
            Ok((ReadHalf::Unix(r), WriteHalf::Unix(w)))
        }
        #[cfg(not(unix))]
        Endpoint::Unix { .. } => Err(RedisCoreError::Protocol(
            "unix sockets are not supported on this platform".into(),
        )),
    }
}
