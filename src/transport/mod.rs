//! # Byte-Stream Transport
//!
//! The two seams between the pipeline core and the connection's byte stream.
//!
//! ## Components
//! - **ByteSink**: outbound staging area with `reserve`/`commit`/`flush`
//! - **ByteSource**: inbound buffer with `read`/`data`/`advance_to`
//! - **BufferedSink / BufferedSource**: implementations over tokio
//!   `AsyncWrite`/`AsyncRead`
//!
//! ## Flow Control
//! Reserving and committing never suspend; output accumulates until the caller
//! flushes, so several packets can be batched into one write. `flush` and `read`
//! are the only suspension points. Both take a cancellation token and return
//! `ProtocolError::Cancelled` once it fires.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::Result;

pub mod stream;

pub use stream::{BufferedSink, BufferedSource};

/// Outbound byte stream
pub trait ByteSink {
    /// Writable region of exactly `len` zeroed bytes following the committed data.
    ///
    /// A later `reserve` discards any previously reserved but uncommitted region.
    fn reserve(&mut self, len: usize) -> &mut [u8];

    /// Mark the first `len` reserved bytes as part of the outbound stream
    fn commit(&mut self, len: usize);

    /// Committed bytes not yet flushed
    fn buffered(&self) -> usize;

    /// Hand all committed bytes to the underlying stream, waiting for it to accept them
    fn flush(&mut self, cancel: &CancellationToken) -> impl Future<Output = Result<()>> + Send;
}

/// Inbound byte stream
pub trait ByteSource {
    /// Read more bytes into the buffer. Returns the number read; 0 means end of stream.
    fn read(&mut self, cancel: &CancellationToken) -> impl Future<Output = Result<usize>> + Send;

    /// Buffered bytes not yet consumed
    fn data(&self) -> &[u8];

    /// Consume the first `position` buffered bytes
    fn advance_to(&mut self, position: usize);
}
