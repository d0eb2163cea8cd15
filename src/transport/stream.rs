//! Buffered `ByteSink`/`ByteSource` implementations over tokio I/O.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::config::{DEFAULT_FLUSH_THRESHOLD, DEFAULT_READ_CHUNK};
use crate::error::{ProtocolError, Result};
use crate::transport::{ByteSink, ByteSource};

/// Stages outbound packets in memory until flushed to `W`
#[derive(Debug)]
pub struct BufferedSink<W> {
    writer: W,
    buffer: BytesMut,
    committed: usize,
}

impl<W> BufferedSink<W> {
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, DEFAULT_FLUSH_THRESHOLD)
    }

    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(capacity),
            committed: 0,
        }
    }

    /// Committed bytes waiting for the next flush
    pub fn pending(&self) -> &[u8] {
        &self.buffer[..self.committed]
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: AsyncWrite + Unpin + Send> ByteSink for BufferedSink<W> {
    fn reserve(&mut self, len: usize) -> &mut [u8] {
        self.buffer.truncate(self.committed);
        self.buffer.resize(self.committed + len, 0);
        &mut self.buffer[self.committed..]
    }

    fn commit(&mut self, len: usize) {
        let reserved = self.buffer.len() - self.committed;
        if len > reserved {
            warn!(len, reserved, "Commit exceeds reserved region, clamping");
        }
        self.committed += len.min(reserved);
    }

    fn buffered(&self) -> usize {
        self.committed
    }

    async fn flush(&mut self, cancel: &CancellationToken) -> Result<()> {
        self.buffer.truncate(self.committed);
        if self.buffer.is_empty() {
            return Ok(());
        }

        let Self {
            writer,
            buffer,
            committed,
        } = self;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProtocolError::Cancelled),
            result = async {
                writer.write_all(&buffer[..]).await?;
                writer.flush().await
            } => result?,
        }

        trace!(bytes = buffer.len(), "Flushed sink");
        buffer.clear();
        *committed = 0;
        Ok(())
    }
}

/// Accumulates inbound bytes from `R` until the pipeline consumes them
#[derive(Debug)]
pub struct BufferedSource<R> {
    reader: R,
    buffer: BytesMut,
    chunk_size: usize,
}

impl<R> BufferedSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_READ_CHUNK)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(chunk_size),
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: AsyncRead + Unpin + Send> ByteSource for BufferedSource<R> {
    async fn read(&mut self, cancel: &CancellationToken) -> Result<usize> {
        self.buffer.reserve(self.chunk_size);

        let Self { reader, buffer, .. } = self;
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProtocolError::Cancelled),
            result = reader.read_buf(buffer) => result?,
        };

        trace!(bytes = read, buffered = buffer.len(), "Read from source");
        Ok(read)
    }

    fn data(&self) -> &[u8] {
        &self.buffer
    }

    fn advance_to(&mut self, position: usize) {
        let consumed = position.min(self.buffer.len());
        self.buffer.advance(consumed);
    }
}
