//! # Block Cipher Pipeline
//!
//! Per-connection shell that turns whole packets into whole packets, one block at
//! a time.
//!
//! ## Components
//! - **BlockTransform**: the external per-block scrambler (8 bytes ⇄ 11 bytes)
//! - **PipelineContext**: the connection's keystream state and header scratch
//! - **BlockCipherPipeline**: packet-level interface implemented by
//!   [`Encryptor`] and [`Decryptor`]
//! - **run_pipeline**: async pump from a [`ByteSource`] to a [`ByteSink`]
//!
//! ## Packet Layout
//! ```text
//! plaintext:  [Header] [Body(N)]
//! content:    [Sequence(1)] [Body(N)]          sequence = counter low byte
//! encrypted:  [Header] [Block(11)] x ceil((N + 1) / 8)
//! ```
//!
//! Each connection owns its pipeline exclusively; nothing here is shared or locked.

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::config::{PipelineConfig, DECRYPTED_BLOCK_SIZE, ENCRYPTED_BLOCK_SIZE};
use crate::core::header::{HeaderCodec, HeaderScratch};
use crate::core::keystream::KeystreamState;
use crate::error::{ProtocolError, Result};
use crate::transport::{ByteSink, ByteSource};

pub mod decryptor;
pub mod encryptor;

pub use decryptor::Decryptor;
pub use encryptor::Encryptor;

/// Per-block scrambler driven by the pipeline.
///
/// Implementations read the ring buffer and must advance the keystream counter by
/// exactly one per call.
pub trait BlockTransform {
    /// Encrypt one zero-padded block whose first `block_size` bytes are content
    fn encrypt_block(
        &mut self,
        keys: &mut KeystreamState,
        input: &[u8; DECRYPTED_BLOCK_SIZE],
        block_size: usize,
        output: &mut [u8; ENCRYPTED_BLOCK_SIZE],
    ) -> Result<()>;

    /// Decrypt one block, returning how many leading bytes of `output` are content
    fn decrypt_block(
        &mut self,
        keys: &mut KeystreamState,
        input: &[u8; ENCRYPTED_BLOCK_SIZE],
        output: &mut [u8; DECRYPTED_BLOCK_SIZE],
    ) -> Result<usize>;
}

/// Mutable state owned by one connection's pipeline
#[derive(Debug, Clone)]
pub struct PipelineContext<C> {
    pub keystream: KeystreamState,
    pub header: HeaderScratch<C>,
}

impl<C: HeaderCodec> PipelineContext<C> {
    pub fn new(keystream: KeystreamState, codec: C) -> Self {
        Self {
            keystream,
            header: HeaderScratch::new(codec),
        }
    }

    /// Re-synchronize the keystream. Key words and header scratch are kept.
    pub fn reset(&mut self) {
        self.keystream.reset();
    }

    /// Sequence byte expected at the start of the next packet's content
    #[inline]
    pub fn sequence(&self) -> u8 {
        self.keystream.counter() as u8
    }

    /// Size of the complete packet at the front of `data`, if all of it is buffered.
    ///
    /// Observes the leading header bytes into the scratch.
    pub fn frame(&mut self, data: &[u8], max_packet_size: usize) -> Result<Option<usize>> {
        if data.is_empty() {
            return Ok(None);
        }

        self.header.observe(data);
        let header_size = self.header.header_size()?;
        if data.len() < header_size {
            return Ok(None);
        }

        let packet_size = self.header.packet_size()?;
        if packet_size < header_size {
            return Err(ProtocolError::InvalidHeader);
        }
        if packet_size > max_packet_size {
            return Err(ProtocolError::OversizedPacket(packet_size));
        }
        if data.len() < packet_size {
            return Ok(None);
        }
        Ok(Some(packet_size))
    }
}

/// Packet-level interface shared by both pipeline directions
pub trait BlockCipherPipeline {
    type Codec: HeaderCodec;

    fn context(&self) -> &PipelineContext<Self::Codec>;

    fn context_mut(&mut self) -> &mut PipelineContext<Self::Codec>;

    /// Transform one complete packet and copy the result into `sink` without
    /// flushing. Returns the number of bytes written to the sink.
    fn process_packet<S: ByteSink>(&mut self, packet: &[u8], sink: &mut S) -> Result<usize>;

    /// Re-synchronize the keystream after a protocol-level resync
    fn reset(&mut self) {
        self.context_mut().reset();
    }
}

/// Run one block through `op`, checking the counter moved by exactly one
pub(crate) fn checked_block<R, F>(keys: &mut KeystreamState, op: F) -> Result<R>
where
    F: FnOnce(&mut KeystreamState) -> Result<R>,
{
    let before = keys.counter();
    let result = op(keys)?;
    let after = keys.counter();
    if after != before.wrapping_add(1) {
        return Err(ProtocolError::KeystreamDesync { before, after });
    }
    Ok(result)
}

/// Counters reported by [`run_pipeline`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub packets: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub flushes: u64,
}

/// Pump packets from `source` through `pipeline` into `sink` until the source ends.
///
/// Output is batched: the sink is flushed when its buffered bytes reach
/// `flush_threshold_bytes` and whenever the source has no complete packet left.
/// A clean end of stream returns the collected stats; an end of stream inside a
/// packet returns `ProtocolError::ConnectionClosed`.
#[instrument(skip_all, fields(flush_threshold = config.flush_threshold_bytes))]
pub async fn run_pipeline<P, R, W>(
    pipeline: &mut P,
    source: &mut R,
    sink: &mut W,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<PipelineStats>
where
    P: BlockCipherPipeline,
    R: ByteSource,
    W: ByteSink,
{
    let mut stats = PipelineStats::default();

    loop {
        while let Some(size) = pipeline
            .context_mut()
            .frame(source.data(), config.max_packet_size)?
        {
            let written = pipeline.process_packet(&source.data()[..size], sink)?;
            source.advance_to(size);

            stats.packets += 1;
            stats.bytes_in += size as u64;
            stats.bytes_out += written as u64;

            if sink.buffered() >= config.flush_threshold_bytes {
                flush_sink(sink, config, cancel).await?;
                stats.flushes += 1;
            }
        }

        if sink.buffered() > 0 {
            flush_sink(sink, config, cancel).await?;
            stats.flushes += 1;
        }

        if source.read(cancel).await? == 0 {
            let leftover = source.data().len();
            if leftover == 0 {
                debug!(packets = stats.packets, "Source closed");
                return Ok(stats);
            }
            warn!(leftover, "Source closed inside a packet");
            return Err(ProtocolError::ConnectionClosed);
        }
    }
}

async fn flush_sink<W: ByteSink>(
    sink: &mut W,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    let buffered = sink.buffered();
    tokio::time::timeout(config.flush_timeout, sink.flush(cancel))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    debug!(bytes = buffered, "Flushed batched packets");
    Ok(())
}
