//! Encrypted packets in, plaintext packets out.

use bytes::BytesMut;
use tracing::{debug, warn};

use crate::config::{DECRYPTED_BLOCK_SIZE, ENCRYPTED_BLOCK_SIZE, HEADER_SCRATCH_SIZE};
use crate::core::framer::PacketFramer;
use crate::core::header::{CompactHeaderCodec, HeaderCodec};
use crate::core::keystream::KeystreamState;
use crate::error::{ProtocolError, Result};
use crate::pipeline::{checked_block, BlockCipherPipeline, BlockTransform, PipelineContext};
use crate::transport::ByteSink;

/// Decrypting direction of a connection
///
/// The plaintext header is written fresh by the codec for the recovered body,
/// so it takes the codec's shortest form. A packet that was encrypted with a
/// long-form header around a short body comes back with a short-form header;
/// the body is unchanged.
#[derive(Debug)]
pub struct Decryptor<T, C = CompactHeaderCodec> {
    transform: T,
    context: PipelineContext<C>,
    content: BytesMut,
    assembled: BytesMut,
}

impl<T: BlockTransform, C: HeaderCodec> Decryptor<T, C> {
    pub fn new(transform: T, keystream: KeystreamState, codec: C) -> Self {
        Self {
            transform,
            context: PipelineContext::new(keystream, codec),
            content: BytesMut::new(),
            assembled: BytesMut::new(),
        }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }
}

impl<T: BlockTransform, C: HeaderCodec> BlockCipherPipeline for Decryptor<T, C> {
    type Codec = C;

    fn context(&self) -> &PipelineContext<C> {
        &self.context
    }

    fn context_mut(&mut self) -> &mut PipelineContext<C> {
        &mut self.context
    }

    fn process_packet<S: ByteSink>(&mut self, packet: &[u8], sink: &mut S) -> Result<usize> {
        let Self {
            transform,
            context,
            content,
            assembled,
        } = self;

        context.header.observe(packet);
        let header_size = context.header.header_size()?;
        let packet_size = context.header.packet_size()?;
        let body_size = context.header.content_size(false)?;
        if packet.len() < packet_size {
            return Err(ProtocolError::Framing {
                expected: packet_size,
                available: packet.len(),
            });
        }
        if body_size == 0 || body_size % ENCRYPTED_BLOCK_SIZE != 0 {
            return Err(ProtocolError::MisalignedBlocks(body_size));
        }

        let expected = context.sequence();
        let last_block = body_size / ENCRYPTED_BLOCK_SIZE - 1;
        content.clear();

        let blocks = packet[header_size..packet_size].chunks_exact(ENCRYPTED_BLOCK_SIZE);
        for (index, chunk) in blocks.enumerate() {
            let input: &[u8; ENCRYPTED_BLOCK_SIZE] = chunk
                .try_into()
                .map_err(|_| ProtocolError::MisalignedBlocks(body_size))?;

            let mut output = [0u8; DECRYPTED_BLOCK_SIZE];
            let block_size = checked_block(&mut context.keystream, |keys| {
                transform.decrypt_block(keys, input, &mut output)
            })?;
            // Only the final block of a packet may be partial.
            let valid = if index == last_block {
                (1..=DECRYPTED_BLOCK_SIZE).contains(&block_size)
            } else {
                block_size == DECRYPTED_BLOCK_SIZE
            };
            if !valid {
                return Err(ProtocolError::InvalidBlockSize(block_size));
            }
            content.extend_from_slice(&output[..block_size]);
        }

        let Some((&actual, payload)) = content.split_first() else {
            return Err(ProtocolError::InvalidBlockSize(0));
        };
        if actual != expected {
            warn!(expected, actual, "Packet sequence mismatch");
            return Err(ProtocolError::SequenceMismatch { expected, actual });
        }

        let mut header = [0u8; HEADER_SCRATCH_SIZE];
        let header_len = context.header.codec().write_header(payload.len(), &mut header)?;

        assembled.clear();
        assembled.reserve(header_len + payload.len());
        assembled.extend_from_slice(&header[..header_len]);
        assembled.extend_from_slice(payload);

        context.header.observe(assembled);
        let written = PacketFramer.copy_into(&context.header, sink, &assembled[..])?;

        debug!(
            sequence = actual,
            encrypted = packet_size,
            plain = written,
            counter = context.keystream.counter(),
            "Decrypted packet"
        );
        Ok(written)
    }
}
