//! Plaintext packets in, encrypted packets out.

use bytes::{BufMut, BytesMut};
use tracing::debug;

use crate::config::{DECRYPTED_BLOCK_SIZE, ENCRYPTED_BLOCK_SIZE, HEADER_SCRATCH_SIZE};
use crate::core::block::encrypted_body_size;
use crate::core::framer::PacketFramer;
use crate::core::header::{CompactHeaderCodec, HeaderCodec};
use crate::core::keystream::KeystreamState;
use crate::error::{ProtocolError, Result};
use crate::pipeline::{checked_block, BlockCipherPipeline, BlockTransform, PipelineContext};
use crate::transport::ByteSink;

/// Encrypting direction of a connection
///
/// Only the body of the input packet is carried through the blocks. The form of
/// its header is not, so decryption re-headers the body in the codec's shortest
/// form.
#[derive(Debug)]
pub struct Encryptor<T, C = CompactHeaderCodec> {
    transform: T,
    context: PipelineContext<C>,
    content: BytesMut,
    assembled: BytesMut,
}

impl<T: BlockTransform, C: HeaderCodec> Encryptor<T, C> {
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

impl<T: BlockTransform, C: HeaderCodec> BlockCipherPipeline for Encryptor<T, C> {
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
        let content_size = context.header.content_size(true)?;
        if packet.len() < packet_size {
            return Err(ProtocolError::Framing {
                expected: packet_size,
                available: packet.len(),
            });
        }

        let sequence = context.sequence();
        content.clear();
        content.put_u8(sequence);
        content.extend_from_slice(&packet[header_size..packet_size]);

        let body_size = encrypted_body_size(content_size);
        let mut header = [0u8; HEADER_SCRATCH_SIZE];
        let header_len = context.header.codec().write_header(body_size, &mut header)?;

        assembled.clear();
        assembled.reserve(header_len + body_size);
        assembled.extend_from_slice(&header[..header_len]);

        for chunk in content.chunks(DECRYPTED_BLOCK_SIZE) {
            let mut input = [0u8; DECRYPTED_BLOCK_SIZE];
            input[..chunk.len()].copy_from_slice(chunk);

            let mut output = [0u8; ENCRYPTED_BLOCK_SIZE];
            checked_block(&mut context.keystream, |keys| {
                transform.encrypt_block(keys, &input, chunk.len(), &mut output)
            })?;
            assembled.extend_from_slice(&output);
        }

        context.header.observe(assembled);
        let written = PacketFramer.copy_into(&context.header, sink, &assembled[..])?;

        debug!(
            sequence,
            plain = packet_size,
            encrypted = written,
            counter = context.keystream.counter(),
            "Encrypted packet"
        );
        Ok(written)
    }
}
