//! # Packet Framer
//!
//! Copies one complete packet into an outbound [`ByteSink`].
//!
//! The packet length comes from the header scratch, not from the input: the input
//! may be segmented or carry trailing bytes of the next packet. Copying never
//! flushes, so callers can batch several packets before waking the transport.

use bytes::Buf;
use tracing::trace;

use crate::core::header::{HeaderCodec, HeaderScratch};
use crate::error::{ProtocolError, Result};
use crate::transport::ByteSink;

/// Stateless packet copier
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketFramer;

impl PacketFramer {
    /// Copy the packet described by `header` from `packet` into `sink`.
    ///
    /// Exactly `header.packet_size()` bytes are reserved, copied and committed.
    /// If `packet` holds fewer bytes, nothing is written and
    /// `ProtocolError::Framing` is returned. Returns the number of bytes copied.
    pub fn copy_into<C, S, B>(
        &self,
        header: &HeaderScratch<C>,
        sink: &mut S,
        mut packet: B,
    ) -> Result<usize>
    where
        C: HeaderCodec,
        S: ByteSink,
        B: Buf,
    {
        let size = header.packet_size()?;
        let available = packet.remaining();
        if available < size {
            return Err(ProtocolError::Framing {
                expected: size,
                available,
            });
        }

        let region = sink.reserve(size);
        packet.copy_to_slice(region);
        sink.commit(size);

        trace!(size, buffered = sink.buffered(), "Packet copied to sink");
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::header::CompactHeaderCodec;
    use crate::transport::BufferedSink;

    #[test]
    fn test_copies_exactly_declared_size() {
        let mut header = HeaderScratch::new(CompactHeaderCodec);
        let packet = [0x04, 0xA1, 0xA2, 0xA3, 0xFF, 0xFF];
        header.observe(&packet);

        let mut sink = BufferedSink::new(Vec::new());
        let copied = PacketFramer.copy_into(&header, &mut sink, &packet[..]).unwrap();

        assert_eq!(copied, 4);
        assert_eq!(sink.pending(), &[0x04, 0xA1, 0xA2, 0xA3]);
    }

    #[test]
    fn test_copies_segmented_input() {
        let mut header = HeaderScratch::new(CompactHeaderCodec);
        let first: &[u8] = &[0x80, 0x00, 0x06];
        let second: &[u8] = &[0x10, 0x20, 0x30];
        header.observe(first);

        let mut sink = BufferedSink::new(Vec::new());
        let copied = PacketFramer
            .copy_into(&header, &mut sink, first.chain(second))
            .unwrap();

        assert_eq!(copied, 6);
        assert_eq!(sink.pending(), &[0x80, 0x00, 0x06, 0x10, 0x20, 0x30]);
    }

    #[test]
    fn test_short_packet_writes_nothing() {
        let mut header = HeaderScratch::new(CompactHeaderCodec);
        let packet = [0x0A, 0x01, 0x02];
        header.observe(&packet);

        let mut sink = BufferedSink::new(Vec::new());
        let err = PacketFramer
            .copy_into(&header, &mut sink, &packet[..])
            .unwrap_err();

        assert!(matches!(
            err,
            ProtocolError::Framing {
                expected: 10,
                available: 3
            }
        ));
        assert_eq!(sink.buffered(), 0);
    }
}
