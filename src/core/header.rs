//! # Packet Headers
//!
//! Header codec seam and the per-connection header scratch area.
//!
//! A packet starts with a 1- or 3-byte header. The [`HeaderCodec`] decides which
//! form a header uses and how long the packet is; [`HeaderScratch`] keeps the most
//! recently observed header bytes so sizes can be asked for without holding on to
//! the packet itself.
//!
//! ## Reference Wire Form ([`CompactHeaderCodec`])
//! ```text
//! short: [0xxxxxxx]                   packet size = low 7 bits (max 127)
//! long:  [1.......] [size hi] [size lo]  packet size = big-endian u16
//! ```

use crate::config::{HEADER_SCRATCH_SIZE, MAX_PACKET_SIZE};
use crate::error::{ProtocolError, Result};

/// Decodes and encodes packet headers
pub trait HeaderCodec {
    /// Header length (1 or 3) selected by the marker in `header[0]`
    fn header_size(&self, header: &[u8]) -> Result<usize>;

    /// Total packet length including the header
    fn packet_size(&self, header: &[u8]) -> Result<usize>;

    /// Write the header for a packet carrying `body_len` bytes after its header.
    /// Returns the header length.
    fn write_header(&self, body_len: usize, out: &mut [u8; HEADER_SCRATCH_SIZE]) -> Result<usize>;
}

/// Marker bit selecting the 3-byte header form
pub const LONG_HEADER_MARKER: u8 = 0x80;

/// Largest packet the 1-byte header form can describe
pub const SHORT_HEADER_MAX: usize = 0x7F;

/// One-bit marker header codec (1-byte short form, 3-byte long form)
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactHeaderCodec;

impl HeaderCodec for CompactHeaderCodec {
    fn header_size(&self, header: &[u8]) -> Result<usize> {
        match header.first() {
            Some(marker) if marker & LONG_HEADER_MARKER != 0 => Ok(3),
            Some(_) => Ok(1),
            None => Err(ProtocolError::InvalidHeader),
        }
    }

    fn packet_size(&self, header: &[u8]) -> Result<usize> {
        match self.header_size(header)? {
            1 => Ok(usize::from(header[0] & !LONG_HEADER_MARKER)),
            _ => match header {
                [_, hi, lo, ..] => Ok(usize::from(u16::from_be_bytes([*hi, *lo]))),
                _ => Err(ProtocolError::InvalidHeader),
            },
        }
    }

    fn write_header(&self, body_len: usize, out: &mut [u8; HEADER_SCRATCH_SIZE]) -> Result<usize> {
        if body_len < SHORT_HEADER_MAX {
            *out = [(body_len + 1) as u8, 0, 0];
            return Ok(1);
        }

        let total = body_len + 3;
        if total > MAX_PACKET_SIZE {
            return Err(ProtocolError::OversizedPacket(total));
        }
        let [hi, lo] = (total as u16).to_be_bytes();
        *out = [LONG_HEADER_MARKER, hi, lo];
        Ok(3)
    }
}

/// Fixed 3-byte copy of the most recently observed header
#[derive(Debug, Clone)]
pub struct HeaderScratch<C> {
    bytes: [u8; HEADER_SCRATCH_SIZE],
    codec: C,
}

impl<C: HeaderCodec> HeaderScratch<C> {
    pub fn new(codec: C) -> Self {
        Self {
            bytes: [0; HEADER_SCRATCH_SIZE],
            codec,
        }
    }

    /// Overwrite the scratch with the leading bytes of `packet`.
    ///
    /// Only the first three bytes are kept; positions past the end of a shorter
    /// packet are zeroed.
    pub fn observe(&mut self, packet: &[u8]) {
        let len = packet.len().min(HEADER_SCRATCH_SIZE);
        self.bytes = [0; HEADER_SCRATCH_SIZE];
        self.bytes[..len].copy_from_slice(&packet[..len]);
    }

    pub fn bytes(&self) -> &[u8; HEADER_SCRATCH_SIZE] {
        &self.bytes
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    #[inline]
    pub fn header_size(&self) -> Result<usize> {
        self.codec.header_size(&self.bytes)
    }

    #[inline]
    pub fn packet_size(&self) -> Result<usize> {
        self.codec.packet_size(&self.bytes)
    }

    /// Content bytes of the observed packet.
    ///
    /// The decrypted representation carries one extra leading byte (the packet
    /// sequence byte) relative to the body on the wire.
    pub fn content_size(&self, decrypted: bool) -> Result<usize> {
        let packet_size = self.packet_size()?;
        let header_size = self.header_size()?;
        if packet_size < header_size {
            return Err(ProtocolError::InvalidHeader);
        }
        Ok(packet_size - header_size + usize::from(decrypted))
    }
}
