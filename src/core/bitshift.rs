//! # Bit Shift Packer
//!
//! Moves bit fields between arbitrary bit offsets of byte buffers.
//!
//! Consecutive fields of an encrypted block are not byte-aligned to each other, so
//! building or taking apart a block means moving a field from one bit offset to
//! another and OR-ing it into place. All buffers are treated as big-endian bit
//! strings: bit offset 0 is the most significant bit of byte 0.
//!
//! ## Primitives
//! - [`align_to_zero`]: drop `shift` leading bits, compacting the rest to offset 0
//! - [`position_at_offset`]: insert `shift` leading zero bits
//! - [`merge_at`]: re-align a source buffer and OR it into the destination
//! - [`shift_span`]: destination bytes covered by a field at a given bit offset
//! - [`copy_bits`]: copy an exact bit range from one buffer into another
//!
//! ## Contracts
//! `merge_at` OR-merges, so every destination bit it may set must be zero
//! beforehand. Fields composed into one buffer must never overlap. Capacities are
//! checked before any byte is touched; a violation returns
//! [`ProtocolError::Capacity`] and leaves both buffers unchanged.
//!
//! ## Example
//! ```rust
//! use simple_modulus::core::bitshift::{copy_bits, shift_span};
//!
//! let input = [0b1011_0110u8];
//! let mut output = [0u8; 2];
//!
//! // Copy the four bits "1101" (offset 2) to bit offset 6 of the output.
//! let written = copy_bits(&mut output, 6, &input, 2, 4).unwrap();
//! assert_eq!(output, [0b0000_0011, 0b0100_0000]);
//! assert_eq!(written, 2);
//! assert_eq!(shift_span(4, 6), 2);
//! ```

use crate::error::{ProtocolError, Result};

/// Largest field `copy_bits` moves in one call (bytes spanned in the input)
pub const MAX_COPY_BYTES: usize = 16;

/// Drop `shift` leading bits of `data`, moving the remainder to bit offset 0.
///
/// Trailing bits are zero-filled. `shift` is taken modulo 8; zero is a no-op.
#[inline]
pub fn align_to_zero(data: &mut [u8], shift: usize) {
    let shift = (shift & 7) as u32;
    if shift == 0 || data.is_empty() {
        return;
    }

    let size = data.len();
    for i in 1..size {
        data[i - 1] = (data[i - 1] << shift) | (data[i] >> (8 - shift));
    }
    data[size - 1] <<= shift;
}

/// Insert `shift` zero bits at the front of `data`.
///
/// The last `shift` bits of the buffer fall off the end. `shift` is taken
/// modulo 8; zero is a no-op.
#[inline]
pub fn position_at_offset(data: &mut [u8], shift: usize) {
    let shift = (shift & 7) as u32;
    if shift == 0 || data.is_empty() {
        return;
    }

    let size = data.len();
    for i in 1..size {
        data[size - i] = (data[size - i] >> shift) | (data[size - i - 1] << (8 - shift));
    }
    data[0] >>= shift;
}

/// Number of bytes a field of `length_bits` bits covers when it starts at
/// `offset_bits`, counted from the byte containing `offset_bits`.
///
/// A zero-length field covers no bytes.
#[inline]
pub fn shift_span(length_bits: usize, offset_bits: usize) -> usize {
    if length_bits == 0 {
        return 0;
    }
    (length_bits + offset_bits - 1) / 8 + 1 - offset_bits / 8
}

/// Re-align `source` from `source_offset_bits` to `output_offset_bits` and OR it
/// into `output`.
///
/// `source` is scratch: it is shifted in place and must hold at least
/// `byte_size + 1` bytes, the last of which receives bits spilled by the
/// repositioning. Returns the number of destination bytes merged, starting at
/// byte `output_offset_bits / 8`.
pub fn merge_at(
    output: &mut [u8],
    output_offset_bits: usize,
    source: &mut [u8],
    source_offset_bits: usize,
    byte_size: usize,
) -> Result<usize> {
    let source_shift = source_offset_bits & 7;
    let output_shift = output_offset_bits & 7;

    if source.len() < byte_size + 1 {
        return Err(ProtocolError::Capacity {
            required: byte_size + 1,
            available: source.len(),
        });
    }

    let written = byte_size + usize::from(output_shift > source_shift);
    let byte_offset = output_offset_bits / 8;
    let end = byte_offset + written;
    if output.len() < end {
        return Err(ProtocolError::Capacity {
            required: end,
            available: output.len(),
        });
    }

    align_to_zero(&mut source[..byte_size], source_shift);
    position_at_offset(&mut source[..byte_size + 1], output_shift);

    for (dst, src) in output[byte_offset..end].iter_mut().zip(&source[..written]) {
        *dst |= *src;
    }

    Ok(written)
}

/// Copy `length_bits` bits of `input`, starting at `input_offset_bits`, into
/// `output` starting at `output_offset_bits`.
///
/// Bits of `input` outside the range are ignored. The target bits of `output`
/// must be zero. `output` needs `output_offset_bits / 8 + shift_span(length_bits,
/// output_offset_bits)` bytes; the return value is that span, the number of
/// destination bytes merged.
pub fn copy_bits(
    output: &mut [u8],
    output_offset_bits: usize,
    input: &[u8],
    input_offset_bits: usize,
    length_bits: usize,
) -> Result<usize> {
    if length_bits == 0 {
        return Ok(0);
    }

    let span = shift_span(length_bits, input_offset_bits);
    let start = input_offset_bits / 8;
    if input.len() < start + span {
        return Err(ProtocolError::Capacity {
            required: start + span,
            available: input.len(),
        });
    }

    let mut scratch = [0u8; MAX_COPY_BYTES + 1];
    if span > MAX_COPY_BYTES {
        return Err(ProtocolError::Capacity {
            required: span + 1,
            available: scratch.len(),
        });
    }

    let written = shift_span(length_bits, output_offset_bits);
    let byte_offset = output_offset_bits / 8;
    if output.len() < byte_offset + written {
        return Err(ProtocolError::Capacity {
            required: byte_offset + written,
            available: output.len(),
        });
    }

    scratch[..span].copy_from_slice(&input[start..start + span]);

    // Clear whatever follows the field in its last byte.
    let tail = (input_offset_bits + length_bits) & 7;
    if tail != 0 {
        scratch[span - 1] &= 0xFFu8 << (8 - tail);
    }

    align_to_zero(&mut scratch[..span], input_offset_bits);
    position_at_offset(&mut scratch[..span + 1], output_offset_bits);

    // Scratch bytes past `written` hold no field bits.
    for (dst, src) in output[byte_offset..byte_offset + written]
        .iter_mut()
        .zip(&scratch[..written])
    {
        *dst |= *src;
    }

    Ok(written)
}
