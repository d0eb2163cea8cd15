//! # Encrypted Block Layout
//!
//! Bit layout of one 11-byte block on the wire.
//!
//! ```text
//! bit  0        18        36        54        72       80       88
//!      [word 0 ][word 1 ][word 2 ][word 3 ][len^3D ][sum^F8 ]
//! ```
//!
//! Each of the four words carries 18 significant bits produced by the block
//! transform from 16 bits of plaintext. The length byte holds the number of real
//! content bytes in the block (1..=8) and the checksum byte holds the XOR of the
//! eight plaintext bytes; both are masked with fixed keys.

use crate::config::{
    BLOCK_CHECKSUM_XOR_KEY, BLOCK_SIZE_XOR_KEY, DECRYPTED_BLOCK_SIZE, ENCRYPTED_BLOCK_SIZE,
};
use crate::core::bitshift::copy_bits;
use crate::error::{ProtocolError, Result};

/// Significant bits of one encrypted word
pub const WORD_BITS: usize = 18;

/// Encrypted words per block
pub const WORDS_PER_BLOCK: usize = 4;

/// Bit offset of the masked length byte
const LENGTH_OFFSET_BITS: usize = WORD_BITS * WORDS_PER_BLOCK;

/// Bit offset of the masked checksum byte
const CHECKSUM_OFFSET_BITS: usize = LENGTH_OFFSET_BITS + 8;

const WORD_MASK: u32 = (1 << WORD_BITS) - 1;

/// Unpacked contents of one encrypted block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncryptedBlock {
    /// Transformed words, 18 significant bits each
    pub words: [u32; WORDS_PER_BLOCK],
    /// Real content bytes in the block (1..=8)
    pub block_size: u8,
    /// XOR of the eight plaintext bytes
    pub checksum: u8,
}

impl EncryptedBlock {
    /// Lay the block out as wire bytes, masking length and checksum
    pub fn pack(&self) -> Result<[u8; ENCRYPTED_BLOCK_SIZE]> {
        validate_block_size(self.block_size as usize)?;

        let mut out = [0u8; ENCRYPTED_BLOCK_SIZE];
        for (i, &word) in self.words.iter().enumerate() {
            if word & !WORD_MASK != 0 {
                return Err(ProtocolError::InvalidBlockWord(word));
            }
            // 18 significant bits, left-aligned in three bytes
            let bytes = [(word >> 10) as u8, (word >> 2) as u8, (word << 6) as u8];
            copy_bits(&mut out, i * WORD_BITS, &bytes, 0, WORD_BITS)?;
        }

        let trailer = [
            self.block_size ^ BLOCK_SIZE_XOR_KEY,
            self.checksum ^ BLOCK_CHECKSUM_XOR_KEY,
        ];
        copy_bits(&mut out, LENGTH_OFFSET_BITS, &trailer, 0, 16)?;

        Ok(out)
    }

    /// Read a block back from wire bytes, unmasking length and checksum
    pub fn unpack(bytes: &[u8; ENCRYPTED_BLOCK_SIZE]) -> Result<Self> {
        let mut words = [0u32; WORDS_PER_BLOCK];
        for (i, word) in words.iter_mut().enumerate() {
            let mut field = [0u8; 3];
            copy_bits(&mut field, 0, bytes, i * WORD_BITS, WORD_BITS)?;
            *word = (u32::from(field[0]) << 10) | (u32::from(field[1]) << 2) | (u32::from(field[2]) >> 6);
        }

        let block_size = bytes[LENGTH_OFFSET_BITS / 8] ^ BLOCK_SIZE_XOR_KEY;
        let checksum = bytes[CHECKSUM_OFFSET_BITS / 8] ^ BLOCK_CHECKSUM_XOR_KEY;
        validate_block_size(block_size as usize)?;

        Ok(Self {
            words,
            block_size,
            checksum,
        })
    }
}

/// XOR of all plaintext bytes of a block
#[inline]
pub fn block_checksum(block: &[u8; DECRYPTED_BLOCK_SIZE]) -> u8 {
    block.iter().fold(0, |acc, b| acc ^ b)
}

/// Number of blocks needed for `content_len` plaintext bytes
#[inline]
pub fn block_count(content_len: usize) -> usize {
    content_len.div_ceil(DECRYPTED_BLOCK_SIZE)
}

/// Wire size of the blocks carrying `content_len` plaintext bytes
#[inline]
pub fn encrypted_body_size(content_len: usize) -> usize {
    block_count(content_len) * ENCRYPTED_BLOCK_SIZE
}

fn validate_block_size(size: usize) -> Result<()> {
    if size == 0 || size > DECRYPTED_BLOCK_SIZE {
        return Err(ProtocolError::InvalidBlockSize(size));
    }
    Ok(())
}
