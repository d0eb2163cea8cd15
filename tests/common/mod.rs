//! Shared helpers for integration tests: a toy block transform and packet builders.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use simple_modulus::config::{DECRYPTED_BLOCK_SIZE, ENCRYPTED_BLOCK_SIZE, HEADER_SCRATCH_SIZE};
use simple_modulus::core::block::{block_checksum, EncryptedBlock, WORDS_PER_BLOCK};
use simple_modulus::{
    BlockTransform, CompactHeaderCodec, Decryptor, Encryptor, HeaderCodec, KeystreamState,
    ProtocolError, Result,
};

pub const TEST_KEYS: [u32; 4] = [0x1234_5678, 0x9ABC_DEF0, 0x0F1E_2D3C, 0x4B5A_6978];

/// XORs each 16-bit pair with a ring-buffer word and widens it to 18 bits.
/// Not a cipher; it only exercises the block layout and keystream contract.
#[derive(Debug, Default)]
pub struct ToyTransform;

fn word_key(keys: &KeystreamState, index: usize) -> u16 {
    (keys.ring_buffer()[index] >> 8) as u16
}

fn word_tag(keys: &KeystreamState, index: usize) -> u32 {
    keys.ring_buffer()[index] & 0b11
}

impl BlockTransform for ToyTransform {
    fn encrypt_block(
        &mut self,
        keys: &mut KeystreamState,
        input: &[u8; DECRYPTED_BLOCK_SIZE],
        block_size: usize,
        output: &mut [u8; ENCRYPTED_BLOCK_SIZE],
    ) -> Result<()> {
        let mut words = [0u32; WORDS_PER_BLOCK];
        for (i, word) in words.iter_mut().enumerate() {
            let pair = u16::from_be_bytes([input[2 * i], input[2 * i + 1]]) ^ word_key(keys, i);
            *word = (u32::from(pair) << 2) | word_tag(keys, i);
        }

        let block = EncryptedBlock {
            words,
            block_size: block_size as u8,
            checksum: block_checksum(input),
        };
        *output = block.pack()?;
        keys.advance();
        Ok(())
    }

    fn decrypt_block(
        &mut self,
        keys: &mut KeystreamState,
        input: &[u8; ENCRYPTED_BLOCK_SIZE],
        output: &mut [u8; DECRYPTED_BLOCK_SIZE],
    ) -> Result<usize> {
        let block = EncryptedBlock::unpack(input)?;
        for (i, word) in block.words.iter().enumerate() {
            if word & 0b11 != word_tag(keys, i) {
                return Err(ProtocolError::ChecksumMismatch);
            }
            let pair = ((word >> 2) as u16) ^ word_key(keys, i);
            output[2 * i..2 * i + 2].copy_from_slice(&pair.to_be_bytes());
        }

        if block_checksum(output) != block.checksum {
            return Err(ProtocolError::ChecksumMismatch);
        }
        keys.advance();
        Ok(block.block_size as usize)
    }
}

/// Transform that never advances the counter
#[derive(Debug, Default)]
pub struct StuckTransform;

impl BlockTransform for StuckTransform {
    fn encrypt_block(
        &mut self,
        _keys: &mut KeystreamState,
        _input: &[u8; DECRYPTED_BLOCK_SIZE],
        _block_size: usize,
        _output: &mut [u8; ENCRYPTED_BLOCK_SIZE],
    ) -> Result<()> {
        Ok(())
    }

    fn decrypt_block(
        &mut self,
        _keys: &mut KeystreamState,
        _input: &[u8; ENCRYPTED_BLOCK_SIZE],
        _output: &mut [u8; DECRYPTED_BLOCK_SIZE],
    ) -> Result<usize> {
        Ok(DECRYPTED_BLOCK_SIZE)
    }
}

pub fn encryptor() -> Encryptor<ToyTransform> {
    Encryptor::new(
        ToyTransform,
        KeystreamState::with_keys(TEST_KEYS),
        CompactHeaderCodec,
    )
}

pub fn decryptor() -> Decryptor<ToyTransform> {
    Decryptor::new(
        ToyTransform,
        KeystreamState::with_keys(TEST_KEYS),
        CompactHeaderCodec,
    )
}

/// Plaintext packet: compact header followed by `body`
pub fn plain_packet(body: &[u8]) -> Vec<u8> {
    let mut header = [0u8; HEADER_SCRATCH_SIZE];
    let len = CompactHeaderCodec
        .write_header(body.len(), &mut header)
        .expect("body fits in a packet");
    let mut packet = header[..len].to_vec();
    packet.extend_from_slice(body);
    packet
}

/// Body of `len` bytes with a recognizable pattern
pub fn pattern_body(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}
