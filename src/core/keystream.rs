//! # Keystream State
//!
//! Per-connection keystream material: a block counter and a four-word ring buffer.
//!
//! The state is plain mutable data owned by exactly one pipeline. The block
//! transform reads the ring buffer and advances the counter once per block; this
//! module assigns no meaning to the key words themselves.

use crate::config::RING_BUFFER_WORDS;
use std::ops::{Index, IndexMut};

/// Four key words populated by key negotiation before first use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingBuffer {
    words: [u32; RING_BUFFER_WORDS],
}

impl RingBuffer {
    pub fn new(words: [u32; RING_BUFFER_WORDS]) -> Self {
        Self { words }
    }

    pub fn words(&self) -> &[u32; RING_BUFFER_WORDS] {
        &self.words
    }
}

impl From<[u32; RING_BUFFER_WORDS]> for RingBuffer {
    fn from(words: [u32; RING_BUFFER_WORDS]) -> Self {
        Self::new(words)
    }
}

impl Index<usize> for RingBuffer {
    type Output = u32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.words[index]
    }
}

impl IndexMut<usize> for RingBuffer {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.words[index]
    }
}

/// Counter and ring buffer for one connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeystreamState {
    counter: u32,
    ring_buffer: RingBuffer,
}

impl KeystreamState {
    /// Create a state with a zero counter and zeroed key words
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state with a zero counter and the negotiated key words
    pub fn with_keys(words: [u32; RING_BUFFER_WORDS]) -> Self {
        Self {
            counter: 0,
            ring_buffer: RingBuffer::new(words),
        }
    }

    /// Current block index
    #[inline]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Move to the next block. Called by the block transform, once per block.
    #[inline]
    pub fn advance(&mut self) {
        self.counter = self.counter.wrapping_add(1);
    }

    /// Set the counter back to zero. Key words are kept.
    #[inline]
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    pub fn ring_buffer(&self) -> &RingBuffer {
        &self.ring_buffer
    }

    pub fn ring_buffer_mut(&mut self) -> &mut RingBuffer {
        &mut self.ring_buffer
    }
}
