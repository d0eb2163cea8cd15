//! # Error Types
//!
//! Error handling for the simple-modulus pipeline core.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`ProtocolError`].
//!
//! ## Error Categories
//! - **Framing Errors**: a packet shorter than its header declares, misaligned
//!   encrypted bodies, oversized packets
//! - **Block Errors**: invalid block sizes, checksum mismatches, keystream desync
//! - **Capacity Errors**: caller-side buffer sizing mistakes in the bit packer
//! - **Transport Errors**: I/O failures, closed connections, cancellation, timeouts
//! - **Configuration Errors**: invalid or unreadable configuration
//!
//! Framing and block errors are connection-level faults. A corrupt stream cannot be
//! repaired locally, so none of them are retried.
//!
//! ## Example Usage
//! ```rust
//! use simple_modulus::error::{ProtocolError, Result};
//!
//! fn require(expected: usize, available: usize) -> Result<()> {
//!     if available < expected {
//!         return Err(ProtocolError::Framing { expected, available });
//!     }
//!     Ok(())
//! }
//!
//! assert!(require(14, 11).is_err());
//! ```

use std::io;
use thiserror::Error;

// ProtocolError is the primary error type for all pipeline operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid packet header")]
    InvalidHeader,

    #[error("Framing error: packet declares {expected} bytes but only {available} are available")]
    Framing { expected: usize, available: usize },

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Encrypted body of {0} bytes is not a whole number of blocks")]
    MisalignedBlocks(usize),

    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),

    #[error("Block word does not fit in 18 bits: {0:#x}")]
    InvalidBlockWord(u32),

    #[error("Block checksum mismatch")]
    ChecksumMismatch,

    #[error("Packet sequence mismatch: expected {expected}, got {actual}")]
    SequenceMismatch { expected: u8, actual: u8 },

    #[error("Keystream desync: counter moved from {before} to {after} for one block")]
    KeystreamDesync { before: u32, after: u32 },

    #[error("Buffer capacity exceeded: need {required} bytes, have {available}")]
    Capacity { required: usize, available: usize },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Timeout occurred")]
    Timeout,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
