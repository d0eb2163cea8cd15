//! # simple-modulus
//!
//! Shared machinery of the "simple modulus" packet obfuscation scheme: per-connection
//! keystream state, a bit-level packer for the non-byte-aligned fields of the
//! 11-byte wire block, and the framing glue that copies assembled packets into an
//! outbound byte stream without flushing it.
//!
//! This is obfuscation, not cryptography. The per-block transform and the key
//! exchange that fills the ring buffer are supplied by the caller through
//! [`pipeline::BlockTransform`] and [`core::keystream::KeystreamState::with_keys`].
//!
//! ## Modules
//! - [`core`]: keystream state, bit packer, block layout, headers, framer
//! - [`pipeline`]: encryptor/decryptor shells and the async pump
//! - [`transport`]: byte sink/source seams and tokio-backed implementations
//! - [`config`]: wire constants and runtime configuration
//! - [`error`]: the crate-wide error type
//!
//! ## Example
//! ```rust
//! use simple_modulus::core::header::{CompactHeaderCodec, HeaderScratch};
//!
//! let mut header = HeaderScratch::new(CompactHeaderCodec);
//! header.observe(&[0x80, 0x00, 14]);
//! assert_eq!(header.content_size(false).unwrap(), 11);
//! assert_eq!(header.content_size(true).unwrap(), 12);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod transport;

pub use crate::core::header::{CompactHeaderCodec, HeaderCodec, HeaderScratch};
pub use crate::core::keystream::{KeystreamState, RingBuffer};
pub use error::{ProtocolError, Result};
pub use pipeline::{
    run_pipeline, BlockCipherPipeline, BlockTransform, Decryptor, Encryptor, PipelineContext,
    PipelineStats,
};
pub use transport::{BufferedSink, BufferedSource, ByteSink, ByteSource};
