//! # Core Pipeline Components
//!
//! Per-connection state, bit-level block packing and packet framing.
//!
//! Everything in this module is synchronous and operates on buffers that are
//! already in memory; suspension only happens at the transport boundary.
//!
//! ## Components
//! - **Keystream**: block counter and four-word ring buffer
//! - **Bit Shift**: moves bit fields between arbitrary bit offsets
//! - **Block**: layout of the 11-byte encrypted block
//! - **Header**: header codec seam and the 3-byte header scratch
//! - **Framer**: copies complete packets into an outbound sink
//!
//! ## Wire Format
//! ```text
//! packet:          [Header(1|3)] [Block(11)] [Block(11)] ...
//! decrypted block: [Content(8)]
//! encrypted block: [Words(4 x 18 bits)] [Length ^ 0x3D] [Checksum ^ 0xF8]
//! ```

pub mod bitshift;
pub mod block;
pub mod framer;
pub mod header;
pub mod keystream;
