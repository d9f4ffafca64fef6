//! ASTERIX block framing.
//!
//! ASTERIX transport framing concatenates self-describing blocks: one
//! category byte followed by a 16-bit big-endian length covering the whole
//! block, header included. This module splits stripped payloads into those
//! blocks; it does not interpret data-item content.

mod framer;

pub use framer::{Framer, FramingPolicy};

use bytes::Bytes;

/// Minimum block size: category byte plus the 16-bit length field.
pub const MIN_BLOCK_LEN: usize = 3;

/// One length-prefixed ASTERIX data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsterixBlock {
    /// Timestamp inherited from the packet the block was extracted from,
    /// in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,

    /// Category code (1-255).
    pub category: u8,

    /// Declared block length, including the 3-byte header.
    pub length: u16,

    /// Raw block bytes, length-prefixed header included.
    pub data: Bytes,
}
