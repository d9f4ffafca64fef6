//! Length-prefixed block extraction.

use tracing::debug;

use crate::capture::RawPacket;
use crate::error::FrameError;

use super::{AsterixBlock, MIN_BLOCK_LEN};

/// What to do with an invalid block header.
///
/// Category and length are the only framing signal, so there is no way to
/// resynchronize after a bad header; the choice is between failing the
/// pipeline and abandoning the rest of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramingPolicy {
    /// An invalid header aborts the whole pipeline. Default for offline
    /// capture analysis, where the input is expected to be clean.
    #[default]
    Strict,

    /// An invalid header discards the remainder of the payload as
    /// non-ASTERIX noise, logged at debug level. Default for live
    /// proxying.
    Lenient,
}

/// Splits payloads into ASTERIX blocks under a framing policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Framer {
    policy: FramingPolicy,
}

impl Framer {
    /// Create a framer with the given policy.
    pub fn new(policy: FramingPolicy) -> Self {
        Self { policy }
    }

    /// The configured policy.
    pub fn policy(&self) -> FramingPolicy {
        self.policy
    }

    /// Extract every block from a packet's payload.
    ///
    /// A packet can yield zero, one or many blocks; each inherits the
    /// packet timestamp. Trailing fragments shorter than the 3-byte
    /// minimum header are discarded as padding.
    pub fn frame(&self, packet: &RawPacket) -> Result<Vec<AsterixBlock>, FrameError> {
        let payload = &packet.payload;
        let mut blocks = Vec::new();
        let mut start = 0;

        while payload.len() - start >= MIN_BLOCK_LEN {
            let category = payload[start];
            let length = u16::from_be_bytes([payload[start + 1], payload[start + 2]]);

            if category == 0 || (length as usize) < MIN_BLOCK_LEN {
                match self.policy {
                    FramingPolicy::Strict => {
                        return Err(FrameError::InvalidHeader {
                            offset: start,
                            category,
                            length,
                        });
                    }
                    FramingPolicy::Lenient => {
                        debug!(
                            offset = start,
                            category, length, "invalid block header, discarding payload remainder"
                        );
                        return Ok(blocks);
                    }
                }
            }

            let end = start + length as usize;
            if end > payload.len() {
                match self.policy {
                    FramingPolicy::Strict => {
                        return Err(FrameError::Overrun {
                            offset: start,
                            length,
                            available: payload.len() - start,
                        });
                    }
                    FramingPolicy::Lenient => {
                        debug!(
                            offset = start,
                            length,
                            available = payload.len() - start,
                            "truncated block, discarding payload remainder"
                        );
                        return Ok(blocks);
                    }
                }
            }

            blocks.push(AsterixBlock {
                timestamp_ms: packet.timestamp_ms,
                category,
                length,
                data: payload.slice(start..end),
            });
            start = end;
        }

        Ok(blocks)
    }
}
