//! Raw packet representation.

use bytes::Bytes;

/// A timestamped payload passed between pipeline stages.
///
/// Produced by the capture container parser (payload = captured link frame)
/// or the multicast source (payload = received datagram), and consumed by
/// the link stripper and the ASTERIX framer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    /// Capture or arrival time in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,

    /// Payload bytes.
    pub payload: Bytes,
}

impl RawPacket {
    /// Create a new raw packet.
    pub fn new(timestamp_ms: i64, payload: Bytes) -> Self {
        Self {
            timestamp_ms,
            payload,
        }
    }
}
