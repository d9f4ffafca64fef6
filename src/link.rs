//! Link-layer header stripping.
//!
//! Removes fixed-size Ethernet/IPv4/UDP or Ethernet/LLC framing from a
//! captured frame to expose the embedded ASTERIX payload. This is a
//! fixed-offset strip, not a protocol parse: frames are assumed to be
//! well-formed and untagged, and any length underflow clamps to an empty
//! payload.

use bytes::Bytes;

use crate::capture::RawPacket;

/// Ethernet II header length.
const ETHERNET_LEN: usize = 14;

/// Fixed IPv4 header length; options are not handled.
const IPV4_LEN: usize = 20;

/// UDP header length.
const UDP_LEN: usize = 8;

/// LLC header length.
const LLC_LEN: usize = 3;

/// Offset of the 16-bit Ethernet length field within the frame.
const ETHER_LENGTH_OFFSET: usize = 12;

/// Framing to remove ahead of the ASTERIX payload.
///
/// Selected by configuration, never auto-detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StripMode {
    /// Ethernet + IPv4 + UDP: a fixed 42-byte prefix.
    #[default]
    Udp,

    /// Ethernet + LLC: a 17-byte prefix, with the payload truncated to the
    /// Ethernet length field minus the LLC header.
    MacLlc,
}

impl StripMode {
    /// Strip the link headers from a captured frame.
    pub fn strip(&self, packet: &RawPacket) -> RawPacket {
        RawPacket::new(packet.timestamp_ms, self.strip_frame(&packet.payload))
    }

    fn strip_frame(&self, frame: &Bytes) -> Bytes {
        match self {
            StripMode::Udp => {
                let offset = (ETHERNET_LEN + IPV4_LEN + UDP_LEN).min(frame.len());
                frame.slice(offset..)
            }
            StripMode::MacLlc => {
                let offset = (ETHERNET_LEN + LLC_LEN).min(frame.len());
                let payload = frame.slice(offset..);
                // The Ethernet length field counts the LLC header but not
                // the Ethernet header itself.
                let declared = ether_length(frame).saturating_sub(LLC_LEN);
                let end = declared.min(payload.len());
                payload.slice(..end)
            }
        }
    }
}

/// The 16-bit big-endian length/type field of an Ethernet frame, or zero
/// for frames too short to carry one.
fn ether_length(frame: &[u8]) -> usize {
    if frame.len() < ETHER_LENGTH_OFFSET + 2 {
        return 0;
    }
    u16::from_be_bytes([frame[ETHER_LENGTH_OFFSET], frame[ETHER_LENGTH_OFFSET + 1]]) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(payload: Vec<u8>) -> RawPacket {
        RawPacket::new(42, Bytes::from(payload))
    }

    #[test]
    fn test_udp_mode_strips_fixed_42_byte_prefix() {
        let mut frame = vec![0u8; 42];
        frame.extend_from_slice(&[0x01, 0x00, 0x03]);

        let stripped = StripMode::Udp.strip(&packet(frame));

        assert_eq!(stripped.payload, &[0x01, 0x00, 0x03][..]);
        assert_eq!(stripped.timestamp_ms, 42);
    }

    #[test]
    fn test_udp_mode_short_frame_clamps_to_empty() {
        let stripped = StripMode::Udp.strip(&packet(vec![0u8; 30]));
        assert!(stripped.payload.is_empty());
    }

    #[test]
    fn test_udp_mode_payload_length_is_total_minus_42() {
        for total in [0usize, 41, 42, 43, 100] {
            let stripped = StripMode::Udp.strip(&packet(vec![0u8; total]));
            assert_eq!(stripped.payload.len(), total.saturating_sub(42));
        }
    }

    #[test]
    fn test_macllc_mode_strips_and_truncates_to_ether_length() {
        // Ethernet header with length field = LLC (3) + 4 payload bytes,
        // then one byte of trailing padding past the declared length.
        let mut frame = vec![0u8; 12];
        frame.extend_from_slice(&7u16.to_be_bytes());
        frame.extend_from_slice(&[0xaa, 0xbb, 0xcc]); // LLC header
        frame.extend_from_slice(&[1, 2, 3, 4]);
        frame.push(0xff);

        let stripped = StripMode::MacLlc.strip(&packet(frame));

        assert_eq!(stripped.payload, &[1, 2, 3, 4][..]);
    }

    #[test]
    fn test_macllc_mode_declared_length_underflow_clamps() {
        // Length field smaller than the LLC header: declared payload is zero.
        let mut frame = vec![0u8; 12];
        frame.extend_from_slice(&2u16.to_be_bytes());
        frame.extend_from_slice(&[0xaa, 0xbb, 0xcc]);
        frame.extend_from_slice(&[1, 2, 3]);

        let stripped = StripMode::MacLlc.strip(&packet(frame));

        assert!(stripped.payload.is_empty());
    }

    #[test]
    fn test_macllc_mode_declared_length_beyond_capture_clamps() {
        let mut frame = vec![0u8; 12];
        frame.extend_from_slice(&100u16.to_be_bytes());
        frame.extend_from_slice(&[0xaa, 0xbb, 0xcc]);
        frame.extend_from_slice(&[9, 9]);

        let stripped = StripMode::MacLlc.strip(&packet(frame));

        assert_eq!(stripped.payload, &[9, 9][..]);
    }

    #[test]
    fn test_macllc_mode_short_frame_clamps_to_empty() {
        let stripped = StripMode::MacLlc.strip(&packet(vec![0u8; 10]));
        assert!(stripped.payload.is_empty());
    }
}
