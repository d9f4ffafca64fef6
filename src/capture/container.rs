//! Incremental decoder for the legacy PCAP capture container.
//!
//! The container is a 24-byte global header followed by a sequence of
//! 16-byte record headers, each carrying `captured_len` bytes of frame
//! data. All numeric fields are little-endian; the magic number is the
//! only accepted byte order and is never guessed.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::ContainerError;

/// Magic number identifying a little-endian capture file.
pub const MAGIC: [u8; 4] = [0xd4, 0xc3, 0xb2, 0xa1];

/// Fixed size of the container's global header.
pub const GLOBAL_HEADER_LEN: usize = 24;

/// Fixed size of each record header.
pub const RECORD_HEADER_LEN: usize = 16;

/// Container-level metadata, parsed once at the start of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalHeader {
    pub version_major: u16,
    pub version_minor: u16,
    /// GMT offset in seconds.
    pub thiszone: i32,
    /// Timestamp accuracy, in practice always zero.
    pub sigfigs: u32,
    /// Maximum captured length per record.
    pub snaplen: u32,
    /// Link layer type (e.g. 1 = Ethernet).
    pub link_type: u32,
}

/// One captured link frame.
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,

    /// Captured length (may be less than original).
    pub captured_len: u32,

    /// Original length on the wire.
    pub original_len: u32,

    /// Raw frame bytes.
    pub data: Bytes,
}

/// Incremental state machine over a capture byte stream.
///
/// Input is appended with [`feed`](Self::feed); complete records are pulled
/// with [`next_record`](Self::next_record). A record is only emitted once
/// its full declared payload is buffered, so a trailing partial record at
/// end of stream is simply never returned.
#[derive(Debug, Default)]
pub struct ContainerParser {
    buf: BytesMut,
    header: Option<GlobalHeader>,
}

impl ContainerParser {
    /// Create a parser with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw input bytes to the accumulation buffer.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// The global header, once enough input has been buffered to parse it.
    pub fn global_header(&self) -> Option<&GlobalHeader> {
        self.header.as_ref()
    }

    /// Number of buffered bytes not yet consumed by a complete record.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Decode the next complete record.
    ///
    /// Returns `Ok(None)` when more input is needed. The first call that
    /// sees 24 buffered bytes validates the global header and fails with
    /// [`ContainerError::BadMagic`] if the stream is not a little-endian
    /// capture file.
    pub fn next_record(&mut self) -> Result<Option<CaptureRecord>, ContainerError> {
        if self.header.is_none() {
            if self.buf.len() < GLOBAL_HEADER_LEN {
                return Ok(None);
            }
            self.header = Some(self.parse_global_header()?);
        }

        if self.buf.len() < RECORD_HEADER_LEN {
            return Ok(None);
        }

        let ts_sec = read_u32_le(&self.buf, 0);
        let ts_usec = read_u32_le(&self.buf, 4);
        let captured_len = read_u32_le(&self.buf, 8);
        let original_len = read_u32_le(&self.buf, 12);

        let needed = RECORD_HEADER_LEN + captured_len as usize;
        if self.buf.len() < needed {
            return Ok(None);
        }

        self.buf.advance(RECORD_HEADER_LEN);
        let data = self.buf.split_to(captured_len as usize).freeze();

        Ok(Some(CaptureRecord {
            timestamp_ms: i64::from(ts_sec) * 1000 + i64::from(ts_usec) / 1000,
            captured_len,
            original_len,
            data,
        }))
    }

    fn parse_global_header(&mut self) -> Result<GlobalHeader, ContainerError> {
        let magic = [self.buf[0], self.buf[1], self.buf[2], self.buf[3]];
        if magic != MAGIC {
            return Err(ContainerError::BadMagic { found: magic });
        }

        let header = GlobalHeader {
            version_major: read_u16_le(&self.buf, 4),
            version_minor: read_u16_le(&self.buf, 6),
            thiszone: read_u32_le(&self.buf, 8) as i32,
            sigfigs: read_u32_le(&self.buf, 12),
            snaplen: read_u32_le(&self.buf, 16),
            link_type: read_u32_le(&self.buf, 20),
        };
        self.buf.advance(GLOBAL_HEADER_LEN);

        Ok(header)
    }
}

fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a global header with the fixture values used throughout.
    fn global_header() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&MAGIC);
        data.extend_from_slice(&2u16.to_le_bytes()); // version major
        data.extend_from_slice(&4u16.to_le_bytes()); // version minor
        data.extend_from_slice(&0u32.to_le_bytes()); // thiszone
        data.extend_from_slice(&0u32.to_le_bytes()); // sigfigs
        data.extend_from_slice(&65535u32.to_le_bytes()); // snaplen
        data.extend_from_slice(&1u32.to_le_bytes()); // link type: Ethernet
        data
    }

    fn record(ts_sec: u32, ts_usec: u32, payload: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&ts_sec.to_le_bytes());
        data.extend_from_slice(&ts_usec.to_le_bytes());
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_parse_global_header_fields() {
        let mut parser = ContainerParser::new();
        parser.feed(&global_header());

        assert!(parser.next_record().unwrap().is_none());

        let header = parser.global_header().expect("header should be parsed");
        assert_eq!(header.version_major, 2);
        assert_eq!(header.version_minor, 4);
        assert_eq!(header.thiszone, 0);
        assert_eq!(header.sigfigs, 0);
        assert_eq!(header.snaplen, 65535);
        assert_eq!(header.link_type, 1);
    }

    #[test]
    fn test_bad_magic_rejected_before_any_record() {
        // Big-endian magic is not guessed; it is an error.
        let mut data = global_header();
        data[0..4].copy_from_slice(&[0xa1, 0xb2, 0xc3, 0xd4]);
        data.extend_from_slice(&record(0, 0, &[0xab; 4]));

        let mut parser = ContainerParser::new();
        parser.feed(&data);

        match parser.next_record() {
            Err(ContainerError::BadMagic { found }) => {
                assert_eq!(found, [0xa1, 0xb2, 0xc3, 0xd4]);
            }
            other => panic!("expected BadMagic, got {other:?}"),
        }
        assert!(parser.global_header().is_none());
    }

    #[test]
    fn test_emits_records_in_order() {
        let mut data = global_header();
        data.extend_from_slice(&record(1, 0, b"one"));
        data.extend_from_slice(&record(2, 0, b"twoo"));
        data.extend_from_slice(&record(3, 0, b"three"));

        let mut parser = ContainerParser::new();
        parser.feed(&data);

        let payloads: Vec<Bytes> = std::iter::from_fn(|| parser.next_record().unwrap())
            .map(|r| r.data)
            .collect();
        assert_eq!(payloads, vec![&b"one"[..], &b"twoo"[..], &b"three"[..]]);
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_timestamp_millisecond_resolution() {
        let mut data = global_header();
        data.extend_from_slice(&record(1, 1999, b"x"));

        let mut parser = ContainerParser::new();
        parser.feed(&data);

        let rec = parser.next_record().unwrap().expect("one record");
        // 1 s + floor(1999 us / 1000) = 1001 ms
        assert_eq!(rec.timestamp_ms, 1001);
        assert_eq!(rec.captured_len, 1);
        assert_eq!(rec.original_len, 1);
    }

    #[test]
    fn test_partial_record_waits_for_more_input() {
        let mut parser = ContainerParser::new();
        parser.feed(&global_header());

        let rec = record(0, 0, &[0x11; 10]);
        let (head, tail) = rec.split_at(20);

        parser.feed(head);
        assert!(parser.next_record().unwrap().is_none());

        parser.feed(tail);
        let rec = parser.next_record().unwrap().expect("complete record");
        assert_eq!(rec.data.len(), 10);
    }

    #[test]
    fn test_trailing_partial_record_never_emitted() {
        let mut data = global_header();
        data.extend_from_slice(&record(0, 0, b"full"));
        // Record header declaring 100 bytes, followed by only 5.
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 5]);

        let mut parser = ContainerParser::new();
        parser.feed(&data);

        assert_eq!(parser.next_record().unwrap().unwrap().data, &b"full"[..]);
        assert!(parser.next_record().unwrap().is_none());
        assert_eq!(parser.buffered(), RECORD_HEADER_LEN + 5);
    }

    #[test]
    fn test_byte_at_a_time_feeding() {
        let mut data = global_header();
        data.extend_from_slice(&record(7, 0, b"ab"));
        data.extend_from_slice(&record(8, 0, b"cd"));

        let mut parser = ContainerParser::new();
        let mut records = Vec::new();
        for byte in data {
            parser.feed(&[byte]);
            while let Some(rec) = parser.next_record().unwrap() {
                records.push(rec);
            }
        }

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp_ms, 7000);
        assert_eq!(records[1].timestamp_ms, 8000);
    }

    #[test]
    fn test_zero_length_record() {
        let mut data = global_header();
        data.extend_from_slice(&record(5, 0, b""));
        data.extend_from_slice(&record(6, 0, b"next"));

        let mut parser = ContainerParser::new();
        parser.feed(&data);

        let first = parser.next_record().unwrap().expect("empty record");
        assert!(first.data.is_empty());
        let second = parser.next_record().unwrap().expect("following record");
        assert_eq!(second.data, &b"next"[..]);
    }
}
