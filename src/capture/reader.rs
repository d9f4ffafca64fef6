//! Async capture-file reader with optional replay pacing.

use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::sleep;
use tracing::debug;

use crate::error::{ContainerError, Error};

use super::container::{ContainerParser, GlobalHeader};
use super::packet::RawPacket;

/// Buffer size for reading capture files (64KB).
const READ_CHUNK: usize = 65536;

/// Factor meaning no compression was requested.
const NO_COMPRESSION: f64 = 1.0;

/// Replay pacing configuration.
///
/// With a factor `f`, the reader sleeps `(ts - prev_ts) / f` milliseconds
/// before emitting each record after the first, reproducing the original
/// capture cadence accelerated by `f`. The default factor of 1.0 disables
/// pacing entirely and records are emitted as fast as the downstream
/// consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TimeCompression {
    /// Emit records as fast as the downstream consumes them.
    #[default]
    Disabled,
    /// Divide original inter-record delays by this factor.
    Factor(f64),
}

impl TimeCompression {
    /// Build from a command-line factor; 1.0 (the default) disables pacing.
    pub fn from_factor(factor: f64) -> Self {
        if factor == NO_COMPRESSION {
            Self::Disabled
        } else {
            Self::Factor(factor)
        }
    }

    /// Delay to inject between two consecutive record timestamps.
    fn delay(&self, prev_ms: i64, next_ms: i64) -> Option<Duration> {
        match self {
            Self::Disabled => None,
            Self::Factor(factor) => {
                let delta_ms = (next_ms - prev_ms).max(0) as f64 / factor;
                if delta_ms >= 1.0 {
                    Some(Duration::from_millis(delta_ms as u64))
                } else {
                    None
                }
            }
        }
    }
}

/// Reader producing [`RawPacket`] values from a capture file.
///
/// Drives a [`ContainerParser`] over the file bytes and applies replay
/// pacing between records. Reading is pull-based: nothing is buffered
/// beyond the parser's accumulation buffer, so a slow consumer delays
/// further file reads instead of growing memory.
pub struct CaptureReader<R = File> {
    reader: R,
    parser: ContainerParser,
    compression: TimeCompression,
    last_ts: Option<i64>,
    bytes_read: u64,
    packets: u64,
    eof: bool,
    chunk: Vec<u8>,
}

impl CaptureReader<File> {
    /// Open a capture file for reading.
    pub async fn open<P: AsRef<Path>>(
        path: P,
        compression: TimeCompression,
    ) -> Result<Self, Error> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::new(file, compression))
    }
}

impl<R: AsyncRead + Unpin> CaptureReader<R> {
    /// Wrap an already-open byte source.
    pub fn new(reader: R, compression: TimeCompression) -> Self {
        Self {
            reader,
            parser: ContainerParser::new(),
            compression,
            last_ts: None,
            bytes_read: 0,
            packets: 0,
            eof: false,
            chunk: vec![0u8; READ_CHUNK],
        }
    }

    /// The container's global header, once parsed.
    pub fn global_header(&self) -> Option<&GlobalHeader> {
        self.parser.global_header()
    }

    /// Total bytes consumed from the underlying source so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Packets emitted so far.
    pub fn packet_count(&self) -> u64 {
        self.packets
    }

    /// Read the next packet, honoring the pacing delay.
    ///
    /// Returns `Ok(None)` at end of stream. A trailing partial record is
    /// discarded, not emitted; a stream too short to contain the global
    /// header is a [`ContainerError::TruncatedHeader`].
    pub async fn next_packet(&mut self) -> Result<Option<RawPacket>, Error> {
        loop {
            if let Some(record) = self.parser.next_record()? {
                if let Some(prev_ms) = self.last_ts {
                    if let Some(delay) = self.compression.delay(prev_ms, record.timestamp_ms) {
                        sleep(delay).await;
                    }
                }
                self.last_ts = Some(record.timestamp_ms);
                self.packets += 1;
                return Ok(Some(RawPacket::new(record.timestamp_ms, record.data)));
            }

            if self.eof {
                if self.parser.global_header().is_none() {
                    return Err(ContainerError::TruncatedHeader {
                        have: self.parser.buffered(),
                    }
                    .into());
                }
                let leftover = self.parser.buffered();
                if leftover > 0 {
                    debug!(leftover, "discarding trailing partial record");
                }
                debug!(packets = self.packets, "capture stream complete");
                return Ok(None);
            }

            let n = self.reader.read(&mut self.chunk).await?;
            if n == 0 {
                self.eof = true;
            } else {
                self.bytes_read += n as u64;
                self.parser.feed(&self.chunk[..n]);
            }
        }
    }
}
