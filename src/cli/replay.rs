//! The replay command: capture file to destination socket.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::asterix::{Framer, FramingPolicy};
use crate::capture::{CaptureReader, TimeCompression};
use crate::link::StripMode;
use crate::net::{Destination, Forwarder};

/// Replay a capture file to the destination, forwarding at most
/// `max_count` blocks.
///
/// The destination is validated and connected before the capture file is
/// opened, so configuration errors surface before any data is read.
pub async fn run(
    file: &Path,
    destination: &str,
    max_count: Option<u64>,
    strip: StripMode,
    time_compression: f64,
) -> Result<()> {
    let destination = Destination::parse(destination)?;
    let forwarder = Forwarder::connect(destination).await?;

    let mut reader = CaptureReader::open(file, TimeCompression::from_factor(time_compression))
        .await
        .with_context(|| format!("failed to open capture file: {}", file.display()))?;
    let framer = Framer::new(FramingPolicy::Strict);

    let mut forwarded = 0u64;
    'replay: while let Some(packet) = reader.next_packet().await? {
        let stripped = strip.strip(&packet);
        for block in framer.frame(&stripped)? {
            if max_count.is_some_and(|max| forwarded >= max) {
                debug!(forwarded, "reached forwarding limit");
                break 'replay;
            }
            debug!(
                timestamp_ms = block.timestamp_ms,
                category = block.category,
                length = block.length,
                "forwarding block"
            );
            forwarder.send(&block.data).await?;
            forwarded += 1;
        }
    }

    info!(
        forwarded,
        destination = %forwarder.destination(),
        "replay complete"
    );
    Ok(())
}
