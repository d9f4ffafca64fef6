//! The info command: capture file statistics.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::DateTime;
use indicatif::{ProgressBar, ProgressStyle};

use crate::asterix::{AsterixBlock, Framer, FramingPolicy};
use crate::capture::{CaptureReader, TimeCompression};
use crate::link::StripMode;

/// Statistics aggregated over every decoded block.
#[derive(Debug, Default)]
pub struct CaptureStats {
    pub total_messages: u64,
    pub categories: HashMap<u8, u64>,
    pub first_timestamp_ms: Option<i64>,
    pub last_timestamp_ms: Option<i64>,
}

impl CaptureStats {
    /// Fold one block into the statistics.
    pub fn record(&mut self, block: &AsterixBlock) {
        self.total_messages += 1;
        *self.categories.entry(block.category).or_default() += 1;
        if self.first_timestamp_ms.is_none() {
            self.first_timestamp_ms = Some(block.timestamp_ms);
        }
        self.last_timestamp_ms = Some(block.timestamp_ms);
    }

    /// Capture duration, once at least one block has been seen.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.first_timestamp_ms, self.last_timestamp_ms) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        }
    }
}

/// Decode a capture file and print per-category statistics.
pub async fn run(file: &Path, strip: StripMode, no_progress: bool) -> Result<()> {
    let size = std::fs::metadata(file)
        .with_context(|| format!("could not stat capture file: {}", file.display()))?
        .len();

    let mut reader = CaptureReader::open(file, TimeCompression::Disabled)
        .await
        .with_context(|| format!("failed to open capture file: {}", file.display()))?;
    let framer = Framer::new(FramingPolicy::Strict);

    let progress = if no_progress {
        None
    } else {
        let pb = ProgressBar::new(size);
        pb.set_style(
            ProgressStyle::with_template(
                "[{bar:40}] {percent}% | ETA: {eta} | {bytes}/{total_bytes}",
            )
            .unwrap()
            .progress_chars("=> "),
        );
        Some(pb)
    };

    let mut stats = CaptureStats::default();
    while let Some(packet) = reader.next_packet().await? {
        let stripped = strip.strip(&packet);
        for block in framer.frame(&stripped)? {
            stats.record(&block);
        }
        if let Some(pb) = &progress {
            pb.set_position(reader.bytes_read());
        }
    }
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    print_report(&stats);
    Ok(())
}

fn print_report(stats: &CaptureStats) {
    let format_ts = |ts: Option<i64>| {
        ts.and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    };

    println!();
    println!("{:<18} {}", "Capture started:", format_ts(stats.first_timestamp_ms));
    println!("{:<18} {}", "Capture ended:", format_ts(stats.last_timestamp_ms));
    match stats.duration_ms() {
        Some(ms) => println!("{:<18} {:.3}s", "Capture duration:", ms as f64 / 1000.0),
        None => println!("{:<18} UNKNOWN", "Capture duration:"),
    }
    println!("{:<18} {}", "Total messages:", stats.total_messages);

    println!();
    println!("{:<10} {:>10}", "Category", "Count");
    println!("{:-<21}", "");

    let mut categories: Vec<_> = stats.categories.iter().collect();
    categories.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (category, count) in categories {
        println!("CAT{category:03}     {count:>10}");
    }
}
