//! Command-line argument definitions.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::link::StripMode;

/// Default forwarding destination.
pub const DEFAULT_DESTINATION: &str = "udp4://localhost:8600";

/// Replay and proxy ASTERIX surveillance traffic.
#[derive(Parser, Debug)]
#[command(name = "asterix-relay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Capture framing ahead of the ASTERIX payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    /// Ethernet + IPv4 + UDP framing
    Udp4,
    /// Ethernet + LLC framing
    Macllc,
}

impl From<SourceFormat> for StripMode {
    fn from(format: SourceFormat) -> Self {
        match format {
            SourceFormat::Udp4 => StripMode::Udp,
            SourceFormat::Macllc => StripMode::MacLlc,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Forward ASTERIX packets from a capture file to a unix or udp socket
    Replay {
        /// Source PCAP file (the file can only contain ASTERIX traffic)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Destination to forward the ASTERIX messages to,
        /// e.g. unix:/tmp/asterix.socket or udp4://localhost:8600
        #[arg(short = 'd', long, default_value = DEFAULT_DESTINATION)]
        destination: String,

        /// Number of messages forwarded before exiting
        #[arg(short = 'n', long = "max-count", value_name = "COUNT")]
        max_count: Option<u64>,

        /// Source format
        #[arg(long = "source-format", value_enum, default_value = "udp4")]
        source_format: SourceFormat,

        /// Time compression factor: a value of 2 processes the file twice
        /// as fast as it was recorded; the default 1 replays without pacing
        #[arg(
            long = "time-compression",
            value_name = "FACTOR",
            default_value_t = 1.0,
            value_parser = parse_factor
        )]
        time_compression: f64,
    },

    /// Proxy UDP multicast ASTERIX to a unix or udp socket
    Proxy {
        /// Multicast group address, e.g. 232.1.1.1 or ff02::fb
        #[arg(value_name = "GROUP")]
        group: IpAddr,

        /// UDP port to listen on
        #[arg(short = 'p', long, default_value_t = 8600)]
        port: u16,

        /// Only join the multicast group on this interface
        #[arg(short = 'i', long, value_name = "NAME")]
        interface: Option<String>,

        /// Destination to forward the ASTERIX messages to
        #[arg(short = 'd', long, default_value = DEFAULT_DESTINATION)]
        destination: String,

        /// Number of messages forwarded before exiting
        #[arg(short = 'n', long = "max-count", value_name = "COUNT")]
        max_count: Option<u64>,
    },

    /// Print statistics about a capture file containing ASTERIX messages
    Info {
        /// Source PCAP file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Source format
        #[arg(long = "source-format", value_enum, default_value = "udp4")]
        source_format: SourceFormat,

        /// Hide the decode progress bar
        #[arg(long)]
        no_progress: bool,
    },
}

fn parse_factor(s: &str) -> Result<f64, String> {
    let factor: f64 = s.parse().map_err(|_| format!("{s} is not a number"))?;
    if factor > 0.0 {
        Ok(factor)
    } else {
        Err("time compression factor must be positive".to_string())
    }
}
