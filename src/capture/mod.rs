//! Capture sources.
//!
//! This module handles decoding legacy PCAP capture containers into
//! timestamped packets, optionally paced to the original capture cadence,
//! and receiving live packets from UDP multicast groups.

mod container;
mod multicast;
mod packet;
mod reader;

pub use container::{CaptureRecord, ContainerParser, GlobalHeader};
pub use multicast::{MulticastBinding, MulticastConfig, MulticastSource};
pub use packet::RawPacket;
pub use reader::{CaptureReader, TimeCompression};
