//! asterix-relay - replay and proxy ASTERIX surveillance traffic.
//!
//! This library decodes legacy PCAP capture containers, strips link-layer
//! framing, splits payloads into length-prefixed ASTERIX data blocks and
//! forwards them over UDP or Unix datagram sockets. A live capture source
//! joins UDP multicast groups and feeds the same framing pipeline.
//!
//! # Example
//!
//! ```no_run
//! use asterix_relay::asterix::{Framer, FramingPolicy};
//! use asterix_relay::capture::{CaptureReader, TimeCompression};
//! use asterix_relay::link::StripMode;
//! use asterix_relay::net::{Destination, Forwarder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let destination = Destination::parse("udp4://localhost:8600")?;
//!     let forwarder = Forwarder::connect(destination).await?;
//!     let mut reader = CaptureReader::open("capture.pcap", TimeCompression::Disabled).await?;
//!     let framer = Framer::new(FramingPolicy::Strict);
//!
//!     while let Some(packet) = reader.next_packet().await? {
//!         let stripped = StripMode::Udp.strip(&packet);
//!         for block in framer.frame(&stripped)? {
//!             forwarder.send(&block.data).await?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod asterix;
pub mod capture;
pub mod cli;
pub mod error;
pub mod link;
pub mod net;

pub use error::{Error, Result};
