//! Destination transports.
//!
//! This module handles parsing and validating forwarding destinations and
//! sending ASTERIX blocks to them over UDP or Unix datagram sockets.

mod destination;
mod forward;

pub use destination::{Destination, UdpFamily, DEFAULT_PORT};
pub use forward::Forwarder;
