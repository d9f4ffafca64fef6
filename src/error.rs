//! Error types for asterix-relay.

use std::net::IpAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for asterix-relay operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error decoding the capture container
    #[error("capture container error: {0}")]
    Container(#[from] ContainerError),

    /// Error framing ASTERIX blocks
    #[error("framing error: {0}")]
    Frame(#[from] FrameError),

    /// Invalid forwarding destination
    #[error("destination error: {0}")]
    Destination(#[from] DestinationError),

    /// Multicast capture setup or receive failure
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Failure sending a block to the destination
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while decoding the capture container format.
///
/// These are unrecoverable; a stream that ends mid-record is not an error
/// and simply terminates the record sequence.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// Magic number does not identify a little-endian capture file
    #[error("invalid capture magic number {found:02x?}, expected [d4, c3, b2, a1]")]
    BadMagic { found: [u8; 4] },

    /// Stream ended before a complete global header was read
    #[error("capture stream ended after {have} bytes, before the 24-byte global header")]
    TruncatedHeader { have: usize },
}

/// Errors raised while splitting a payload into ASTERIX blocks.
///
/// Fatal under strict framing; absorbed with a debug log under lenient
/// framing.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Zero category, or a declared length below the 3-byte minimum
    #[error("invalid block header at offset {offset}: category {category}, declared length {length}")]
    InvalidHeader {
        offset: usize,
        category: u8,
        length: u16,
    },

    /// Declared length runs past the end of the payload
    #[error("block at offset {offset} declares {length} bytes but only {available} remain")]
    Overrun {
        offset: usize,
        length: u16,
        available: usize,
    },
}

/// Errors validating the forwarding destination, surfaced at startup
/// before any capture data is read.
#[derive(Error, Debug)]
pub enum DestinationError {
    /// Destination string is not a parseable URI
    #[error("invalid destination URI {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        source: url::ParseError,
    },

    /// URI scheme is not one of udp, udp4, udp6 or unix
    #[error("unsupported destination scheme {scheme:?} (expected udp, udp4, udp6 or unix)")]
    UnsupportedScheme { scheme: String },

    /// UDP destination without a host
    #[error("destination URI {uri:?} has no host")]
    MissingHost { uri: String },

    /// Unix destination without a path
    #[error("destination URI {uri:?} has no socket path")]
    MissingPath { uri: String },

    /// UDP port outside the 1-65535 range
    #[error("destination port must be in range 1-65535")]
    InvalidPort,

    /// UDP host did not resolve to an address of the requested family
    #[error("could not resolve destination host {host:?}")]
    Resolve { host: String },

    /// Unix socket path does not exist or is unreadable
    #[error("could not read {}: {source}", path.display())]
    PathUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unix path exists but is not a datagram socket
    #[error("{} is not a unix socket", path.display())]
    NotASocket { path: PathBuf },
}

/// Errors opening the multicast capture source or receiving from it.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Group address is outside the multicast range for its family
    #[error("{addr} is not a multicast IP address")]
    NotMulticast { addr: IpAddr },

    /// Listening socket could not be created or bound
    #[error("could not bind UDP socket on port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },

    /// No interface produced a usable group membership
    #[error("no usable multicast membership for group {group} (interface filter: {})", interface.as_deref().unwrap_or("none"))]
    NoMembership {
        group: IpAddr,
        interface: Option<String>,
    },

    /// Socket failed after a successful join
    #[error("multicast receive failed: {source}")]
    Receive { source: std::io::Error },
}

/// A failed datagram send, reported per call and never retried.
#[derive(Error, Debug)]
#[error("send to {destination} failed: {source}")]
pub struct TransportError {
    pub destination: String,
    #[source]
    pub source: std::io::Error,
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
