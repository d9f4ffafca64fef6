//! Unified datagram forwarder.
//!
//! One `send` contract over two transports. The transport variant is
//! resolved once at construction; after that, sending a block is a single
//! best-effort datagram with no retry and no buffering, and each send
//! completes before the caller hands over the next block, preserving
//! forwarding order.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::{lookup_host, UdpSocket, UnixDatagram};
use tracing::debug;

use crate::error::{DestinationError, Error, TransportError};

use super::destination::{Destination, UdpFamily};

enum Transport {
    Udp(UdpSocket),
    Unix(UnixDatagram),
}

/// Sends ASTERIX blocks to one destination.
///
/// The underlying socket is exclusively owned; connection and validation
/// failures are fatal at construction, send failures are reported per
/// call.
pub struct Forwarder {
    transport: Transport,
    destination: Destination,
}

impl Forwarder {
    /// Validate the destination and connect to it.
    ///
    /// For UDP this resolves the host once and connects a client socket;
    /// for Unix it verifies the path is an existing datagram socket and
    /// performs the connect handshake once.
    pub async fn connect(destination: Destination) -> Result<Self, Error> {
        destination.validate()?;

        let transport = match &destination {
            Destination::Udp { host, port, family } => {
                let remote = resolve(host, *port, *family).await?;
                let local: SocketAddr = if remote.is_ipv4() {
                    (Ipv4Addr::UNSPECIFIED, 0).into()
                } else {
                    (Ipv6Addr::UNSPECIFIED, 0).into()
                };
                let socket = UdpSocket::bind(local).await?;
                socket.connect(remote).await?;
                Transport::Udp(socket)
            }
            Destination::Unix { path } => {
                let socket = UnixDatagram::unbound()?;
                socket.connect(path)?;
                Transport::Unix(socket)
            }
        };

        debug!(destination = %destination, "forwarder connected");
        Ok(Self {
            transport,
            destination,
        })
    }

    /// The destination this forwarder was built for.
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Send one block as a single datagram.
    ///
    /// Completion is observable before the next send, so callers can
    /// count, cap and backpressure on it. Failure fails this block only;
    /// the forwarder never retries.
    pub async fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        let result = match &self.transport {
            Transport::Udp(socket) => socket.send(payload).await,
            Transport::Unix(socket) => socket.send(payload).await,
        };

        match result {
            Ok(_) => Ok(()),
            Err(source) => Err(TransportError {
                destination: self.destination.to_string(),
                source,
            }),
        }
    }
}

/// Resolve a host to one address of the requested family.
async fn resolve(host: &str, port: u16, family: UdpFamily) -> Result<SocketAddr, DestinationError> {
    let addrs = lookup_host((host, port))
        .await
        .map_err(|_| DestinationError::Resolve {
            host: host.to_string(),
        })?;

    addrs
        .into_iter()
        .find(|addr| match family {
            UdpFamily::Any => true,
            UdpFamily::V4 => addr.is_ipv4(),
            UdpFamily::V6 => addr.is_ipv6(),
        })
        .ok_or_else(|| DestinationError::Resolve {
            host: host.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_udp_forwarder_delivers_datagrams_in_order() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = receiver.local_addr().unwrap().port();

        let destination = Destination::Udp {
            host: "127.0.0.1".to_string(),
            port,
            family: UdpFamily::V4,
        };
        let forwarder = Forwarder::connect(destination).await.unwrap();

        forwarder.send(&[0x01, 0x00, 0x03]).await.unwrap();
        forwarder.send(&[0x30, 0x00, 0x04, 0xff]).await.unwrap();

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[0x01, 0x00, 0x03]);
        let n = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[0x30, 0x00, 0x04, 0xff]);
    }

    #[tokio::test]
    async fn test_unix_forwarder_delivers_datagrams() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sink.socket");
        let receiver = UnixDatagram::bind(&path).unwrap();

        let destination = Destination::Unix { path };
        let forwarder = Forwarder::connect(destination).await.unwrap();

        forwarder.send(&[0x15, 0x00, 0x05, 0xaa, 0xbb]).await.unwrap();

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[0x15, 0x00, 0x05, 0xaa, 0xbb]);
    }

    #[tokio::test]
    async fn test_unix_destination_must_be_a_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.socket");
        std::fs::write(&path, b"regular file").unwrap();

        let result = Forwarder::connect(Destination::Unix { path }).await;
        assert!(matches!(
            result.err(),
            Some(Error::Destination(DestinationError::NotASocket { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unix_destination_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.socket");

        let result = Forwarder::connect(Destination::Unix { path }).await;
        assert!(matches!(
            result.err(),
            Some(Error::Destination(DestinationError::PathUnreadable { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_fatal_at_connect() {
        let destination = Destination::Udp {
            host: "host.invalid".to_string(),
            port: 8600,
            family: UdpFamily::V4,
        };

        let result = Forwarder::connect(destination).await;
        assert!(matches!(
            result.err(),
            Some(Error::Destination(DestinationError::Resolve { .. }))
        ));
    }
}
