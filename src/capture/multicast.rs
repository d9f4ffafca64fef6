//! Live multicast capture source.
//!
//! Joins a multicast group on the host's network interfaces and emits each
//! received datagram as a [`RawPacket`] stamped with its arrival time. No
//! capture container or link framing is involved for live traffic.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use bytes::Bytes;
use chrono::Utc;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::error::NetworkError;

use super::packet::RawPacket;

/// Largest datagram the source will accept.
const MAX_DATAGRAM: usize = 65536;

/// Bound on packets queued between the receive task and the consumer.
///
/// Decouples datagram arrival from downstream processing; a slow consumer
/// grows backlog up to this bound without stalling the receive loop long
/// enough to drop group membership.
const QUEUE_DEPTH: usize = 1024;

/// Configuration for joining a multicast group.
#[derive(Debug, Clone)]
pub struct MulticastConfig {
    /// Group address to join; must be in the multicast range.
    pub group: IpAddr,

    /// UDP port to listen on.
    pub port: u16,

    /// Restrict membership to this interface name.
    pub interface: Option<String>,
}

/// One (interface, group) membership established at startup.
#[derive(Debug, Clone)]
pub struct MulticastBinding {
    /// Interface name the membership was joined on.
    pub interface: String,

    /// Local address used for the join.
    pub local_addr: IpAddr,

    /// The multicast group.
    pub group: IpAddr,
}

/// Receives datagrams from a multicast group on one or more interfaces.
///
/// A background task owns the socket and pushes arrival-stamped packets
/// into a bounded queue; dropping the source stops the task and releases
/// the socket.
pub struct MulticastSource {
    bindings: Vec<MulticastBinding>,
    rx: mpsc::Receiver<std::io::Result<RawPacket>>,
    task: JoinHandle<()>,
}

impl MulticastSource {
    /// Validate the group, bind the listening socket and join the group on
    /// every matching interface.
    ///
    /// Interface enumeration happens once; memberships are not refreshed if
    /// host interfaces change later. Zero usable memberships is a fatal
    /// [`NetworkError::NoMembership`].
    pub async fn bind(config: MulticastConfig) -> Result<Self, NetworkError> {
        if !config.group.is_multicast() {
            return Err(NetworkError::NotMulticast { addr: config.group });
        }

        let socket = open_reuse_socket(config.group, config.port)?;
        let bindings = join_group(&socket, &config)?;
        if bindings.is_empty() {
            return Err(NetworkError::NoMembership {
                group: config.group,
                interface: config.interface,
            });
        }

        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let task = tokio::spawn(receive_loop(socket, tx));

        Ok(Self { bindings, rx, task })
    }

    /// Memberships established during startup.
    pub fn bindings(&self) -> &[MulticastBinding] {
        &self.bindings
    }

    /// Next received datagram.
    ///
    /// Returns `Ok(None)` once the receive task has stopped. A socket error
    /// after a successful join is fatal and surfaces here.
    pub async fn next_packet(&mut self) -> Result<Option<RawPacket>, NetworkError> {
        match self.rx.recv().await {
            Some(Ok(packet)) => Ok(Some(packet)),
            Some(Err(source)) => Err(NetworkError::Receive { source }),
            None => Ok(None),
        }
    }
}

impl Drop for MulticastSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Open a nonblocking, reuse-address UDP socket bound to the unspecified
/// address of the group's family, so multiple instances can share the port.
fn open_reuse_socket(group: IpAddr, port: u16) -> Result<UdpSocket, NetworkError> {
    let bind = |source| NetworkError::Bind { port, source };

    let domain = if group.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP)).map_err(bind)?;
    socket.set_reuse_address(true).map_err(bind)?;
    socket.set_nonblocking(true).map_err(bind)?;

    let addr: SocketAddr = if group.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, port).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, port).into()
    };
    socket.bind(&addr.into()).map_err(bind)?;

    UdpSocket::from_std(socket.into()).map_err(bind)
}

/// Join the group on every interface whose address family matches,
/// optionally filtered to one interface name.
fn join_group(
    socket: &UdpSocket,
    config: &MulticastConfig,
) -> Result<Vec<MulticastBinding>, NetworkError> {
    let interfaces = if_addrs::get_if_addrs().map_err(|source| NetworkError::Bind {
        port: config.port,
        source,
    })?;

    let mut bindings = Vec::new();
    for iface in interfaces {
        if let Some(filter) = &config.interface {
            if iface.name != *filter {
                continue;
            }
        }

        let joined = match (config.group, iface.ip()) {
            (IpAddr::V4(group), IpAddr::V4(local)) => socket
                .join_multicast_v4(group, local)
                .map(|()| IpAddr::V4(local)),
            (IpAddr::V6(group), IpAddr::V6(local)) => socket
                .join_multicast_v6(&group, iface.index.unwrap_or(0))
                .map(|()| IpAddr::V6(local)),
            (_, local) => {
                trace!(interface = %iface.name, %local, "skipping address family mismatch");
                continue;
            }
        };

        match joined {
            Ok(local_addr) => {
                debug!(interface = %iface.name, %local_addr, group = %config.group, "joined");
                bindings.push(MulticastBinding {
                    interface: iface.name.clone(),
                    local_addr,
                    group: config.group,
                });
            }
            Err(e) => {
                warn!(interface = %iface.name, error = %e, "multicast join failed");
            }
        }
    }

    Ok(bindings)
}

/// Receive datagrams until the consumer goes away or the socket fails.
async fn receive_loop(socket: UdpSocket, tx: mpsc::Sender<std::io::Result<RawPacket>>) {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        match socket.recv_from(&mut buf).await {
            Ok((len, remote)) => {
                trace!(%remote, len, "datagram received");
                let packet = RawPacket::new(
                    Utc::now().timestamp_millis(),
                    Bytes::copy_from_slice(&buf[..len]),
                );
                if tx.send(Ok(packet)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                break;
            }
        }
    }
}
