//! The proxy command: multicast group to destination socket.

use std::net::IpAddr;

use anyhow::Result;
use tracing::{debug, info};

use crate::asterix::{Framer, FramingPolicy};
use crate::capture::{MulticastConfig, MulticastSource};
use crate::net::{Destination, Forwarder};

/// Join a multicast group and forward every framed ASTERIX block to the
/// destination until interrupted.
///
/// Live traffic carries no link framing, so datagrams go straight to the
/// framer; framing is lenient, treating non-ASTERIX datagrams as wire
/// noise instead of failing the pipeline.
pub async fn run(
    group: IpAddr,
    port: u16,
    interface: Option<String>,
    destination: &str,
    max_count: Option<u64>,
) -> Result<()> {
    let destination = Destination::parse(destination)?;
    let forwarder = Forwarder::connect(destination).await?;

    let mut source = MulticastSource::bind(MulticastConfig {
        group,
        port,
        interface,
    })
    .await?;
    for binding in source.bindings() {
        info!(
            interface = %binding.interface,
            address = %binding.local_addr,
            group = %binding.group,
            "listening on interface"
        );
    }

    let framer = Framer::new(FramingPolicy::Lenient);
    let mut forwarded = 0u64;
    loop {
        let packet = tokio::select! {
            packet = source.next_packet() => packet?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
        };
        let Some(packet) = packet else { break };

        debug!(len = packet.payload.len(), "datagram received");
        for block in framer.frame(&packet)? {
            if max_count.is_some_and(|max| forwarded >= max) {
                info!(forwarded, "reached forwarding limit");
                return Ok(());
            }
            forwarder.send(&block.data).await?;
            forwarded += 1;
        }
    }

    info!(forwarded, "proxy stopped");
    Ok(())
}
