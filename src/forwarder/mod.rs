use std::collections::HashMap;
use std::net::Ipv4Addr;

pub mod sink;
pub mod transport;

pub use sink::{DeliverySink, StdoutSink};
pub use transport::Transport;

use crate::datagram::fragmentation::fragment;
use crate::datagram::reassembly::{reassemble, Reassembly};
use crate::datagram::Datagram;
use crate::error::Result;
use crate::routing::RoundRobinRoutingTable;

pub mod consts {
    /// Maximum bytes read per receive; wire datagrams exceeding this are
    /// silently truncated (see the design notes on this simulator limit).
    pub const BUFFER_BYTES: usize = 1024;
}

/// The receive/decide/forward loop. Owns the routing table cache and the
/// per-destination fragment groups for datagrams addressed to `self_addr`.
/// A group begins at first fragment arrival and ends at successful
/// reassembly; groups for never-completed datagrams are never evicted
/// (see DESIGN.md's open question on unbounded growth).
pub struct Forwarder {
    self_addr: (Ipv4Addr, u16),
    routing_table: RoundRobinRoutingTable,
    groups: HashMap<String, Vec<Datagram>>,
}

impl Forwarder {
    pub fn new(self_addr: (Ipv4Addr, u16), routing_table: RoundRobinRoutingTable) -> Self {
        Self {
            self_addr,
            routing_table,
            groups: HashMap::new(),
        }
    }

    /// Processes one received wire datagram per the receive loop of the
    /// spec: parse, TTL check, local delivery or forward. Only a fatal
    /// routing-table error (an unreadable route file) is surfaced; every
    /// other per-packet failure is logged and the packet dropped.
    pub fn handle_packet(
        &mut self,
        raw: &[u8],
        transport: &mut impl Transport,
        sink: &mut impl DeliverySink,
    ) -> Result<()> {
        let datagram = match Datagram::parse(raw) {
            Ok(datagram) => datagram,
            Err(err) => {
                log::warn!("dropping malformed packet: {err}");
                return Ok(());
            }
        };

        if datagram.ttl() <= 0 {
            log::debug!("dropping expired packet id={}", datagram.id());
            return Ok(());
        }

        if (datagram.dst_ip(), datagram.dst_port()) == self.self_addr {
            self.receive_locally(datagram, sink);
            Ok(())
        } else {
            self.forward(datagram, transport)
        }
    }

    fn receive_locally(&mut self, datagram: Datagram, sink: &mut impl DeliverySink) {
        let id = datagram.id().to_string();
        let group = self.groups.entry(id.clone()).or_default();
        group.push(datagram);

        match reassemble(group) {
            Reassembly::Complete(message) => {
                self.groups.remove(&id);
                log::info!("delivered message id={id}");
                sink.deliver(message.payload());
            }
            Reassembly::Incomplete => {
                log::debug!(
                    "fragment group id={id} still incomplete ({} fragments so far)",
                    self.groups[&id].len()
                );
            }
        }
    }

    fn forward(&mut self, datagram: Datagram, transport: &mut impl Transport) -> Result<()> {
        let destination = (datagram.dst_ip(), datagram.dst_port());

        let next_hop = match self.routing_table.next_hop(destination)? {
            Some(next_hop) => next_hop,
            None => {
                log::warn!("no route to {}:{}", destination.0, destination.1);
                return Ok(());
            }
        };
        let (next_hop_addr, link_mtu) = next_hop;

        log::info!(
            "forwarding id={} from {}:{} destined {}:{} via {}:{}",
            datagram.id(),
            self.self_addr.0,
            self.self_addr.1,
            destination.0,
            destination.1,
            next_hop_addr.0,
            next_hop_addr.1
        );

        let wire = datagram.with_decremented_ttl().encode();

        match fragment(&wire, link_mtu) {
            Ok(fragments) => {
                for frag in fragments {
                    if let Err(err) = transport.send(&frag, next_hop_addr) {
                        log::warn!("failed to send fragment to {next_hop_addr:?}: {err}");
                    }
                }
            }
            Err(err) => log::warn!("failed to fragment packet toward {next_hop_addr:?}: {err}"),
        }

        Ok(())
    }
}
