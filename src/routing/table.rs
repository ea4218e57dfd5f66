use std::collections::HashMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use crate::routing::cidr;
use crate::routing::error::{Error, Result};

/// A single next-hop choice for a destination, paired with the MTU of the
/// link that reaches it.
pub type NextHop = ((Ipv4Addr, u16), usize);

/// Parsed form of one whitespace-separated route file line:
/// `CIDR initial_port final_port next_hop_ip next_hop_port link_mtu`.
struct RoutingTableLine {
    network: Vec<Ipv4Addr>,
    initial_port: u16,
    final_port: u16,
    next_hop: (Ipv4Addr, u16),
    link_mtu: usize,
}

impl RoutingTableLine {
    fn matches(&self, destination: (Ipv4Addr, u16)) -> bool {
        let (ip, port) = destination;
        self.network.contains(&ip) && (self.initial_port..=self.final_port).contains(&port)
    }
}

fn parse_line(line: &str) -> Result<RoutingTableLine> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let malformed = || Error::MalformedLine(line.to_string());

    if fields.len() != 6 {
        return Err(malformed());
    }

    let network = cidr::expand(fields[0])?;
    let initial_port: u16 = fields[1].parse().map_err(|_| malformed())?;
    let final_port: u16 = fields[2].parse().map_err(|_| malformed())?;
    let next_hop_ip: Ipv4Addr = fields[3].parse().map_err(|_| malformed())?;
    let next_hop_port: u16 = fields[4].parse().map_err(|_| malformed())?;
    let link_mtu: usize = fields[5].parse().map_err(|_| malformed())?;

    Ok(RoutingTableLine {
        network,
        initial_port,
        final_port,
        next_hop: (next_hop_ip, next_hop_port),
        link_mtu,
    })
}

/// A rotating ring of equivalent next-hops for one destination. Remembers
/// the index it last served; the next query returns the following element
/// modulo the ring's length. An empty ring always yields `None`.
struct Ring {
    entries: Vec<NextHop>,
    cursor: usize,
}

impl Ring {
    fn new(entries: Vec<NextHop>) -> Self {
        Self { entries, cursor: 0 }
    }

    fn next(&mut self) -> Option<NextHop> {
        if self.entries.is_empty() {
            return None;
        }

        let entry = self.entries[self.cursor];
        self.cursor = (self.cursor + 1) % self.entries.len();
        Some(entry)
    }
}

/// Round-robin routing table. On first query for a destination, reads the
/// route file once, builds a ring of every matching line in file order, and
/// caches it; every query thereafter (including the first) rotates that
/// ring. The route file is assumed immutable for the process lifetime.
pub struct RoundRobinRoutingTable {
    routes_file: PathBuf,
    cache: HashMap<(Ipv4Addr, u16), Ring>,
}

impl RoundRobinRoutingTable {
    pub fn new(routes_file: impl AsRef<Path>) -> Self {
        Self {
            routes_file: routes_file.as_ref().to_path_buf(),
            cache: HashMap::new(),
        }
    }

    fn load_ring(&self, destination: (Ipv4Addr, u16)) -> Result<Ring> {
        let contents = fs::read_to_string(&self.routes_file)?;

        let mut entries = Vec::new();
        for line in contents.lines() {
            let parsed = parse_line(line)?;
            if parsed.matches(destination) {
                entries.push((parsed.next_hop, parsed.link_mtu));
            }
        }

        Ok(Ring::new(entries))
    }

    /// Returns the next `(next_hop, link_mtu)` for `destination`, rotating
    /// through equivalent routes, or `None` if no route matches.
    pub fn next_hop(&mut self, destination: (Ipv4Addr, u16)) -> Result<Option<NextHop>> {
        if !self.cache.contains_key(&destination) {
            let ring = self.load_ring(destination)?;
            self.cache.insert(destination, ring);
        }

        Ok(self.cache.get_mut(&destination).and_then(Ring::next))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn routes_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn no_route_yields_none_permanently() {
        let file = routes_file("");
        let mut table = RoundRobinRoutingTable::new(file.path());

        let destination = (Ipv4Addr::new(10, 0, 0, 1), 9000);
        assert_eq!(table.next_hop(destination).unwrap(), None);
        assert_eq!(table.next_hop(destination).unwrap(), None);
    }

    #[test]
    fn single_route_is_returned_every_time() {
        let file = routes_file("127.0.0.1/32 8001 8001 127.0.0.1 8001 1024\n");
        let mut table = RoundRobinRoutingTable::new(file.path());

        let destination = (Ipv4Addr::new(127, 0, 0, 1), 8001);
        let expected = Some(((Ipv4Addr::new(127, 0, 0, 1), 8001), 1024));

        assert_eq!(table.next_hop(destination).unwrap(), expected);
        assert_eq!(table.next_hop(destination).unwrap(), expected);
    }

    #[test]
    fn round_robins_across_equivalent_routes_in_file_order() {
        let file = routes_file(
            "10.0.0.0/24 9000 9000 10.0.0.2 7000 1024\n10.0.0.0/24 9000 9000 10.0.0.3 7000 1024\n",
        );
        let mut table = RoundRobinRoutingTable::new(file.path());

        let destination = (Ipv4Addr::new(10, 0, 0, 1), 9000);
        let n1 = ((Ipv4Addr::new(10, 0, 0, 2), 7000), 1024);
        let n2 = ((Ipv4Addr::new(10, 0, 0, 3), 7000), 1024);

        assert_eq!(table.next_hop(destination).unwrap(), Some(n1));
        assert_eq!(table.next_hop(destination).unwrap(), Some(n2));
        assert_eq!(table.next_hop(destination).unwrap(), Some(n1));
    }

    #[test]
    fn port_range_and_network_must_both_match() {
        let file = routes_file("10.0.0.0/24 9000 9000 10.0.0.2 7000 1024\n");
        let mut table = RoundRobinRoutingTable::new(file.path());

        assert_eq!(
            table.next_hop((Ipv4Addr::new(10, 0, 0, 1), 9001)).unwrap(),
            None
        );
        assert_eq!(
            table.next_hop((Ipv4Addr::new(10, 0, 1, 1), 9000)).unwrap(),
            None
        );
    }

    #[test]
    fn malformed_line_is_a_fatal_error() {
        let file = routes_file("not a valid route line\n");
        let mut table = RoundRobinRoutingTable::new(file.path());

        let err = table
            .next_hop((Ipv4Addr::new(10, 0, 0, 1), 9000))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedLine(_)));
    }
}
