use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use crate::routing::error::Error;

/// Expands a dotted-quad-plus-prefix CIDR network into its full host set,
/// including the network and broadcast addresses (the simulator does not
/// special-case them — see the design notes on this being a preserved
/// source quirk, not a bug).
pub fn expand(cidr: &str) -> Result<Vec<Ipv4Addr>, Error> {
    let network: Ipv4Network = cidr
        .parse()
        .map_err(|_| Error::MalformedCidr(cidr.to_string()))?;

    Ok(network.iter().collect())
}
