use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use vrouter::forwarder::consts::BUFFER_BYTES;
use vrouter::forwarder::transport::UdpTransport;
use vrouter::forwarder::{Forwarder, StdoutSink};
use vrouter::routing::RoundRobinRoutingTable;

/// Simulated IP-layer packet router: listens for wire-encoded datagrams on
/// `listen_ip:listen_port`, reassembling those addressed to itself and
/// forwarding everything else per `routes_file`.
#[derive(Parser)]
struct Args {
    /// Address this router listens on
    listen_ip: Ipv4Addr,
    /// Port this router listens on
    listen_port: u16,
    /// Whitespace-separated route file: CIDR initial_port final_port next_hop_ip next_hop_port link_mtu
    routes_file: PathBuf,
    /// Raise log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let self_addr = (args.listen_ip, args.listen_port);
    let routing_table = RoundRobinRoutingTable::new(&args.routes_file);
    let mut forwarder = Forwarder::new(self_addr, routing_table);

    let mut transport = UdpTransport::bind(self_addr).unwrap_or_else(|err| {
        eprintln!("failed to bind {}:{}: {err}", self_addr.0, self_addr.1);
        std::process::exit(1);
    });
    let mut sink = StdoutSink;

    log::info!("listening on {}:{}", self_addr.0, self_addr.1);

    let mut buf = [0u8; BUFFER_BYTES];
    loop {
        let len = match transport.recv(&mut buf) {
            Ok(len) => len,
            Err(err) => {
                log::error!("fatal transport error: {err}");
                std::process::exit(1);
            }
        };

        if let Err(err) = forwarder.handle_packet(&buf[..len], &mut transport, &mut sink) {
            log::error!("fatal routing table error: {err}");
            std::process::exit(1);
        }
    }
}
