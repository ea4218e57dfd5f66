use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use std::path::PathBuf;

use clap::Parser;

/// Test-harness injector: reads a line-oriented script file and sends one
/// UDP datagram per line to the first hop, prefixing each line with a
/// pre-computed header so the receiving router sees a complete wire
/// datagram (`"<header_prefix>,<line>"`).
#[derive(Parser)]
struct Args {
    /// Header fields to prepend to every line, e.g. "dst_ip,dst_port,ttl,id,offset,size,flag"
    header_prefix: String,
    /// IP address of the first-hop router
    first_hop_ip: Ipv4Addr,
    /// Port of the first-hop router
    first_hop_port: u16,
    /// Script file to replay, one datagram body per line
    #[arg(long, default_value = "test_file.txt")]
    file: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let socket = UdpSocket::bind("0.0.0.0:0").unwrap_or_else(|err| {
        eprintln!("failed to open a socket: {err}");
        std::process::exit(1);
    });
    let destination = SocketAddrV4::new(args.first_hop_ip, args.first_hop_port);

    let contents = std::fs::read_to_string(&args.file).unwrap_or_else(|err| {
        eprintln!("failed to read {}: {err}", args.file.display());
        std::process::exit(1);
    });

    for line in contents.lines() {
        let datagram = format!("{},{line}", args.header_prefix);
        if let Err(err) = socket.send_to(datagram.as_bytes(), destination) {
            log::warn!("failed to send line {line:?}: {err}");
        }
    }
}
