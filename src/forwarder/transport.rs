use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

use crate::forwarder::consts::BUFFER_BYTES;

/// Sink for outbound fragments. The receive side isn't part of this trait:
/// the loop in `main` owns the blocking recv (the single suspension point
/// of §5) and hands each raw packet to [`crate::forwarder::Forwarder`].
pub trait Transport {
    fn send(&mut self, payload: &[u8], to: (Ipv4Addr, u16)) -> std::io::Result<()>;
}

/// A real UDP socket, bound once at startup and reused for the process
/// lifetime.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    pub fn bind(addr: (Ipv4Addr, u16)) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(SocketAddrV4::new(addr.0, addr.1))?;
        Ok(Self { socket })
    }

    /// Blocks for the next datagram, capped at [`BUFFER_BYTES`]; wire
    /// datagrams larger than that are silently truncated by the kernel.
    pub fn recv(&self, buf: &mut [u8; BUFFER_BYTES]) -> std::io::Result<usize> {
        let (len, _from) = self.socket.recv_from(buf)?;
        Ok(len)
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, payload: &[u8], to: (Ipv4Addr, u16)) -> std::io::Result<()> {
        self.socket.send_to(payload, SocketAddrV4::new(to.0, to.1))?;
        Ok(())
    }
}
