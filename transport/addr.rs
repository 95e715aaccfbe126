// Best-guess local address for the host to advertise and bind on
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

// Never sent to; connecting a UDP socket only selects a route
const PROBE_TARGET: (Ipv4Addr, u16) = (Ipv4Addr::new(8, 8, 8, 8), 80);

/// The IPv4 address this machine would use for outbound traffic, falling
/// back to loopback when there is no route.
pub fn outbound_ipv4() -> Ipv4Addr {
    match probe_outbound() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::debug!(error = %e, "no outbound route, using loopback");
            Ipv4Addr::LOCALHOST
        }
    }
}

fn probe_outbound() -> std::io::Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(PROBE_TARGET)?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
        other => Err(std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("unexpected local address {}", other),
        )),
    }
}
