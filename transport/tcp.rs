// TCP transport implementation
use crate::error::EstablishError;
use crate::traits::Transport;
use std::io::{ErrorKind, Read, Result, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct TcpTransport {
    stream: TcpStream,
    closed: Arc<AtomicBool>,
}

impl TcpTransport {
    /// Dial `host:port`, trying every address the name resolves to.
    pub fn connect(host: &str, port: u16) -> std::result::Result<Self, EstablishError> {
        if !is_plausible_host(host) {
            return Err(EstablishError::AddressUnresolvable(host.to_string()));
        }

        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|_| EstablishError::AddressUnresolvable(host.to_string()))?
            .collect();
        if addrs.is_empty() {
            return Err(EstablishError::AddressUnresolvable(host.to_string()));
        }

        let mut last_err = None;
        for addr in addrs {
            tracing::debug!(%addr, "connecting");
            match TcpStream::connect(addr) {
                Ok(stream) => return Ok(TcpTransport::from_stream(stream)),
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "connect attempt failed");
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) if e.kind() == ErrorKind::ConnectionRefused => {
                Err(EstablishError::ConnectionRefused)
            }
            Some(e) => Err(EstablishError::Connect(e)),
            None => Err(EstablishError::AddressUnresolvable(host.to_string())),
        }
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        TcpTransport {
            stream,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.stream.local_addr()
    }
}

// Rejected before touching the resolver.
fn is_plausible_host(host: &str) -> bool {
    !host.is_empty() && !host.chars().any(|c| c.is_whitespace() || c.is_control())
}

impl Transport for TcpTransport {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data)?;
        self.stream.flush()
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.stream.read(buf)
    }

    fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        match self.stream.shutdown(Shutdown::Both) {
            // The peer may already have torn the connection down
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn try_clone(&self) -> Result<Self> {
        Ok(TcpTransport {
            stream: self.stream.try_clone()?,
            closed: Arc::clone(&self.closed),
        })
    }

    fn peer_addr(&self) -> Result<SocketAddr> {
        self.stream.peer_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implausible_hosts() {
        assert!(!is_plausible_host(""));
        assert!(!is_plausible_host("bad host"));
        assert!(!is_plausible_host("10.0.0.1\n"));
        assert!(is_plausible_host("192.168.1.20"));
        assert!(is_plausible_host("localhost"));
    }
}
