// Transport module: establishing the one TCP stream a chat session runs on
pub mod traits;
pub mod tcp;
pub mod listener;
pub mod error;
pub mod addr;

pub use traits::*;
pub use tcp::*;
pub use listener::*;
pub use error::*;
pub use addr::*;

use std::net::SocketAddrV4;

/// Well-known port both operators agree on out of band.
pub const DEFAULT_PORT: u16 = 65432;

/// Bind on `addr` and block until exactly one peer connects.
pub fn establish_as_host(addr: SocketAddrV4) -> Result<TcpTransport, EstablishError> {
    HostListener::bind(addr)?.accept()
}

/// Dial the host at `host:port`.
pub fn establish_as_client(host: &str, port: u16) -> Result<TcpTransport, EstablishError> {
    TcpTransport::connect(host, port)
}
