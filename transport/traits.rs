// Transport abstraction - the session only needs these operations on a stream
use std::io::Result;
use std::net::SocketAddr;

pub trait Transport: Send {
    /// Write the whole buffer or fail.
    fn send(&mut self, data: &[u8]) -> Result<()>;
    /// Read one chunk; `Ok(0)` means the peer closed its side.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
    /// Shut the stream down in both directions. Every handle cloned from the
    /// same stream shares the close, and calls after the first are no-ops.
    fn close(&self) -> Result<()>;
    /// Whether `close` has been called on this stream through any handle.
    fn is_closed(&self) -> bool;
    /// Another handle on the same stream, used to give each direction its own owner.
    fn try_clone(&self) -> Result<Self>
    where
        Self: Sized;
    fn peer_addr(&self) -> Result<SocketAddr>;
}

pub trait TransportListener: Send {
    type Connection: Transport;
    type Error;

    /// Accept exactly one connection, consuming the listener.
    fn accept(self) -> std::result::Result<Self::Connection, Self::Error>;
}
