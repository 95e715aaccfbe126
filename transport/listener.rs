// Host side: a single-use listener that accepts exactly one peer
use crate::error::EstablishError;
use crate::tcp::TcpTransport;
use crate::traits::TransportListener;
use nix::sys::socket::{
    bind, listen, setsockopt, shutdown, socket, sockopt, AddressFamily, Backlog, SockFlag,
    SockType, SockaddrIn,
};
use std::io;
use std::net::{SocketAddr, SocketAddrV4, TcpListener};
use std::os::unix::io::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

struct ListenerInner {
    socket: TcpListener,
    cancelled: AtomicBool,
}

pub struct HostListener {
    inner: Arc<ListenerInner>,
}

/// Cancels a pending [`HostListener::accept`] from another thread.
///
/// Only holds a weak reference, so it never keeps the listening socket open
/// after the listener is gone.
#[derive(Clone)]
pub struct AcceptCanceller {
    inner: Weak<ListenerInner>,
}

impl HostListener {
    /// Bind with SO_REUSEADDR so a quick restart does not hit "address in use".
    pub fn bind(addr: SocketAddrV4) -> Result<Self, EstablishError> {
        let socket = Self::bind_socket(addr).map_err(|source| EstablishError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        tracing::debug!(%addr, "listening");

        Ok(HostListener {
            inner: Arc::new(ListenerInner {
                socket,
                cancelled: AtomicBool::new(false),
            }),
        })
    }

    fn bind_socket(addr: SocketAddrV4) -> io::Result<TcpListener> {
        let fd = socket(
            AddressFamily::Inet,
            SockType::Stream,
            SockFlag::SOCK_CLOEXEC,
            None,
        )?;
        setsockopt(&fd, sockopt::ReuseAddr, &true)?;
        bind(fd.as_raw_fd(), &SockaddrIn::from(addr))?;
        // Single peer: no point queueing more than one
        listen(&fd, Backlog::new(1)?)?;
        Ok(TcpListener::from(fd))
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.socket.local_addr()
    }

    pub fn canceller(&self) -> AcceptCanceller {
        AcceptCanceller {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl TransportListener for HostListener {
    type Connection = TcpTransport;
    type Error = EstablishError;

    /// Block until one peer connects. The listening socket is closed when
    /// this returns, whatever the outcome.
    fn accept(self) -> Result<TcpTransport, EstablishError> {
        if self.inner.cancelled.load(Ordering::Acquire) {
            return Err(EstablishError::AcceptInterrupted);
        }

        let result = self.inner.socket.accept();
        let cancelled = self.inner.cancelled.load(Ordering::Acquire);

        match result {
            Ok(_) if cancelled => Err(EstablishError::AcceptInterrupted),
            Ok((stream, peer)) => {
                tracing::debug!(%peer, "accepted connection, closing listener");
                Ok(TcpTransport::from_stream(stream))
            }
            Err(_) if cancelled => Err(EstablishError::AcceptInterrupted),
            Err(e) => Err(EstablishError::Accept(e)),
        }
    }
}

impl AcceptCanceller {
    /// Wake a blocked accept so it fails with `AcceptInterrupted`. Safe to
    /// call repeatedly, and a no-op once the listener is gone.
    pub fn cancel(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        if inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        // Shutting down a listening socket makes a blocked accept return
        if let Err(e) = shutdown(inner.socket.as_raw_fd(), nix::sys::socket::Shutdown::Both) {
            tracing::warn!(error = %e, "failed to shut down listening socket");
        }
    }
}
