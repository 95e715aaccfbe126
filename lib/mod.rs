// lib: duplex chat session over one established stream
// The inbound loop runs on its own thread, the outbound loop on the caller's.

// Re-export core types
pub use p2pchat_core::*;

// Re-export the connection establisher
pub use p2pchat_transport::*;

pub mod session;
pub mod transcript;
pub mod input;
pub mod signal;

pub use session::*;
pub use transcript::*;
pub use input::*;

use std::env;
use std::net::Ipv4Addr;

// Environment variables for configuration
// P2P_CHAT_PORT: Port both peers use (default: 65432)
// P2P_CHAT_BIND_IP: IPv4 address the host binds on (default: discovered outbound address)
// P2P_CHAT_RECV_BUFFER: Bytes requested per read (default: 1024)

pub const DEFAULT_RECV_BUFFER: usize = 1024;

/// Settings read from environment variables; unparsable values fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub port: u16,
    pub bind_ip: Option<Ipv4Addr>,
    pub recv_buffer: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            port: DEFAULT_PORT,
            bind_ip: None,
            recv_buffer: DEFAULT_RECV_BUFFER,
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("P2P_CHAT_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let bind_ip = lookup("P2P_CHAT_BIND_IP").and_then(|s| s.trim().parse().ok());

        let recv_buffer = lookup("P2P_CHAT_RECV_BUFFER")
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_RECV_BUFFER);

        ChatConfig {
            port,
            bind_ip,
            recv_buffer,
        }
    }
}
