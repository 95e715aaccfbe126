// Core types shared by the establisher, the session and the CLI
use std::fmt;
use std::net::SocketAddr;

/// Which side of the connection this process plays. Chosen once, before any
/// network activity; after the stream exists both roles behave the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Client,
}

impl Role {
    /// Parse an answer to the startup prompt: `1`/`host` or `2`/`connect`.
    pub fn from_choice(s: &str) -> Option<Self> {
        let choice = s.trim();
        if choice == "1" || choice.eq_ignore_ascii_case("host") {
            Some(Role::Host)
        } else if choice == "2"
            || choice.eq_ignore_ascii_case("connect")
            || choice.eq_ignore_ascii_case("client")
        {
            Some(Role::Client)
        } else {
            None
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Client => write!(f, "client"),
        }
    }
}

/// The literal command that ends the local side of a session.
pub const EXIT_COMMAND: &str = "exit";

/// True when the whole trimmed line is `exit`, in any letter case.
pub fn is_exit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_COMMAND)
}

/// Status lines interleaved into the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    HostingOn(String),
    ListeningOn(u16),
    WaitingForPeer,
    ConnectedBy(SocketAddr),
    ConnectingTo(String),
    ConnectionSuccessful,
    ChatStarted,
    PeerDisconnected,
    PeerReset,
    ReceiveError(String),
    UserExit,
    Disconnecting,
    SendError(String),
    HostCancelled,
    ConnectCancelled,
    SessionEnded,
}

impl Notice {
    /// Error notices are rendered with `[!]`, everything else with `[+]`.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::PeerReset | Notice::ReceiveError(_) | Notice::SendError(_)
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tag = if self.is_error() { "[!]" } else { "[+]" };
        match self {
            Notice::HostingOn(ip) => write!(f, "{} Hosting on IP: {}", tag, ip),
            Notice::ListeningOn(port) => write!(f, "{} Listening on port: {}", tag, port),
            Notice::WaitingForPeer => write!(f, "{} Waiting for a connection...", tag),
            Notice::ConnectedBy(addr) => write!(f, "{} Connected by {}", tag, addr),
            Notice::ConnectingTo(addr) => write!(f, "{} Connecting to {}...", tag, addr),
            Notice::ConnectionSuccessful => write!(f, "{} Connection successful!", tag),
            Notice::ChatStarted => write!(
                f,
                "\n--- Chat Started ---\nType '{}' or press Ctrl+C to disconnect.\n",
                EXIT_COMMAND
            ),
            Notice::PeerDisconnected => write!(f, "{} Peer has disconnected.", tag),
            Notice::PeerReset => {
                write!(f, "{} Connection was forcibly closed by the peer.", tag)
            }
            Notice::ReceiveError(e) => {
                write!(f, "{} An error occurred in receiving: {}", tag, e)
            }
            Notice::UserExit => write!(f, "{} You have chosen to disconnect.", tag),
            Notice::Disconnecting => write!(f, "{} Disconnecting...", tag),
            Notice::SendError(e) => write!(f, "{} An error occurred in sending: {}", tag, e),
            Notice::HostCancelled => write!(f, "{} Host setup cancelled. Exiting.", tag),
            Notice::ConnectCancelled => write!(f, "{} Connection attempt cancelled. Exiting.", tag),
            Notice::SessionEnded => write!(f, "{} Chat session ended.", tag),
        }
    }
}
