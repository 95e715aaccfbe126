// Setup failures, each fatal to the establishment attempt
use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EstablishError {
    #[error("Could not bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("Waiting for a connection was interrupted")]
    AcceptInterrupted,
    #[error("Failed to accept a connection")]
    Accept(#[source] io::Error),
    #[error("Connection refused. Is the host running and did you enter the correct IP?")]
    ConnectionRefused,
    #[error("Hostname could not be resolved. Invalid IP address: {0:?}")]
    AddressUnresolvable(String),
    #[error("An error occurred while connecting: {0}")]
    Connect(#[source] io::Error),
}
