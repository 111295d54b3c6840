//! Error types for socket listener and session operations.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listening host name could not be resolved.
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        /// Requested host.
        host: String,
        /// Requested port.
        port: u16,
        /// Resolver error.
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded but produced no address.
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty {
        /// Requested host.
        host: String,
        /// Requested port.
        port: u16,
    },
    /// Binding the listening socket failed, typically because the port is
    /// already in use.
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        /// Address the bind was attempted on.
        addr: SocketAddr,
        /// Operating system error.
        #[source]
        source: io::Error,
    },
    /// The bound socket could not report its local address.
    #[error("failed to read listener address: {source}")]
    LocalAddr {
        /// Operating system error.
        #[source]
        source: io::Error,
    },
    /// The listening socket could not be switched to non-blocking mode.
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        /// Operating system error.
        #[source]
        source: io::Error,
    },
    /// The acceptor thread could not be started.
    #[error("failed to spawn listener thread: {source}")]
    Spawn {
        /// Operating system error.
        #[source]
        source: io::Error,
    },
    /// The acceptor thread panicked.
    #[error("listener thread panicked")]
    ThreadPanic,
}

/// Reasons a client session ends abnormally.
#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("receive error: {0}")]
    Read(#[source] io::Error),
    #[error("send error: {0}")]
    Write(#[source] io::Error),
    #[error("failed to serialise response: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge { size: usize, max_size: usize },
}
