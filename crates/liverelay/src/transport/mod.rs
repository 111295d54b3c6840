//! Loopback TCP front end of the relay.
//!
//! The acceptor binds the relay endpoint and accepts connections on a
//! background thread, spawning one session thread per client. Sessions only
//! ever talk to the host through the relay's queue.

mod errors;
mod framing;
mod handler;
mod listener;
mod session;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
#[cfg(test)]
pub(crate) use self::framing::MAX_LINE_BYTES;
pub(crate) use self::handler::ConnectionHandler;
pub(crate) use self::listener::{ListenerHandle, SocketListener};
pub(crate) use self::session::SessionHandler;
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

pub(crate) const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
