//! LiveRelay: a loopback JSON-lines relay into a single-threaded host.
//!
//! The host application loads a [`RemoteScript`] and ticks it from its own
//! thread. The script runs a TCP acceptor on `127.0.0.1` and serves each
//! client on its own thread. Client threads never touch the host: they hand
//! commands to the [`relay`] queue and block until the host thread has
//! executed the command during a tick, or until the response timeout passes.
//!
//! ## Request flow
//!
//! 1. A session frames one newline-terminated JSON object off the socket.
//! 2. [`RelayCore::submit`] registers a pending request, queues the command
//!    and waits on the request's slot.
//! 3. The host calls [`ControlSurface::update_display`], which drains at most
//!    a fixed batch per tick through [`CommandProcessor`].
//! 4. The processor answers `ping` and `health_check` itself and dispatches
//!    everything else through the [`DispatchTable`] built by
//!    [`actions::catalog`].
//! 5. The response is delivered to the waiting session, which writes it back
//!    as one line.
//!
//! A result produced after the session gave up waiting is dropped.

pub mod actions;
pub mod dispatch;
pub mod harness;
mod health;
pub mod host;
pub mod relay;
mod script;
pub mod song;
pub mod telemetry;
mod transport;

pub use dispatch::{ActionError, CommandProcessor, DispatchTable};
pub use harness::{Harness, HarnessError};
pub use health::{LifecycleReporter, StructuredLifecycleReporter};
pub use host::{Host, HostError, SimulatedHost};
pub use relay::{Command, RelayCore, Response};
pub use script::{
    ControlSurface, LOG_PREFIX, MidiMapHandle, RemoteScript, SCRIPT_NAME, ScriptOptions, VERSION,
    create_instance,
};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
