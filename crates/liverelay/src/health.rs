//! Structured reporting of remote-script lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::transport::ListenerError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked when the host creates the script, before the listener binds.
    fn script_starting(&self);

    /// Invoked once the acceptor is running on `addr`.
    fn listener_started(&self, addr: SocketAddr);

    /// Invoked when the listener cannot be started. The script keeps running
    /// without remote control.
    fn listener_failed(&self, error: &ListenerError);

    /// Invoked after the script has shut down.
    fn script_stopped(&self);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter + ?Sized,
{
    fn script_starting(&self) {
        (**self).script_starting();
    }

    fn listener_started(&self, addr: SocketAddr) {
        (**self).listener_started(addr);
    }

    fn listener_failed(&self, error: &ListenerError) {
        (**self).listener_failed(error);
    }

    fn script_stopped(&self) {
        (**self).script_stopped();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn script_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "script_starting",
            version = env!("CARGO_PKG_VERSION"),
            "starting remote script"
        );
    }

    fn listener_started(&self, addr: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_started",
            addr = %addr,
            "relay listener ready"
        );
    }

    fn listener_failed(&self, error: &ListenerError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "listener_failed",
            error = %error,
            "relay listener failed to start; remote control unavailable"
        );
    }

    fn script_stopped(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "script_stopped",
            "remote script stopped"
        );
    }
}
