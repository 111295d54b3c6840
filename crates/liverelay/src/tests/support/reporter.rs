//! Test double for [`LifecycleReporter`] that records events for assertions.

use std::net::SocketAddr;
use std::sync::Mutex;

use crate::health::LifecycleReporter;
use crate::transport::ListenerError;

/// Lifecycle events observed during a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The script began loading.
    ScriptStarting,
    /// The acceptor is running.
    ListenerStarted(SocketAddr),
    /// The acceptor could not start.
    ListenerFailed(String),
    /// The script was unloaded.
    ScriptStopped,
}

/// Records lifecycle events in arrival order.
#[derive(Debug, Default)]
pub struct RecordingLifecycleReporter {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingLifecycleReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .expect("lifecycle reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: LifecycleEvent) {
        self.events
            .lock()
            .expect("lifecycle reporter mutex poisoned")
            .push(event);
    }
}

impl LifecycleReporter for RecordingLifecycleReporter {
    fn script_starting(&self) {
        self.record(LifecycleEvent::ScriptStarting);
    }

    fn listener_started(&self, addr: SocketAddr) {
        self.record(LifecycleEvent::ListenerStarted(addr));
    }

    fn listener_failed(&self, error: &ListenerError) {
        self.record(LifecycleEvent::ListenerFailed(error.to_string()));
    }

    fn script_stopped(&self) {
        self.record(LifecycleEvent::ScriptStopped);
    }
}
