//! Thread-safe command relay between socket threads and the host thread.
//!
//! Socket sessions call [`RelayCore::submit`], which registers a pending
//! request, pushes the command onto the queue and blocks on the request's
//! slot. The host invokes the tick hook on its own schedule; the hook calls
//! [`drain_tick`], which pops a bounded batch, executes each command on the
//! host thread and delivers results back through the pending registry.
//!
//! Host API calls only ever happen inside [`drain_tick`]'s callback, on the
//! thread the host ticks from.

mod command;
mod drain;
mod pending;
mod queue;
mod response;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use liverelay_config::RelayLimits;
use tracing::{debug, warn};

pub use self::command::{ACTION_FIELD, Command, Params};
pub use self::drain::drain_tick;
pub use self::pending::{PendingRequests, RequestId, ResponseSlot};
pub use self::queue::{CommandQueue, QueuedCommand};
pub use self::response::{PROCESSING_TIMEOUT_MESSAGE, Response};

pub(crate) const RELAY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::relay");

/// State shared by the acceptor, every session, and the host tick.
#[derive(Debug)]
pub struct RelayCore {
    queue: CommandQueue,
    pending: PendingRequests,
    running: Arc<AtomicBool>,
    limits: RelayLimits,
}

impl RelayCore {
    /// Creates an idle relay; call [`RelayCore::start`] before serving.
    #[must_use]
    pub fn new(limits: RelayLimits) -> Self {
        Self {
            queue: CommandQueue::new(),
            pending: PendingRequests::new(),
            running: Arc::new(AtomicBool::new(false)),
            limits,
        }
    }

    /// Commands waiting for the host thread.
    #[must_use]
    pub const fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Requests waiting for a response.
    #[must_use]
    pub const fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    /// Timeouts and per-tick cap in force.
    #[must_use]
    pub const fn limits(&self) -> &RelayLimits {
        &self.limits
    }

    /// Shared running flag observed by the acceptor and sessions.
    #[must_use]
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Returns `true` while the relay accepts and serves requests.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Marks the relay as running.
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// Clears the running flag. Returns `true` if the relay was running.
    pub fn stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }

    /// Hands `command` to the host thread and waits for its response.
    ///
    /// Always yields exactly one response: the host's result, or the
    /// processing-timeout error when the host does not answer within the
    /// response timeout. The request's slot is gone when this returns.
    #[must_use]
    pub fn submit(&self, command: Command) -> Response {
        let slot = self.pending.register();
        let id = slot.id();
        debug!(
            target: RELAY_TARGET,
            request_id = id,
            action = command.action(),
            "command queued"
        );
        self.queue.push(id, command);

        let waited = slot.wait(self.limits.response_timeout());
        self.settle(&slot, waited)
    }

    /// Releases `slot` and turns the outcome of waiting on it into a response.
    ///
    /// A delivery that lands after the wait timed out but before the release
    /// still wins.
    fn settle(&self, slot: &ResponseSlot, waited: Option<Response>) -> Response {
        let id = slot.id();
        let response = waited.or_else(|| {
            self.pending.release(id);
            slot.try_take()
        });
        self.pending.release(id);

        response.unwrap_or_else(|| {
            warn!(
                target: RELAY_TARGET,
                request_id = id,
                timeout_ms = self.limits.response_timeout().as_millis(),
                "command processing timed out"
            );
            Response::processing_timeout()
        })
    }
}

impl Default for RelayCore {
    fn default() -> Self {
        Self::new(RelayLimits::default())
    }
}
