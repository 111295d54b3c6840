//! Registry of requests waiting for a response from the host thread.
//!
//! Identifier allocation and slot insertion share one critical section, so a
//! response can never be routed to an identifier whose slot is not yet
//! visible. Slots are removed by whichever side observes completion first:
//! the tick loop when it delivers, or the session when it gives up. Removal is
//! idempotent so both sides may attempt it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use super::Response;

/// Process-scoped request identifier. Strictly increasing; wraps only at
/// `u64::MAX`.
pub type RequestId = u64;

#[derive(Debug, Default)]
struct Registry {
    next_id: RequestId,
    slots: HashMap<RequestId, Sender<Response>>,
}

/// Thread-safe map from request id to its single-item rendezvous channel.
#[derive(Debug, Default)]
pub struct PendingRequests {
    registry: Mutex<Registry>,
}

/// The waiting side of one registered request.
#[derive(Debug)]
pub struct ResponseSlot {
    id: RequestId,
    receiver: Receiver<Response>,
}

impl PendingRequests {
    /// Creates an empty registry whose first identifier is zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next identifier and registers its slot atomically.
    #[must_use]
    pub fn register(&self) -> ResponseSlot {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id = id.wrapping_add(1);
        registry.slots.insert(id, sender);
        ResponseSlot { id, receiver }
    }

    /// Delivers a response to `id` and removes its slot.
    ///
    /// Returns `false` without error when the slot no longer exists, which
    /// happens when the client has already timed out or disconnected.
    pub fn deliver(&self, id: RequestId, response: Response) -> bool {
        let mut registry = self.lock();
        let Some(sender) = registry.slots.remove(&id) else {
            return false;
        };
        // Each slot holds one item and each id is delivered at most once, so
        // this never blocks; a dropped receiver just discards the response.
        sender.try_send(response).is_ok()
    }

    /// Removes the slot for `id`. Returns `true` if this call removed it.
    pub fn release(&self, id: RequestId) -> bool {
        self.lock().slots.remove(&id).is_some()
    }

    /// Returns `true` while `id` still awaits a response.
    #[must_use]
    pub fn contains(&self, id: RequestId) -> bool {
        self.lock().slots.contains_key(&id)
    }

    /// Number of requests currently awaiting a response.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// Returns `true` when no request is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().slots.is_empty()
    }

    // The registry is a plain map plus a counter; a panic while holding the
    // lock cannot leave it half-updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResponseSlot {
    /// Identifier this slot was registered under.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Blocks until the response arrives or `timeout` elapses.
    #[must_use]
    pub fn wait(&self, timeout: Duration) -> Option<Response> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Takes a response that has already been delivered, without blocking.
    #[must_use]
    pub fn try_take(&self) -> Option<Response> {
        self.receiver.try_recv().ok()
    }
}
