//! FIFO handoff from socket threads to the host thread.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::warn;

use super::{Command, RELAY_TARGET, RequestId};

/// A command waiting for the host thread, tagged with its request id.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedCommand {
    /// Identifier of the pending request expecting the result.
    pub id: RequestId,
    /// The decoded command.
    pub command: Command,
}

/// Unbounded multi-producer, single-consumer command queue.
///
/// Socket threads push; only the host tick pops. There is no backpressure:
/// when clients outpace the tick budget the queue grows.
#[derive(Debug)]
pub struct CommandQueue {
    sender: Sender<QueuedCommand>,
    receiver: Receiver<QueuedCommand>,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    /// Appends a command for the host thread.
    pub fn push(&self, id: RequestId, command: Command) {
        // The queue owns its receiver, so the channel cannot be disconnected.
        if let Err(error) = self.sender.send(QueuedCommand { id, command }) {
            warn!(
                target: RELAY_TARGET,
                request_id = error.0.id,
                "command queue disconnected; dropping command"
            );
        }
    }

    /// Pops the oldest command without blocking.
    #[must_use]
    pub fn try_pop(&self) -> Option<QueuedCommand> {
        match self.receiver.try_recv() {
            Ok(queued) => Some(queued),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Number of commands waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` when nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
