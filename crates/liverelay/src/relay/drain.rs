//! Bounded per-tick draining of the command queue.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error};

use super::{Command, QueuedCommand, RELAY_TARGET, RelayCore, Response};
use crate::dispatch::panic_message;

/// Executes up to the per-tick cap of queued commands with `execute`.
///
/// Runs on the host thread and never blocks: popping stops as soon as the
/// queue is empty, and delivery into a single-item slot always has room.
/// Results for requests whose clients have already given up are discarded.
/// A panic while executing one command is logged, answered with a fault
/// response, and the tick moves on to the next command.
///
/// Returns the number of commands popped.
pub fn drain_tick<F>(core: &RelayCore, mut execute: F) -> usize
where
    F: FnMut(Command) -> Response,
{
    let cap = core.limits().max_commands_per_tick();
    let mut processed = 0;
    while processed < cap {
        let Some(QueuedCommand { id, command }) = core.queue().try_pop() else {
            break;
        };
        processed += 1;

        let action = command.action().to_owned();
        let response = match panic::catch_unwind(AssertUnwindSafe(|| execute(command))) {
            Ok(response) => response,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    target: RELAY_TARGET,
                    request_id = id,
                    action = %action,
                    error = %message,
                    "command execution panicked during tick"
                );
                Response::fault(message, format!("panic while executing '{action}'"))
            }
        };

        if !core.pending().deliver(id, response) {
            debug!(
                target: RELAY_TARGET,
                request_id = id,
                action = %action,
                "discarding result; client no longer waiting"
            );
        }
    }
    processed
}
