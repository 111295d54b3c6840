//! Resolution and execution of one decoded command on the host thread.

use std::backtrace::Backtrace;
use std::error::Error as _;
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};

use serde_json::{Value, json};
use tracing::{debug, error};

use super::aliases::canonicalise;
use super::errors::ActionError;
use super::table::{DispatchTable, Payload};
use super::{DISPATCH_TARGET, panic_message};
use crate::host::Host;
use crate::relay::{Command, Response};
use crate::script::{SCRIPT_NAME, VERSION, log_to_host};

/// Liveness check answered without touching the dispatch table.
pub const PING_ACTION: &str = "ping";
/// Status check answered without touching the dispatch table.
pub const HEALTH_CHECK_ACTION: &str = "health_check";

const PING_MESSAGE: &str = "pong (queue-based, thread-safe)";
const HEALTH_MESSAGE: &str = "LiveRelay Remote Script running (thread-safe)";

/// Turns commands into responses. Never panics and never returns without a
/// response: every failure becomes an `ok: false` envelope.
#[derive(Debug)]
pub struct CommandProcessor<H> {
    table: DispatchTable<H>,
}

impl<H: Host> CommandProcessor<H> {
    /// Wraps a populated dispatch table.
    #[must_use]
    pub const fn new(table: DispatchTable<H>) -> Self {
        Self { table }
    }

    /// The table commands are resolved against.
    #[must_use]
    pub const fn table(&self) -> &DispatchTable<H> {
        &self.table
    }

    /// Every action name a client may send, built-ins included, sorted.
    #[must_use]
    pub fn available_actions(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = [PING_ACTION, HEALTH_CHECK_ACTION]
            .into_iter()
            .chain(self.table.names())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Executes `command` against `host`.
    ///
    /// `queue_depth` is the number of commands still waiting, reported by
    /// `health_check`. Must only be called from the host thread.
    pub fn process(&self, host: &mut H, command: Command, queue_depth: usize) -> Response {
        let action = command.action().to_owned();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.execute(host, &action, command, queue_depth)
        }));
        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(failure)) => Self::report_failure(host, &action, &failure),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let traceback = format!(
                    "panic while executing '{action}': {message}\n{}",
                    Backtrace::force_capture()
                );
                error!(
                    target: DISPATCH_TARGET,
                    action = %action,
                    error = %message,
                    traceback = %traceback,
                    "action panicked"
                );
                log_to_host(host, format_args!("ERROR processing command: {message}"));
                Response::fault(message, traceback)
            }
        }
    }

    fn execute(
        &self,
        host: &mut H,
        action: &str,
        command: Command,
        queue_depth: usize,
    ) -> Result<Response, ActionError> {
        match action {
            PING_ACTION => Ok(Response::success(ping_payload())),
            HEALTH_CHECK_ACTION => {
                let host_version = host.application_version()?;
                Ok(Response::success(self.health_payload(
                    host_version,
                    queue_depth,
                )))
            }
            _ => {
                let Some(capability) = self.table.resolve(action) else {
                    debug!(target: DISPATCH_TARGET, action, "unknown action");
                    return Ok(self.unknown_action(action));
                };
                let mut params = command.into_params();
                canonicalise(action, &mut params);
                capability(host, params).map(Response::success)
            }
        }
    }

    fn health_payload(&self, host_version: String, queue_depth: usize) -> Payload {
        let mut payload = Payload::new();
        payload.insert("message".to_owned(), json!(HEALTH_MESSAGE));
        payload.insert("version".to_owned(), json!(VERSION));
        payload.insert(
            "tool_count".to_owned(),
            json!(self.available_actions().len()),
        );
        payload.insert("ableton_version".to_owned(), Value::String(host_version));
        payload.insert("queue_size".to_owned(), json!(queue_depth));
        payload
    }

    fn unknown_action(&self, action: &str) -> Response {
        Response::error(format!("Unknown action: {action}"))
            .with_field("available_actions", json!(self.available_actions()))
    }

    fn report_failure(host: &H, action: &str, failure: &ActionError) -> Response {
        if !failure.is_fault() {
            debug!(
                target: DISPATCH_TARGET,
                action,
                reason = %failure,
                "action rejected"
            );
            return Response::error(failure.to_string());
        }

        let traceback = traceback(action, failure);
        error!(
            target: DISPATCH_TARGET,
            action,
            error = %failure,
            traceback = %traceback,
            "action failed"
        );
        log_to_host(host, format_args!("ERROR processing command: {failure}"));
        Response::fault(failure.to_string(), traceback)
    }
}

fn ping_payload() -> Payload {
    let mut payload = Payload::new();
    payload.insert("message".to_owned(), json!(PING_MESSAGE));
    payload.insert("script".to_owned(), json!(SCRIPT_NAME));
    payload.insert("version".to_owned(), json!(VERSION));
    payload
}

fn traceback(action: &str, failure: &ActionError) -> String {
    let mut text = format!("action '{action}' failed: {failure}");
    let mut cause = failure.source();
    while let Some(current) = cause {
        // Writing into a String cannot fail.
        let _ = write!(text, "\ncaused by: {current}");
        cause = current.source();
    }
    let _ = write!(text, "\n{}", Backtrace::force_capture());
    text
}
