//! Action dispatch for commands drained on the host thread.
//!
//! The [`CommandProcessor`] answers the built-in health checks itself, resolves every
//! other action through the [`DispatchTable`], rewrites legacy parameter
//! names, and converts capability failures into response envelopes.

mod aliases;
mod errors;
mod processor;
#[cfg(test)]
mod processor_tests;
mod table;

use std::any::Any;

pub use self::aliases::canonicalise;
pub use self::errors::ActionError;
pub use self::processor::{CommandProcessor, HEALTH_CHECK_ACTION, PING_ACTION};
pub use self::table::{ActionResult, Capability, DispatchTable, NoArguments, Payload};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Extracts the message carried by a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "action panicked with a non-string payload".to_owned()
    }
}
