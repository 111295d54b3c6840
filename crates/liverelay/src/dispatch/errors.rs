//! Errors returned by capabilities.
//!
//! A capability reports routine precondition failures as
//! [`ActionError::Rejected`]. Every other variant is a fault: something the
//! action could not have anticipated, which the processor answers with a
//! diagnostic trace.

use thiserror::Error;

use crate::host::HostError;

/// Failure variant of a capability's tagged result.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The request was understood but cannot be carried out, e.g. an index
    /// out of range or an occupied slot.
    #[error("{message}")]
    Rejected {
        /// Human-readable reason sent to the client.
        message: String,
    },

    /// The parameters do not fit the action's signature: an unexpected
    /// keyword, a missing required keyword, or a value of the wrong type.
    #[error("invalid arguments for '{action}': {source}")]
    InvalidArguments {
        /// Action whose parameters failed to bind.
        action: String,
        /// Decoder error describing the mismatch.
        #[source]
        source: serde_json::Error,
    },

    /// The host API raised while the action ran.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl ActionError {
    /// Builds a routine [`ActionError::Rejected`].
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Returns `true` for failures that warrant a diagnostic trace.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}
