//! Timing and throughput limits shared by the relay's session and tick loops.

use std::time::Duration;

use thiserror::Error;

use crate::defaults::{IDLE_READ_TIMEOUT, MAX_COMMANDS_PER_TICK, RESPONSE_TIMEOUT};

/// Timeouts and the per-tick cap governing one relay instance.
///
/// The defaults are the fixed relay contract. Custom limits exist so tests can
/// run the same machinery with millisecond timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayLimits {
    idle_read_timeout: Duration,
    response_timeout: Duration,
    max_commands_per_tick: usize,
}

/// Errors raised when relay limits violate their ordering rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayLimitsError {
    /// The response wait would outlast the socket idle timeout.
    #[error(
        "response timeout {response:?} must be shorter than the idle read timeout {idle:?}"
    )]
    ResponseNotShorterThanIdle {
        /// Requested response timeout.
        response: Duration,
        /// Requested idle read timeout.
        idle: Duration,
    },
    /// A zero response timeout would time out every request immediately.
    #[error("response timeout must be greater than zero")]
    ZeroResponseTimeout,
    /// A zero per-tick cap would never drain the queue.
    #[error("at least one command must be processed per tick")]
    ZeroTickCap,
}

impl RelayLimits {
    /// Builds validated limits.
    ///
    /// # Errors
    ///
    /// Returns [`RelayLimitsError`] when the response timeout is zero or not
    /// strictly shorter than the idle timeout, or when the per-tick cap is
    /// zero.
    pub fn new(
        idle_read_timeout: Duration,
        response_timeout: Duration,
        max_commands_per_tick: usize,
    ) -> Result<Self, RelayLimitsError> {
        if response_timeout.is_zero() {
            return Err(RelayLimitsError::ZeroResponseTimeout);
        }
        if response_timeout >= idle_read_timeout {
            return Err(RelayLimitsError::ResponseNotShorterThanIdle {
                response: response_timeout,
                idle: idle_read_timeout,
            });
        }
        if max_commands_per_tick == 0 {
            return Err(RelayLimitsError::ZeroTickCap);
        }
        Ok(Self {
            idle_read_timeout,
            response_timeout,
            max_commands_per_tick,
        })
    }

    /// Read timeout applied to every client connection.
    #[must_use]
    pub const fn idle_read_timeout(&self) -> Duration {
        self.idle_read_timeout
    }

    /// Upper bound on how long a session waits for its response.
    #[must_use]
    pub const fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Maximum number of commands drained in one host tick.
    #[must_use]
    pub const fn max_commands_per_tick(&self) -> usize {
        self.max_commands_per_tick
    }
}

impl Default for RelayLimits {
    fn default() -> Self {
        Self {
            idle_read_timeout: IDLE_READ_TIMEOUT,
            response_timeout: RESPONSE_TIMEOUT,
            max_commands_per_tick: MAX_COMMANDS_PER_TICK,
        }
    }
}
