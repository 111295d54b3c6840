//! Shared configuration for the LiveRelay relay core and binaries.
//!
//! The relay's wire contract is fixed: it listens on a loopback TCP port,
//! applies a fixed idle read timeout, waits a fixed (shorter) time for the host
//! thread to answer, and drains a fixed number of commands per host tick. Those
//! values live in [`defaults`] and are bundled as [`RelayLimits`].
//!
//! [`Config`] configures the binaries around the relay. The standalone host
//! harness reads log filtering and format, the port it listens on, and its
//! tick cadence. The command-line client reads the same port, so one
//! `LIVERELAY_PORT` setting points both at the same relay. Values are layered
//! by `ortho_config` from defaults, an optional configuration file,
//! `LIVERELAY_*` environment variables, and command-line flags, in increasing
//! precedence.

mod defaults;
mod limits;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TICK_INTERVAL_MS, IDLE_READ_TIMEOUT, LOOPBACK_HOST,
    MAX_COMMANDS_PER_TICK, RELAY_PORT, RESPONSE_TIMEOUT, default_log_filter,
    default_log_filter_string, default_log_format, default_port, default_tick_interval_ms,
};
pub use limits::{RelayLimits, RelayLimitsError};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration for the LiveRelay binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LIVERELAY")]
pub struct Config {
    /// `tracing` filter expression, for example `info` or `liverelay=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Event rendering format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Loopback port the harness binds and the client connects to by default.
    #[serde(default = "default_port")]
    #[ortho_config(default = default_port())]
    pub port: u16,
    /// Interval between simulated host ticks, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    #[ortho_config(default = default_tick_interval_ms())]
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            port: default_port(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Config {
    /// Loads configuration from every layer using the process arguments.
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when any layer fails to parse.
    pub fn load_layered() -> Result<Self, Arc<OrthoError>> {
        Self::load()
    }

    /// Filter expression used to build the log subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for log events.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Port the harness listens on.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Interval between host ticks. Zero is clamped to one millisecond so the
    /// harness never spins.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
