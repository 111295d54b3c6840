use std::time::Duration;

/// Loopback address the relay listens on. The relay never binds a public
/// interface.
pub const LOOPBACK_HOST: &str = "127.0.0.1";

/// TCP port clients connect to.
pub const RELAY_PORT: u16 = 9004;

/// How long a client connection may sit idle before a read attempt times out.
pub const IDLE_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a session waits for the host thread to answer a request.
///
/// Must stay below [`IDLE_READ_TIMEOUT`] so a busy host produces a timeout
/// response before the socket itself goes idle.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(25);

/// Maximum number of queued commands executed per host tick.
pub const MAX_COMMANDS_PER_TICK: usize = 5;

/// Tick cadence used by the standalone host harness (about 60 Hz).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Borrowed form of [`DEFAULT_LOG_FILTER`] for callers that want a function.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where serde needs an allocation.
#[must_use]
pub fn default_log_filter_string() -> String {
    default_log_filter().to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Default listening port for the binaries.
#[must_use]
pub const fn default_port() -> u16 {
    RELAY_PORT
}

/// Default harness tick interval in milliseconds.
#[must_use]
pub const fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}
