//! Command-line argument definitions.

use std::time::Duration;

use clap::Parser;
use liverelay_config::LOOPBACK_HOST;

/// Seconds to wait for a response. Slightly above the relay's own
/// processing timeout so the relay's answer arrives first.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sends one action to a running LiveRelay and prints the response.
#[derive(Parser, Debug)]
#[command(name = "liverelay", version)]
pub(crate) struct Cli {
    /// Host the relay listens on.
    #[arg(long, default_value = LOOPBACK_HOST)]
    pub(crate) host: String,
    /// Relay port. Defaults to the configured `LIVERELAY_PORT`, else 9004.
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seconds to wait for the connection and for the response.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub(crate) timeout: u64,
    /// Action to invoke, for example `get_session_info`.
    #[arg(value_name = "ACTION")]
    pub(crate) action: String,
    /// Parameters as `KEY=VALUE`. Values that parse as JSON are sent as JSON,
    /// anything else as a string.
    #[arg(value_name = "KEY=VALUE", num_args = 0.., allow_hyphen_values = true)]
    pub(crate) params: Vec<String>,
}

impl Cli {
    pub(crate) const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
