//! Standalone host harness used by the `liverelayd` binary.
//!
//! The harness plays the host's part: it owns a [`SimulatedHost`], loads the
//! remote script against it and ticks the script at the configured cadence
//! until a termination signal arrives.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use liverelay_config::Config;
use ortho_config::OrthoError;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use thiserror::Error;
use tracing::info;

use crate::host::SimulatedHost;
use crate::script::{ControlSurface, RemoteScript, ScriptOptions};
use crate::telemetry::{self, TelemetryError};

const HARNESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::harness");

/// Failures that stop the harness before it starts ticking.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// The log subscriber could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// Signal handlers could not be registered.
    #[error("failed to install signal handlers: {source}")]
    Signals {
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}

/// Loads configuration, installs telemetry and runs until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns a [`HarnessError`] when start-up fails. A relay port that cannot
/// be bound is not an error: the harness keeps ticking without clients, as a
/// host would.
pub fn run() -> Result<(), HarnessError> {
    let config = Config::load_layered().map_err(|source| HarnessError::Config { source })?;
    telemetry::initialise(&config)?;

    let stop = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&stop))
            .map_err(|source| HarnessError::Signals { source })?;
    }

    Harness::new(&config).run_until(&stop);
    Ok(())
}

/// A simulated host ticking a loaded remote script.
#[derive(Debug)]
pub struct Harness {
    script: RemoteScript<SimulatedHost>,
    tick_interval: Duration,
}

impl Harness {
    /// Loads the script against the demo session on `config.port()`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let options = ScriptOptions::new().with_port(config.port());
        Self {
            script: RemoteScript::with_options(SimulatedHost::demo(), options),
            tick_interval: config.tick_interval(),
        }
    }

    /// Address clients should connect to, when the relay is listening.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.script.local_addr()
    }

    /// The loaded script.
    #[must_use]
    pub const fn script(&self) -> &RemoteScript<SimulatedHost> {
        &self.script
    }

    /// Ticks until `stop` is raised, then unloads the script.
    pub fn run_until(mut self, stop: &AtomicBool) {
        info!(
            target: HARNESS_TARGET,
            addr = ?self.script.local_addr(),
            tick_ms = self.tick_interval.as_millis(),
            "host harness running"
        );
        while !stop.load(Ordering::SeqCst) {
            self.script.update_display();
            thread::sleep(self.tick_interval);
        }
        info!(target: HARNESS_TARGET, "shutdown requested");
        self.script.disconnect();
    }
}
