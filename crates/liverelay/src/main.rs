//! `liverelayd`: runs the relay against an in-memory host session.
//!
//! Clients connect exactly as they would to the plugin loaded inside the real
//! host. Configuration is layered from defaults, an optional configuration file,
//! `LIVERELAY_*` environment variables and command-line flags.

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match liverelay::harness::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // Telemetry may not be installed yet, so report on stderr directly.
            let _ = writeln!(io::stderr(), "liverelayd: {error}");
            ExitCode::FAILURE
        }
    }
}
