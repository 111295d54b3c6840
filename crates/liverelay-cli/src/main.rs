//! CLI entrypoint for the LiveRelay client.
//!
//! The binary delegates to [`liverelay_cli::run`], which parses arguments,
//! sends one request line to the relay and forwards the response line.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

fn main() -> ExitCode {
    let stdout_is_terminal = io::stdout().is_terminal();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    liverelay_cli::run(
        std::env::args_os(),
        &mut stdout,
        &mut stderr,
        stdout_is_terminal,
    )
}
