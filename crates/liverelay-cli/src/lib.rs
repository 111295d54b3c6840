//! Command-line client for the LiveRelay socket relay.
//!
//! The client sends one JSON request line to the relay, waits for the single
//! response line, and forwards it to stdout. The process succeeds only when
//! the response carries `"ok": true`, so the tool composes with shell
//! conditionals.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use serde_json::Value;

mod cli;
mod config;
mod errors;
mod request;
mod transport;

use cli::Cli;
use config::{ConfigLoader, OrthoConfigLoader, resolve_port};
use errors::ClientError;
use request::build_request;

const USAGE_EXIT_CODE: u8 = 2;

/// Runs the client with explicit argument and output streams.
///
/// Responses are pretty-printed when `stdout_is_terminal` holds and written
/// as a single line otherwise.
pub fn run<I, T, W, E>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    stdout_is_terminal: bool,
) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, stdout_is_terminal, &OrthoConfigLoader)
}

/// Runs the client with a custom configuration loader.
pub(crate) fn run_with_loader<I, T, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    stdout_is_terminal: bool,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_usage(error, stdout, stderr),
    };
    match execute(&cli, stdout, stdout_is_terminal, loader) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            let _ = writeln!(stderr, "liverelay: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Sends the request and forwards the response. Returns the response's `ok`.
fn execute<W: Write, L: ConfigLoader>(
    cli: &Cli,
    stdout: &mut W,
    pretty: bool,
    loader: &L,
) -> Result<bool, ClientError> {
    let request = build_request(&cli.action, &cli.params)?;
    let port = resolve_port(cli.port, loader)?;
    let stream = transport::connect(&cli.host, port, cli.timeout())?;
    let response = transport::exchange(stream, &request)?;

    let rendered = if pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .map_err(ClientError::RenderResponse)?;
    writeln!(stdout, "{rendered}").map_err(ClientError::ForwardResponse)?;
    Ok(response.get("ok") == Some(&Value::Bool(true)))
}

fn report_usage<W: Write, E: Write>(
    error: clap::Error,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode {
    if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        let _ = write!(stdout, "{error}");
        return ExitCode::SUCCESS;
    }
    let usage = ClientError::CliUsage(error);
    let _ = write!(stderr, "{usage}");
    ExitCode::from(USAGE_EXIT_CODE)
}
