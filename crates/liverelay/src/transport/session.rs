//! Per-connection request loop.
//!
//! Each session frames request lines off its socket, hands every decoded
//! command to the relay and writes exactly one response line back before
//! reading the next request. Lines that fail to decode are answered at once
//! and never reach the relay.

use std::io::Write;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

use tracing::{debug, warn};

use super::errors::SessionError;
use super::framing::{LineBuffer, MAX_LINE_BYTES};
use super::handler::{ConnectionHandler, is_read_timeout, read_chunk_with_retry};
use super::TRANSPORT_TARGET;
use crate::relay::{Command, RelayCore, Response};

const READ_CHUNK_BYTES: usize = 4096;

/// Serves one client connection against the shared relay.
#[derive(Debug)]
pub(crate) struct SessionHandler {
    core: Arc<RelayCore>,
}

impl SessionHandler {
    pub(crate) const fn new(core: Arc<RelayCore>) -> Self {
        Self { core }
    }

    fn serve(&self, stream: &mut TcpStream) -> Result<(), SessionError> {
        let mut lines = LineBuffer::new();
        let mut chunk = [0_u8; READ_CHUNK_BYTES];
        while self.core.is_running() {
            let read = match read_chunk_with_retry(stream, &mut chunk) {
                Ok(0) => return Ok(()),
                Ok(read) => read,
                Err(error) if is_read_timeout(&error) => continue,
                Err(error) => return Err(SessionError::Read(error)),
            };
            lines.extend(&chunk[..read]);

            while let Some(line) = lines.next_line() {
                if let Some(response) = self.respond(&line) {
                    write_response(stream, &response)?;
                }
            }

            let size = lines.pending_len();
            if size > MAX_LINE_BYTES {
                let error = SessionError::RequestTooLarge {
                    size,
                    max_size: MAX_LINE_BYTES,
                };
                write_response(stream, &Response::error(error.to_string()))?;
                return Err(error);
            }
        }
        Ok(())
    }

    /// Answers one framed line. Blank lines produce no response.
    fn respond(&self, line: &[u8]) -> Option<Response> {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text.trim(),
            Err(error) => return Some(malformed(&error)),
        };
        if text.is_empty() {
            return None;
        }
        match Command::parse(text) {
            Ok(command) => Some(self.core.submit(command)),
            Err(error) => Some(malformed(&error)),
        }
    }
}

impl ConnectionHandler for SessionHandler {
    fn handle(&self, mut stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map_or_else(|_| "unknown".to_owned(), |addr| addr.to_string());
        if let Err(error) = stream.set_read_timeout(Some(self.core.limits().idle_read_timeout())) {
            warn!(
                target: TRANSPORT_TARGET,
                peer = %peer,
                error = %error,
                "failed to set read timeout"
            );
        }

        match self.serve(&mut stream) {
            Ok(()) => debug!(target: TRANSPORT_TARGET, peer = %peer, "client session ended"),
            Err(error) => warn!(
                target: TRANSPORT_TARGET,
                peer = %peer,
                error = %error,
                "client session failed"
            ),
        }

        // The peer may already be gone; closing is best effort.
        let _ = stream.shutdown(Shutdown::Both);
    }
}

fn malformed(error: &dyn std::error::Error) -> Response {
    debug!(target: TRANSPORT_TARGET, error = %error, "malformed request line");
    Response::error(format!("Invalid JSON: {error}"))
}

fn write_response(stream: &mut TcpStream, response: &Response) -> Result<(), SessionError> {
    let line = response.to_line()?;
    stream.write_all(&line).map_err(SessionError::Write)?;
    stream.flush().map_err(SessionError::Write)
}
