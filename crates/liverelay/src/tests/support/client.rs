//! Blocking line client used to drive the relay over real sockets.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::Value;

const CLIENT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// What a client observed during one exchange.
#[derive(Debug, Default)]
pub struct ClientOutcome {
    /// Decoded response lines, in arrival order.
    pub responses: Vec<Value>,
    /// Whether the server closed the connection after the last response.
    pub closed_by_server: bool,
}

/// A clean EOF or a reset means the server closed the socket. A read timeout
/// means it is still open.
fn hung_up(read: &std::io::Result<usize>) -> bool {
    match read {
        Ok(0) => true,
        Ok(_) => false,
        Err(error) => error.kind() == ErrorKind::ConnectionReset,
    }
}

/// Writes `payload` in a single call on a background thread, then reads
/// `expected` response lines. With `await_close`, one more read checks
/// whether the server hung up.
///
/// The caller keeps the host ticking until the handle finishes.
pub fn exchange(
    addr: SocketAddr,
    payload: Vec<u8>,
    expected: usize,
    await_close: bool,
) -> JoinHandle<ClientOutcome> {
    exchange_after(addr, Duration::ZERO, payload, expected, await_close)
}

/// Like [`exchange`], but stays connected and silent for `silence` before
/// writing.
pub fn exchange_after(
    addr: SocketAddr,
    silence: Duration,
    payload: Vec<u8>,
    expected: usize,
    await_close: bool,
) -> JoinHandle<ClientOutcome> {
    thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).expect("connect to relay");
        stream
            .set_read_timeout(Some(CLIENT_READ_TIMEOUT))
            .expect("set client read timeout");
        thread::sleep(silence);
        stream.write_all(&payload).expect("write request");
        stream.flush().expect("flush request");

        let mut reader = BufReader::new(stream);
        let mut outcome = ClientOutcome::default();
        let mut line = String::new();
        while outcome.responses.len() < expected {
            line.clear();
            let read = reader.read_line(&mut line).expect("read response");
            if read == 0 {
                outcome.closed_by_server = true;
                return outcome;
            }
            let value = serde_json::from_str(line.trim()).expect("response is JSON");
            outcome.responses.push(value);
        }

        if await_close {
            line.clear();
            outcome.closed_by_server = hung_up(&reader.read_line(&mut line));
        }
        outcome
    })
}

#[cfg(test)]
mod tests {
    use std::io;

    use rstest::rstest;

    use super::hung_up;

    #[rstest]
    #[case(Ok(0), true)]
    #[case(Ok(12), false)]
    #[case(Err(io::Error::from(io::ErrorKind::ConnectionReset)), true)]
    #[case(Err(io::Error::from(io::ErrorKind::WouldBlock)), false)]
    #[case(Err(io::Error::from(io::ErrorKind::TimedOut)), false)]
    fn only_eof_or_reset_counts_as_closed(
        #[case] read: io::Result<usize>,
        #[case] expected: bool,
    ) {
        assert_eq!(hung_up(&read), expected);
    }
}
