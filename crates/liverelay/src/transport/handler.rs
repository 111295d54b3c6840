//! Connection handling abstractions for the relay listener.

use std::io::{self, Read};
use std::net::TcpStream;

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection until it ends. Implementations own the
    /// stream and must not panic.
    fn handle(&self, stream: TcpStream);
}

/// Reads into `chunk`, retrying reads interrupted by signals.
pub(crate) fn read_chunk_with_retry<R: Read>(stream: &mut R, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(chunk) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
}

/// Returns `true` for the error kinds an expired read timeout produces.
pub(crate) fn is_read_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    struct InterruptOnce {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptOnce {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[rstest]
    fn interrupted_reads_are_retried() {
        let mut stream = InterruptOnce {
            interrupted: false,
            inner: Cursor::new(b"ping\n".to_vec()),
        };
        let mut chunk = [0_u8; 16];
        let read = read_chunk_with_retry(&mut stream, &mut chunk).expect("read succeeds");
        assert_eq!(&chunk[..read], b"ping\n");
    }

    #[rstest]
    #[case(io::ErrorKind::WouldBlock, true)]
    #[case(io::ErrorKind::TimedOut, true)]
    #[case(io::ErrorKind::ConnectionReset, false)]
    fn timeouts_are_recognised(#[case] kind: io::ErrorKind, #[case] expected: bool) {
        assert_eq!(is_read_timeout(&io::Error::from(kind)), expected);
    }
}
