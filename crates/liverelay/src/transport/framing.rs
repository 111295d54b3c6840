//! Newline framing over a byte stream.
//!
//! Bytes are buffered as they arrive and split on `\n`. A line may span
//! several reads and a read may carry several lines; whatever follows the
//! last newline stays buffered for the next read. Lines are split on raw
//! bytes so a multi-byte UTF-8 sequence cut across reads is reassembled
//! before it is decoded.

/// Largest request line accepted before the connection is dropped.
pub(crate) const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends freshly read bytes.
    pub(crate) fn extend(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    /// Removes and returns the next complete line without its terminator.
    pub(crate) fn next_line(&mut self) -> Option<Vec<u8>> {
        let end = self.pending.iter().position(|byte| *byte == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=end).collect();
        line.pop();
        Some(line)
    }

    /// Bytes buffered after the last complete line.
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
