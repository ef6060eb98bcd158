//! Streaming utilities
//!
//! Line buffering for newline-delimited responses and the keep-alive relay
//! used for event-stream responses.

pub mod relay;

pub use relay::{RelayOutcome, StreamRelay, HEARTBEAT_FRAME};

/// Buffer for accumulating incomplete lines across chunk boundaries.
///
/// Network chunks rarely align with line boundaries, and may even split a
/// multi-byte UTF-8 character. Bytes are held until a `\n` completes the line.
///
/// # Example
/// ```
/// use thinkrelay::streaming::LineBuffer;
///
/// let mut buffer = LineBuffer::new();
///
/// let lines1 = buffer.feed(b"{\"done\":fa");
/// assert!(lines1.is_empty());
///
/// let lines2 = buffer.feed(b"lse}\n");
/// assert_eq!(lines2, vec!["{\"done\":false}"]);
/// ```
#[derive(Debug, Default)]
pub struct LineBuffer {
    /// Bytes of the line currently being assembled
    incomplete: Vec<u8>,
}

impl LineBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self {
            incomplete: Vec::new(),
        }
    }

    /// Feed bytes into the buffer and return any complete lines.
    ///
    /// The trailing `\n` (and a preceding `\r`) is stripped. Empty lines are
    /// skipped. Incomplete trailing data is kept for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.incomplete.extend_from_slice(bytes);

        let mut complete_lines = Vec::new();
        let mut start = 0;

        while let Some(offset) = self.incomplete[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            if let Some(line) = Self::decode(&self.incomplete[start..end]) {
                complete_lines.push(line);
            }
            start = end + 1;
        }

        self.incomplete.drain(..start);
        complete_lines
    }

    /// Take whatever is left once the stream has ended.
    ///
    /// Returns `None` when the stream ended on a line boundary.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.incomplete);
        Self::decode(&rest)
    }

    fn decode(raw: &[u8]) -> Option<String> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(raw).into_owned())
    }
}
