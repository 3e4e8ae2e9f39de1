//! Line reassembly across arbitrary chunk boundaries.

/// Reassembles complete lines from a stream of byte chunks.
///
/// The transport layer delivers the decompressed body in chunks that split
/// anywhere, including mid-line. `feed` concatenates the retained fragment
/// with the incoming chunk, emits every complete line, and keeps whatever
/// follows the last terminator as the new fragment.
///
/// Convention for a terminator landing exactly on a chunk boundary: the
/// retained fragment is then *empty*, never a complete line, so the next
/// `feed` starts fresh and no re-splitting is ever required.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
/// dropped. Downstream this means corruption in a numeric field of a
/// matching row surfaces as a malformed event, while corruption in the
/// symbol field makes the row read as another instrument and skip
/// uncounted. The row count of the stream is preserved either way.
///
/// One assembler exists per (date, type) pipeline; state is never shared.
#[derive(Debug, Default)]
pub struct LineAssembler {
    fragment: Vec<u8>,
}

impl LineAssembler {
    /// Creates an assembler with no retained fragment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fragment: Vec::new(),
        }
    }

    /// Feeds a chunk, returning every line completed by it, in order.
    ///
    /// Trailing `\r` is stripped so CRLF input yields the same lines as LF.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.fragment.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = find_newline(&self.fragment[start..]) {
            let end = start + pos;
            lines.push(to_line(&self.fragment[start..end]));
            start = end + 1;
        }
        self.fragment.drain(..start);
        lines
    }

    /// Consumes the assembler, returning the final unterminated line if the
    /// stream did not end on a terminator.
    #[must_use]
    pub fn finish(self) -> Option<String> {
        if self.fragment.is_empty() {
            None
        } else {
            Some(to_line(&self.fragment))
        }
    }

    /// Returns the number of buffered fragment bytes.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.fragment.len()
    }
}

fn find_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}

fn to_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
