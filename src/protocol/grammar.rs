//! Reply grammars
//!
//! Replies end differently per command: on a sentinel line, after a
//! byte-counted block, or on a single status line. Each command maps to one
//! [`Grammar`], and the connection reads until that grammar reports the reply
//! complete.

/// Reply termination rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// One CRLF-terminated line
    Line,

    /// Lines up to a lone `END`, or a single error line
    EndSentinel,

    /// Byte-counted `VALUE` blocks followed by `END`
    Retrieval,

    /// Anything up to a recognised terminal line, otherwise until idle
    Passthrough,
}

/// Result of scanning a partially received reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// More bytes are needed
    Incomplete,

    /// The reply occupies the first `n` bytes of the buffer
    Complete(usize),
}

/// Position of the next CRLF at or after `from`
pub fn find_crlf(buf: &[u8], from: usize) -> Option<usize> {
    if from >= buf.len() {
        return None;
    }
    buf[from..]
        .windows(2)
        .position(|w| w == b"\r\n")
        .map(|p| from + p)
}

/// `ERROR`, `CLIENT_ERROR <msg>` or `SERVER_ERROR <msg>`
pub fn is_error_line(line: &[u8]) -> bool {
    line == b"ERROR" || line.starts_with(b"CLIENT_ERROR") || line.starts_with(b"SERVER_ERROR")
}

fn is_terminal_line(line: &[u8]) -> bool {
    const TOKENS: &[&[u8]] = &[
        b"END",
        b"OK",
        b"STORED",
        b"NOT_STORED",
        b"EXISTS",
        b"DELETED",
        b"NOT_FOUND",
        b"TOUCHED",
        b"RESET",
    ];
    TOKENS.contains(&line)
        || is_error_line(line)
        || line.starts_with(b"VERSION ")
        || (!line.is_empty() && line.iter().all(u8::is_ascii_digit))
}

/// Declared `<bytes>` of a `VALUE <key> <flags> <bytes> [<cas>]` header
fn declared_len(header: &[u8]) -> Option<usize> {
    let text = std::str::from_utf8(header).ok()?;
    text.split_ascii_whitespace().nth(3)?.parse().ok()
}

impl Grammar {
    /// Whether a quiet connection ends the reply instead of timing out
    pub fn ends_on_idle(&self) -> bool {
        matches!(self, Grammar::Passthrough)
    }

    /// Decide whether `buf` holds a complete reply
    pub fn scan(&self, buf: &[u8]) -> Scan {
        let mut pos = 0;
        loop {
            let line_end = match find_crlf(buf, pos) {
                Some(end) => end,
                None => return Scan::Incomplete,
            };
            let line = &buf[pos..line_end];
            let next = line_end + 2;

            match self {
                Grammar::Line => return Scan::Complete(next),
                Grammar::EndSentinel => {
                    if line == b"END" || is_error_line(line) {
                        return Scan::Complete(next);
                    }
                }
                Grammar::Retrieval | Grammar::Passthrough if line.starts_with(b"VALUE ") => {
                    let len = match declared_len(line) {
                        Some(len) => len,
                        // unparseable header; let the parser report it
                        None => return Scan::Complete(next),
                    };
                    let block_end = match next.checked_add(len).and_then(|end| end.checked_add(2)) {
                        Some(end) => end,
                        // length no buffer can hold; let the parser reject it
                        None => return Scan::Complete(next),
                    };
                    if buf.len() < block_end {
                        return Scan::Incomplete;
                    }
                    if &buf[next + len..block_end] != b"\r\n" {
                        // declared length disagrees with the data
                        return Scan::Complete(block_end);
                    }
                    pos = block_end;
                    continue;
                }
                Grammar::Retrieval => return Scan::Complete(next),
                Grammar::Passthrough => {
                    if is_terminal_line(line) {
                        return Scan::Complete(next);
                    }
                }
            }
            pos = next;
        }
    }
}
