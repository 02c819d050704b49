//! Character-level scan state for raw JSON text
//!
//! The cursor is the one place that knows whether a byte is "structural" or
//! part of a string literal. Every other scanning component drives it byte by
//! byte so that braces, brackets, commas and colons that appear inside string
//! values are never mistaken for structure.
//!
//! A quote is escaped exactly when it is preceded by an odd number of
//! backslashes; the cursor tracks this incrementally with a single pending
//! flag instead of re-counting backslashes on every quote.
//!
//! Malformed input is not an error at this layer. The cursor simply runs to
//! end of text and the caller inspects the final state: still inside a string
//! or at nonzero depth means the scan did not complete.

/// Transient state advanced over one byte at a time during a single pass.
///
/// `depth` counts currently open objects and arrays, starting at 0 before the
/// outermost opening brace is consumed. It is signed so that an unbalanced
/// closer shows up as a negative depth rather than a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanState {
    pub offset: usize,
    pub depth: isize,
    pub in_string: bool,
    pending_escape: bool,
}

impl ScanState {
    pub fn new() -> Self {
        ScanState::default()
    }

    /// Consume one byte and update string/escape/depth tracking.
    pub fn advance(&mut self, byte: u8) {
        if self.in_string {
            if self.pending_escape {
                self.pending_escape = false;
            } else if byte == b'\\' {
                self.pending_escape = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
        } else {
            match byte {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => self.depth -= 1,
                _ => {}
            }
        }
        self.offset += 1;
    }

    /// True when the cursor is outside any string with all containers closed.
    pub fn is_balanced(&self) -> bool {
        !self.in_string && self.depth == 0
    }
}

/// Run the cursor over an entire text and return the final state.
pub fn scan_to_end(text: &str) -> ScanState {
    let mut state = ScanState::new();
    for &byte in text.as_bytes() {
        state.advance(byte);
    }
    state
}

/// Find the end of the string literal whose opening quote is at `open`.
///
/// Returns the offset just past the closing quote, or `None` if the string
/// runs off the end of the text.
pub fn string_end(bytes: &[u8], open: usize) -> Option<usize> {
    debug_assert_eq!(bytes.get(open), Some(&b'"'));
    let mut state = ScanState::new();
    state.advance(b'"');
    for (i, &byte) in bytes[open + 1..].iter().enumerate() {
        state.advance(byte);
        if !state.in_string {
            return Some(open + 1 + i + 1);
        }
    }
    None
}

/// Find the end of the container value whose opener (`{` or `[`) is at `open`.
///
/// Returns the offset just past the matching closer, or `None` if the
/// container is never closed.
pub fn container_end(bytes: &[u8], open: usize) -> Option<usize> {
    debug_assert!(matches!(bytes.get(open), Some(&b'{') | Some(&b'[')));
    let mut state = ScanState::new();
    for (i, &byte) in bytes[open..].iter().enumerate() {
        state.advance(byte);
        if state.depth == 0 && !state.in_string {
            return Some(open + i + 1);
        }
    }
    None
}
