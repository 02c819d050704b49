//! Section locator for raw JSON text
//!
//! Walks a document left to right and records a [`Span`] for every
//! `"key": value` pair it encounters, at every nesting depth, without ever
//! materializing the document through a JSON parser. This is the whole point:
//! a standards-compliant parser silently collapses duplicate keys, so the
//! only way to see them is at the text level.
//!
//! A key is recognized when an unescaped quote opens a string directly inside
//! an object and the first non-whitespace byte after the string's closing
//! quote is a colon. The value span is then resolved by kind: containers run
//! to their matching closer, strings to their closing quote, bare literals to
//! the next comma or enclosing closer.
//!
//! Spans are emitted in exact source order; first-occurrence policies depend
//! on that ordering.

use crate::scan::cursor::{container_end, string_end, ScanState};
use serde::Serialize;
use std::fmt;

/// One occurrence of a key at a known nesting depth in the source text.
///
/// `start` is the offset of the key's opening quote; `end` is the offset just
/// past the end of the value (past the matching closer for containers, past
/// the closing quote for strings, past the last byte for bare literals).
/// `value_start` is the offset of the first byte of the value, so callers can
/// compare value text byte for byte without re-scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Raw key text between the quotes, escapes left as written.
    pub key: String,
    pub start: usize,
    pub value_start: usize,
    pub end: usize,
    /// Number of containers open around this key; top-level keys sit at 1.
    pub depth: usize,
    /// Dotted path of the enclosing object keys, e.g. `menu.items` for a key
    /// inside `{"menu": {"items": {...}}}`. Empty for top-level keys.
    pub parent_path: String,
}

impl Span {
    /// Full dotted path of this key, parent path included.
    pub fn dotted_path(&self) -> String {
        if self.parent_path.is_empty() {
            self.key.clone()
        } else {
            format!("{}.{}", self.parent_path, self.key)
        }
    }

    /// Raw value text of this span within `text`.
    pub fn value_text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.value_start..self.end]
    }

    /// True when `other` lies entirely inside this span's range.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Scan failures surfaced after the cursor has run to end of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// End of text reached inside a string or with open containers.
    ScanIncomplete { offset: usize, depth: isize, in_string: bool },
    /// A closer of the wrong kind for the innermost open container, e.g.
    /// `]` closing an object.
    MismatchedCloser {
        offset: usize,
        expected: char,
        found: char,
    },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::ScanIncomplete {
                offset,
                depth,
                in_string,
            } => {
                if *in_string {
                    write!(f, "scan incomplete: unterminated string at offset {}", offset)
                } else {
                    write!(
                        f,
                        "scan incomplete: {} unbalanced container(s) at offset {}",
                        depth.abs(),
                        offset
                    )
                }
            }
            ScanError::MismatchedCloser {
                offset,
                expected,
                found,
            } => write!(
                f,
                "mismatched closer at offset {}: expected '{}', found '{}'",
                offset, expected, found
            ),
        }
    }
}

impl std::error::Error for ScanError {}

/// Locate every key span in `text`, at all depths, in source order.
pub fn locate_all(text: &str) -> Result<Vec<Span>, ScanError> {
    let bytes = text.as_bytes();
    let mut state = ScanState::new();
    // Parallel stacks: one entry per open container. `names` holds the key
    // under which the container was opened (empty for the root and for
    // containers opened inside arrays).
    let mut containers: Vec<u8> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    let mut pending_key: Option<String> = None;
    let mut spans = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if !state.in_string {
            match byte {
                b'"' if containers.last() == Some(&b'{') => {
                    if let Some(span) = try_key_span(text, i, containers.len(), &names)? {
                        pending_key = Some(span.key.clone());
                        spans.push(span);
                    }
                }
                b'{' | b'[' => {
                    containers.push(byte);
                    names.push(pending_key.take().unwrap_or_default());
                }
                b'}' | b']' => {
                    // A stray closer with nothing open falls through to the
                    // negative-depth check below instead.
                    if let Some(opener) = containers.pop() {
                        let expected = if opener == b'{' { b'}' } else { b']' };
                        if byte != expected {
                            return Err(ScanError::MismatchedCloser {
                                offset: i,
                                expected: expected as char,
                                found: byte as char,
                            });
                        }
                    }
                    names.pop();
                    pending_key = None;
                }
                b',' => {
                    pending_key = None;
                }
                _ => {}
            }
        }
        state.advance(byte);
        i += 1;
    }

    if !state.is_balanced() {
        return Err(ScanError::ScanIncomplete {
            offset: state.offset,
            depth: state.depth,
            in_string: state.in_string,
        });
    }
    Ok(spans)
}

/// Locate key spans at one target depth only (depth 1 is the top level of the
/// outer object).
pub fn locate(text: &str, target_depth: usize) -> Result<Vec<Span>, ScanError> {
    let mut spans = locate_all(text)?;
    spans.retain(|s| s.depth == target_depth);
    Ok(spans)
}

/// Check whether the string opening at `quote` is a key, and if so resolve
/// its full span. Returns `Ok(None)` for plain string values.
fn try_key_span(
    text: &str,
    quote: usize,
    depth: usize,
    names: &[String],
) -> Result<Option<Span>, ScanError> {
    let bytes = text.as_bytes();
    let key_end = string_end(bytes, quote).ok_or(ScanError::ScanIncomplete {
        offset: bytes.len(),
        depth: depth as isize,
        in_string: true,
    })?;

    let colon = skip_whitespace(bytes, key_end);
    if bytes.get(colon) != Some(&b':') {
        return Ok(None);
    }

    let value_start = skip_whitespace(bytes, colon + 1);
    let end = value_end(bytes, value_start).ok_or(ScanError::ScanIncomplete {
        offset: bytes.len(),
        depth: depth as isize,
        in_string: false,
    })?;

    let key = text[quote + 1..key_end - 1].to_string();
    let parent_path = names
        .iter()
        .filter(|n| !n.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(".");

    Ok(Some(Span {
        key,
        start: quote,
        value_start,
        end,
        depth,
        parent_path,
    }))
}

/// Offset just past the end of the value starting at `start`.
fn value_end(bytes: &[u8], start: usize) -> Option<usize> {
    match bytes.get(start)? {
        b'{' | b'[' => container_end(bytes, start),
        b'"' => string_end(bytes, start),
        _ => {
            // Bare literal: number, boolean or null. Runs to the next comma
            // or the enclosing closer, trailing whitespace excluded.
            let mut i = start;
            while i < bytes.len() && !matches!(bytes[i], b',' | b'}' | b']') {
                i += 1;
            }
            let mut end = i;
            while end > start && bytes[end - 1].is_ascii_whitespace() {
                end -= 1;
            }
            (end > start).then_some(end)
        }
    }
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}
