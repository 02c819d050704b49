//! Span-based rewriter for raw JSON text
//!
//! Excises a set of key spans from a document and hands back the surviving
//! text. Removed spans that sit next to each other (separated only by a
//! comma and whitespace) are coalesced into one run first; each run is then
//! widened to swallow one adjacent comma (trailing preferred, else leading)
//! and the whitespace around it, so the enclosing container is left without
//! a dangling separator or a blank line.
//!
//! The rewrite is all-or-nothing: the result must parse as valid JSON or the
//! whole operation is rejected. The rewriter itself performs no I/O.

use crate::scan::Span;
use std::fmt;
use std::ops::Range;

#[derive(Debug)]
pub enum RewriteError {
    /// Two input spans overlap. The locator never produces this; it is a
    /// defensive check on the caller's removal set.
    OverlapInvariantViolation {
        first: Range<usize>,
        second: Range<usize>,
    },
    /// The rewritten text no longer parses as JSON; nothing was produced.
    IntegrityError(serde_json::Error),
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteError::OverlapInvariantViolation { first, second } => write!(
                f,
                "overlapping removal spans: {}..{} and {}..{}",
                first.start, first.end, second.start, second.end
            ),
            RewriteError::IntegrityError(e) => {
                write!(f, "rewritten text is not valid JSON: {}", e)
            }
        }
    }
}

impl std::error::Error for RewriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RewriteError::IntegrityError(e) => Some(e),
            _ => None,
        }
    }
}

/// Remove `spans` from `text` and return the surviving document.
///
/// An empty span set returns the text unchanged; `rewrite` is a fixed point
/// in that case.
pub fn rewrite(text: &str, spans: &[Span]) -> Result<String, RewriteError> {
    if spans.is_empty() {
        return Ok(text.to_string());
    }

    let mut ordered: Vec<&Span> = spans.iter().collect();
    ordered.sort_by_key(|s| s.start);
    for pair in ordered.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(RewriteError::OverlapInvariantViolation {
                first: pair[0].start..pair[0].end,
                second: pair[1].start..pair[1].end,
            });
        }
    }

    let bytes = text.as_bytes();
    // Coalesce contiguous removals into runs before widening. Widening each
    // span independently would drop only the separators between them and
    // leave the run's leading comma behind when the run is the tail of its
    // container.
    let mut runs: Vec<Range<usize>> = Vec::new();
    for span in &ordered {
        match runs.last_mut() {
            Some(prev) if contiguous(bytes, prev.end, span.start) => prev.end = span.end,
            _ => runs.push(span.start..span.end),
        }
    }
    let mut ranges: Vec<Range<usize>> = runs.into_iter().map(|run| widen(bytes, run)).collect();

    // Widened ranges of distinct runs never reach past the kept text that
    // separates them; clamp anyway so a splice can never go backwards.
    for i in 1..ranges.len() {
        let prev_end = ranges[i - 1].end;
        if ranges[i].start < prev_end {
            let clamped = prev_end.min(ranges[i].end);
            ranges[i].start = clamped;
        }
    }

    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in &ranges {
        result.push_str(&text[cursor..range.start]);
        cursor = range.end;
    }
    result.push_str(&text[cursor..]);

    validate(&result)?;
    Ok(result)
}

/// Post-condition check: the surviving text must be parseable JSON.
pub fn validate(text: &str) -> Result<(), RewriteError> {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|_| ())
        .map_err(RewriteError::IntegrityError)
}

/// True when the bytes between two removal spans are only the separator that
/// joins them: whitespace and at most one comma.
fn contiguous(bytes: &[u8], from: usize, to: usize) -> bool {
    let mut commas = 0;
    for &b in &bytes[from..to] {
        match b {
            b',' => commas += 1,
            b if b.is_ascii_whitespace() => {}
            _ => return false,
        }
    }
    commas <= 1
}

/// Widen a removal range over one adjacent comma and the surrounding
/// whitespace. The trailing comma is preferred; when the span is the last
/// element of its container the leading comma is taken instead.
fn widen(bytes: &[u8], range: Range<usize>) -> Range<usize> {
    let mut start = range.start;
    let mut end = range.end;

    let mut after = end;
    while after < bytes.len() && bytes[after].is_ascii_whitespace() {
        after += 1;
    }
    if bytes.get(after) == Some(&b',') {
        // Trailing comma: consume it plus the whitespace run up to the next
        // token, which keeps the survivor on its own line.
        end = after + 1;
        while end < bytes.len() && bytes[end].is_ascii_whitespace() {
            end += 1;
        }
    } else {
        // Last element: take the leading comma and the whitespace before it.
        while start > 0 && bytes[start - 1].is_ascii_whitespace() {
            start -= 1;
        }
        if start > 0 && bytes[start - 1] == b',' {
            start -= 1;
            while start > 0 && bytes[start - 1].is_ascii_whitespace() {
                start -= 1;
            }
        }
    }

    start..end
}
