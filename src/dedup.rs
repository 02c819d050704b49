//! Duplicate grouping and removal planning
//!
//! Takes the spans produced by the locator and decides which occurrences are
//! true duplicates and which occurrence of each group survives. Both
//! questions are policies, not hard-coded behavior: the original cleanup
//! scripts disagreed on them, so the caller picks.
//!
//! Matching predicates ([`MatchMode`]):
//! - `ByName`: same key name anywhere, path and content ignored. This is the
//!   aggressive mode; it will flag same-named keys whose values differ.
//! - `ByContent`: same key name plus byte-for-byte identical value text,
//!   regardless of where each occurrence sits. Same-named keys with different
//!   content are left alone, deferring to standard last-value-wins parser
//!   semantics downstream.
//! - `BySiblingContent`: like `ByContent` but occurrences must also share a
//!   parent path, the most conservative mode.
//!
//! Keep strategies ([`KeepPolicy`]):
//! - `First`: first occurrence in source order wins.
//! - `ShortestPath`: the occurrence with the fewest dotted-path components
//!   wins, preferring top-level placements over deeply nested accidental
//!   copies; ties fall back to source order.

use crate::scan::Span;
use std::fmt;

/// Predicate deciding when two same-named spans count as duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    ByName,
    ByContent,
    BySiblingContent,
}

impl MatchMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(MatchMode::ByName),
            "content" => Some(MatchMode::ByContent),
            "sibling-content" => Some(MatchMode::BySiblingContent),
            _ => None,
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::ByName => write!(f, "name"),
            MatchMode::ByContent => write!(f, "content"),
            MatchMode::BySiblingContent => write!(f, "sibling-content"),
        }
    }
}

/// Strategy deciding which occurrence of a duplicate group is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepPolicy {
    First,
    ShortestPath,
}

impl KeepPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "first" => Some(KeepPolicy::First),
            "shortest-path" => Some(KeepPolicy::ShortestPath),
            _ => None,
        }
    }
}

impl fmt::Display for KeepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepPolicy::First => write!(f, "first"),
            KeepPolicy::ShortestPath => write!(f, "shortest-path"),
        }
    }
}

/// Spans sharing a key under the selected matching predicate, occurrences in
/// source order.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub key: String,
    pub occurrences: Vec<Span>,
}

/// The decision of which span to retain and which to excise from one group.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalPlan {
    pub keep: Span,
    pub remove: Vec<Span>,
}

/// Group spans into duplicate groups under `mode`. Only groups with more than
/// one occurrence are returned, in order of first appearance.
pub fn group_duplicates(text: &str, spans: &[Span], mode: MatchMode) -> Vec<DuplicateGroup> {
    // Bucket key order follows first appearance; a Vec scan keeps that
    // without pulling in an ordered map.
    let mut groups: Vec<(String, Vec<Span>)> = Vec::new();

    for span in spans {
        let bucket = match mode {
            MatchMode::ByName => span.key.clone(),
            MatchMode::ByContent => {
                format!("{}\u{0}{}", span.key, span.value_text(text))
            }
            MatchMode::BySiblingContent => format!(
                "{}\u{0}{}\u{0}{}",
                span.parent_path,
                span.key,
                span.value_text(text)
            ),
        };
        match groups.iter_mut().find(|(k, _)| *k == bucket) {
            Some((_, occ)) => occ.push(span.clone()),
            None => groups.push((bucket, vec![span.clone()])),
        }
    }

    groups
        .into_iter()
        .filter(|(_, occ)| occ.len() > 1)
        .map(|(_, occ)| DuplicateGroup {
            key: occ[0].key.clone(),
            occurrences: occ,
        })
        .collect()
}

/// Derive the removal plan for one group under `policy`.
///
/// Returns `None` for groups with fewer than two occurrences.
pub fn plan_removal(group: &DuplicateGroup, policy: KeepPolicy) -> Option<RemovalPlan> {
    if group.occurrences.len() < 2 {
        return None;
    }

    let keep_index = match policy {
        KeepPolicy::First => 0,
        KeepPolicy::ShortestPath => {
            // min_by_key is stable, so ties break to first appearance
            group
                .occurrences
                .iter()
                .enumerate()
                .min_by_key(|(_, s)| path_components(s))
                .map(|(i, _)| i)
                .unwrap_or(0)
        }
    };

    let keep = group.occurrences[keep_index].clone();
    let remove = group
        .occurrences
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != keep_index)
        .map(|(_, s)| s.clone())
        .collect();

    Some(RemovalPlan { keep, remove })
}

/// Flatten the removal plans for all groups into one span set, dropping any
/// span that is already contained inside another removed span. Removing the
/// outer span removes the inner one with it, and the rewriter rejects
/// overlapping input.
pub fn removal_set(plans: &[RemovalPlan]) -> Vec<Span> {
    let mut spans: Vec<Span> = plans.iter().flat_map(|p| p.remove.iter().cloned()).collect();
    spans.sort_by_key(|s| (s.start, std::cmp::Reverse(s.end)));

    let mut kept: Vec<Span> = Vec::new();
    for span in spans {
        if kept.iter().any(|outer| outer.contains(&span)) {
            continue;
        }
        kept.push(span);
    }
    kept
}

fn path_components(span: &Span) -> usize {
    if span.parent_path.is_empty() {
        1
    } else {
        span.parent_path.split('.').count() + 1
    }
}
