//! # dupkeys
//!
//! Detects and removes duplicate keys in JSON localization files by scanning
//! the raw text. A standards-compliant JSON parser silently collapses
//! duplicate keys to last-value-wins, so everything here operates on byte
//! offsets in the source text; a real parser is only used as a validity
//! check after a rewrite and for pretty-printing.
//!
//! Layers, in data-flow order:
//!
//! - [`scan`]: tokenizing cursor and section locator producing key spans
//! - [`dedup`]: duplicate grouping predicates and keep strategies
//! - [`rewrite`]: span-based text rewriter with a JSON validity post-check
//! - [`process`]: per-file pipeline (backup, rewrite, persist) and batch runs
//! - [`discover`]: locale directory enumeration
//! - [`report`]: per-file and batch summaries

pub mod dedup;
pub mod discover;
pub mod process;
pub mod report;
pub mod rewrite;
pub mod scan;

pub use dedup::{DuplicateGroup, KeepPolicy, MatchMode, RemovalPlan};
pub use process::{DepthFilter, ProcessError, ProcessOptions, RunMode};
pub use report::{BatchReport, FileReport};
pub use scan::{ScanError, Span};
