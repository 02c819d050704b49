//! Text-level JSON section scanning
//!
//! The scanning layer works on raw text and never routes the document
//! through a JSON parser, so duplicate keys stay visible instead of being
//! collapsed by last-value-wins parsing. Two pieces:
//!
//! - [`cursor`]: byte-at-a-time scan state tracking string literals, escape
//!   sequences and container depth
//! - [`locator`]: produces ordered key/value [`Span`]s at any nesting depth

pub mod cursor;
pub mod locator;

pub use cursor::{scan_to_end, ScanState};
pub use locator::{locate, locate_all, ScanError, Span};
