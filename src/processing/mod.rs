//! Prefix processing logic.
//!
//! This module contains the consolidation core:
//! - [`parse`] - Token parsing into canonical networks
//! - [`aggregate`] - Minimal CIDR cover per address family
//! - [`consolidate`] - Batch parsing plus per-family aggregation

mod aggregate;
mod consolidate;
mod parse;

// Re-export public functions
pub use aggregate::{aggregate, interval_to_cidrs, merge_intervals, remove_subsumed, Interval};
pub use consolidate::{consolidate, Consolidated};
pub use parse::{parse, parse_batch, ParseError, ParseErrorKind, ParseReport};
