//! Output formatting for the consolidated report.
//!
//! This module handles writing and displaying the report:
//! - [`json`] - JSON document output
//! - [`terminal`] - Terminal summary with colors

mod json;
mod terminal;

pub use json::{report_to_json, write_report};
pub use terminal::{format_field, print_summary, summary_lines};
