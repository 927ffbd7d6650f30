//! Terminal output utilities.
//!
//! Provides formatting helpers for the run summary.

use crate::models::DropReport;
use colored::Colorize;

/// Format a value as a right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    if value_str.len() >= width {
        value_str
    } else {
        format!("{value_str:>width$}")
    }
}

/// Summary lines describing a run, one `label: value` per line.
pub fn summary_lines(report: &DropReport) -> Vec<String> {
    let s = &report.summary;
    let mut lines = vec![
        format!("{:<18}{}", "Timestamp:", report.timestamp),
        format!("{:<18}{} entries", "Spamhaus DROP v4:", format_field(s.drop_v4_entries, 7)),
        format!("{:<18}{} entries", "Spamhaus DROP v6:", format_field(s.drop_v6_entries, 7)),
        format!(
            "{:<18}{} entries, {} unique IP ranges",
            "Spamhaus ASN-DROP:",
            format_field(s.asn_drop_entries, 7),
            s.asn_prefixes_unique
        ),
        format!(
            "{:<18}{} -> {} IPv4 ranges",
            "Consolidated v4:",
            format_field(s.unique_v4_ranges, 7),
            s.consolidated_v4_ranges
        ),
        format!(
            "{:<18}{} -> {} IPv6 ranges",
            "Consolidated v6:",
            format_field(s.unique_v6_ranges, 7),
            s.consolidated_v6_ranges
        ),
    ];
    if s.invalid_entries > 0 {
        lines.push(format!("{:<18}{}", "Invalid entries:", format_field(s.invalid_entries, 7)));
    }
    if !s.failed_sources.is_empty() {
        lines.push(format!("{:<18}{}", "Failed sources:", s.failed_sources.join(", ")));
    }
    if !s.failed_asn_lookups.is_empty() {
        lines.push(format!(
            "{:<18}{}",
            "Failed ASNs:",
            s.failed_asn_lookups.join(", ")
        ));
    }
    lines
}

/// Print the run summary to stdout.
pub fn print_summary(report: &DropReport) {
    for line in summary_lines(report) {
        println!("{line}");
    }
    if report.is_degraded() {
        println!("#{}# run completed with skipped data", "NOTE".on_red());
    } else {
        println!("#{}# all sources consolidated", "OK".on_green());
    }
}
