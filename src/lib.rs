//! Spamhaus DROP CIDR Summary Library
//!
//! Fetches the Spamhaus DROP, DROP v6 and ASN-DROP lists, resolves ASNs to
//! announced prefixes through RIPEstat, and consolidates everything into the
//! minimal set of IPv4 and IPv6 CIDR blocks.
//!
//! # Modules
//! - [`config`] - Runtime configuration
//! - [`models`] - Network and report data structures
//! - [`processing`] - Parsing and CIDR aggregation
//! - [`sources`] - Remote list retrieval and caching
//! - [`output`] - JSON and terminal output

pub mod config;
pub mod models;
pub mod output;
pub mod processing;
pub mod sources;

use config::Config;
use models::{get_current_timestamp, DropReport};
use sources::SourceData;
use std::error::Error;

/// Consolidate already loaded source data into a report.
pub fn build_report(sources: &SourceData, timestamp: String) -> DropReport {
    let consolidated = processing::consolidate(sources.tokens());
    DropReport::new(sources, consolidated, timestamp)
}

/// Load the sources, consolidate them and write the report file.
///
/// Failed sources and invalid entries only reduce the result; they are
/// visible in the report summary. Errors are limited to the cache and the
/// output file.
pub async fn run(config: &Config) -> Result<DropReport, Box<dyn Error>> {
    let sources = sources::load_sources(config).await?;
    let report = build_report(&sources, get_current_timestamp(config.timezone));
    output::write_report(&config.output_file, &report)?;
    Ok(report)
}
