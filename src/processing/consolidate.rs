//! Token batch consolidation.
//!
//! Parses raw tokens, partitions them by address family and aggregates each
//! family independently.

use super::{aggregate, parse_batch, ParseError};
use crate::models::Network;
use itertools::Itertools;

/// Consolidated CIDR blocks per family plus pre-merge counts.
#[derive(Debug, Default)]
pub struct Consolidated {
    pub v4: Vec<Network>,
    pub v6: Vec<Network>,
    /// Distinct IPv4 networks before merging.
    pub unique_v4: usize,
    /// Distinct IPv6 networks before merging.
    pub unique_v6: usize,
    pub rejected: Vec<ParseError>,
}

/// Consolidate overlapping or adjacent ranges into the minimal CIDR blocks per family.
pub fn consolidate<I, S>(tokens: I) -> Consolidated
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let report = parse_batch(tokens, None);

    let unique_v4 = report.v4.iter().unique().count();
    let unique_v6 = report.v6.iter().unique().count();

    let v4 = aggregate(report.v4);
    let v6 = aggregate(report.v6);

    log::info!(
        "Consolidated {unique_v4} unique IPv4 ranges to {} and {unique_v6} unique IPv6 ranges to {} ({} invalid)",
        v4.len(),
        v6.len(),
        report.rejected.len()
    );

    Consolidated {
        v4,
        v6,
        unique_v4,
        unique_v6,
        rejected: report.rejected,
    }
}
