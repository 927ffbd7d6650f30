//! Consolidated DROP report document.

use super::Network;
use crate::processing::Consolidated;
use crate::sources::SourceData;
use chrono::SecondsFormat;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const REPORT_COMMENT: &str =
    "Converted the Spamhaus DROP lists into a consolidated list of IP ranges using the RIPEstat API.";

/// Numeric counts describing a run; a degraded run shows up here.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Summary {
    pub asn_drop_entries: usize,
    pub asn_prefixes_unique: usize,
    pub drop_v4_entries: usize,
    pub drop_v6_entries: usize,
    pub unique_v4_ranges: usize,
    pub unique_v6_ranges: usize,
    pub consolidated_v4_ranges: usize,
    pub consolidated_v6_ranges: usize,
    pub invalid_entries: usize,
    pub failed_sources: Vec<String>,
    pub failed_asn_lookups: Vec<String>,
}

/// The output document written as a one-element JSON array.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DropReport {
    pub comment: String,
    pub timestamp: String,
    #[serde(rename = "ASN-DROP")]
    pub asn_drop: String,
    #[serde(rename = "DROP v4")]
    pub drop_v4: String,
    #[serde(rename = "DROP v6")]
    pub drop_v6: String,
    #[serde(rename = "consolidated v4")]
    pub consolidated_v4: String,
    #[serde(rename = "consolidated v6")]
    pub consolidated_v6: String,
    pub summary: Summary,
    pub v4: Vec<Network>,
    pub v6: Vec<Network>,
}

impl DropReport {
    pub fn new(sources: &SourceData, consolidated: Consolidated, timestamp: String) -> DropReport {
        let summary = Summary {
            asn_drop_entries: sources.asn_drop.len(),
            asn_prefixes_unique: sources.asn_prefixes.len(),
            drop_v4_entries: sources.drop_v4.len(),
            drop_v6_entries: sources.drop_v6.len(),
            unique_v4_ranges: consolidated.unique_v4,
            unique_v6_ranges: consolidated.unique_v6,
            consolidated_v4_ranges: consolidated.v4.len(),
            consolidated_v6_ranges: consolidated.v6.len(),
            invalid_entries: consolidated.rejected.len(),
            failed_sources: sources.failed_sources.clone(),
            failed_asn_lookups: sources.failed_asn_lookups.clone(),
        };

        DropReport {
            comment: REPORT_COMMENT.to_string(),
            timestamp,
            asn_drop: format!(
                "{} entries, converted to {} unique IP ranges",
                summary.asn_drop_entries, summary.asn_prefixes_unique
            ),
            drop_v4: format!("{} entries", summary.drop_v4_entries),
            drop_v6: format!("{} entries", summary.drop_v6_entries),
            consolidated_v4: format!("{} IPv4 ranges", summary.consolidated_v4_ranges),
            consolidated_v6: format!("{} IPv6 ranges", summary.consolidated_v6_ranges),
            summary,
            v4: consolidated.v4,
            v6: consolidated.v6,
        }
    }

    /// True when any source, lookup or entry was dropped along the way.
    pub fn is_degraded(&self) -> bool {
        !self.summary.failed_sources.is_empty()
            || !self.summary.failed_asn_lookups.is_empty()
            || self.summary.invalid_entries > 0
    }
}

/// Current time as ISO-8601 with offset, seconds precision.
pub fn get_current_timestamp(tz: Option<Tz>) -> String {
    match tz {
        Some(tz) => chrono::Utc::now()
            .with_timezone(&tz)
            .to_rfc3339_opts(SecondsFormat::Secs, false),
        None => chrono::Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
    }
}

/// Current date as `YYYY-MM-DD`.
pub fn current_date(tz: Option<Tz>) -> String {
    match tz {
        Some(tz) => chrono::Utc::now().with_timezone(&tz).format("%Y-%m-%d").to_string(),
        None => chrono::Local::now().format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::consolidate;

    fn sample_report() -> DropReport {
        let sources = SourceData {
            drop_v4: vec!["192.0.2.0/25".to_string(), "192.0.2.128/25".to_string()],
            drop_v6: vec!["2001:db8::/32".to_string()],
            asn_drop: vec!["64496".to_string(), "64511".to_string()],
            asn_prefixes: vec!["not-an-ip".to_string()],
            failed_sources: vec![],
            failed_asn_lookups: vec!["64511".to_string()],
        };
        let consolidated = consolidate(sources.tokens());
        DropReport::new(&sources, consolidated, "2026-01-01T00:00:00+00:00".to_string())
    }

    #[test]
    fn test_report_counts() {
        let report = sample_report();
        assert_eq!(report.asn_drop, "2 entries, converted to 1 unique IP ranges");
        assert_eq!(report.drop_v4, "2 entries");
        assert_eq!(report.drop_v6, "1 entries");
        assert_eq!(report.consolidated_v4, "1 IPv4 ranges");
        assert_eq!(report.consolidated_v6, "1 IPv6 ranges");
        assert_eq!(report.summary.unique_v4_ranges, 2);
        assert_eq!(report.summary.invalid_entries, 1);
        assert!(report.is_degraded());
    }

    #[test]
    fn test_report_json_keys() {
        let value = serde_json::to_value(sample_report()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "comment",
            "timestamp",
            "ASN-DROP",
            "DROP v4",
            "DROP v6",
            "consolidated v4",
            "consolidated v6",
            "summary",
            "v4",
            "v6",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(value["v4"][0], "192.0.2.0/24");
        assert_eq!(value["v6"][0], "2001:db8::/32");
        assert_eq!(value["summary"]["failed_asn_lookups"][0], "64511");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = get_current_timestamp(Some(chrono_tz::UTC));
        assert!(ts.ends_with("+00:00"), "{ts}");
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&get_current_timestamp(None)).is_ok());
        assert_eq!(current_date(Some(chrono_tz::UTC)).len(), 10);
    }
}
