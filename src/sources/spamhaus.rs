//! Spamhaus DROP list retrieval.
//!
//! The lists are newline-delimited JSON: one object per line with a `cidr`
//! (DROP v4/v6) or `asn` (ASN-DROP) field, ending with a metadata record.

use super::fetch::{fetch_text, FetchError};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum AsnValue {
    Number(u64),
    Text(String),
}

#[derive(Deserialize, Debug)]
struct DropEntry {
    asn: Option<AsnValue>,
    cidr: Option<String>,
}

impl DropEntry {
    /// The entry's value, `asn` taking precedence over `cidr`.
    fn value(self) -> Option<String> {
        match (self.asn, self.cidr) {
            (Some(AsnValue::Number(n)), _) => Some(n.to_string()),
            (Some(AsnValue::Text(s)), _) => Some(s),
            (None, cidr) => cidr,
        }
    }
}

/// Extract entry values from a DROP list body.
///
/// Blank lines and records without `asn`/`cidr` are skipped; lines that are not
/// JSON objects are logged and skipped.
pub fn parse_drop_lines(text: &str) -> Vec<String> {
    let mut entries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<DropEntry>(line) {
            Ok(entry) => match entry.value() {
                Some(value) => entries.push(value),
                None => log::debug!("line {}: no asn/cidr, skipping {line}", i + 1),
            },
            Err(e) => log::warn!("line {}: invalid JSON entry skipped: {e}", i + 1),
        }
    }
    entries
}

/// Fetch a DROP list and return its entries.
pub async fn fetch_drop_list(client: &reqwest::Client, url: &str) -> Result<Vec<String>, FetchError> {
    let text = fetch_text(client, url).await?;
    let entries = parse_drop_lines(&text);
    log::debug!("{url}: {} entries", entries.len());
    Ok(entries)
}
