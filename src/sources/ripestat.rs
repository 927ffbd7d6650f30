//! ASN to announced-prefix resolution through the RIPEstat data API.

use super::fetch::{fetch_text, FetchError};
use crate::config::{Config, ASN_PLACEHOLDER};
use futures::stream::{self, StreamExt};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::sync::OnceLock;
use std::time::Duration;

/// Accepts `64496`, `AS64496` and `as64496`.
static ASN_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_asn_regex() -> &'static Regex {
    ASN_REGEX.get_or_init(|| Regex::new(r"^(?i:AS)?(\d{1,10})$").expect("Invalid Regex"))
}

#[derive(Deserialize, Debug, Default)]
struct AnnouncedPrefixes {
    #[serde(default)]
    data: Option<PrefixData>,
}

#[derive(Deserialize, Debug, Default)]
struct PrefixData {
    #[serde(default)]
    prefixes: Vec<PrefixEntry>,
}

#[derive(Deserialize, Debug)]
struct PrefixEntry {
    prefix: String,
}

/// Prefixes resolved from a list of ASNs.
#[derive(Debug, Default)]
pub struct AsnLookup {
    /// Unique announced prefixes across all ASNs.
    pub prefixes: BTreeSet<String>,
    /// ASN tokens whose lookup failed, sorted.
    pub failed: Vec<String>,
}

/// Normalize an ASN token to its number.
pub fn normalize_asn(token: &str) -> Option<u32> {
    get_asn_regex()
        .captures(token.trim())
        .and_then(|caps| caps[1].parse().ok())
}

/// Fill the `{asn}` placeholder of the RIPEstat URL template.
pub fn asn_url(template: &str, asn: u32) -> String {
    template.replace(ASN_PLACEHOLDER, &asn.to_string())
}

/// Extract the prefix strings from an announced-prefixes response body.
///
/// A response without `data` or `prefixes` has no prefixes.
pub fn parse_announced_prefixes(json: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let parsed: AnnouncedPrefixes = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| format!("Error parsing RIPEstat JSON: path={} error={}", e.path(), e))?;

    Ok(parsed
        .data
        .unwrap_or_default()
        .prefixes
        .into_iter()
        .map(|p| p.prefix)
        .collect())
}

async fn lookup_asn(
    client: &reqwest::Client,
    config: &Config,
    token: &str,
) -> Result<Vec<String>, FetchError> {
    let asn = normalize_asn(token).ok_or_else(|| FetchError::InvalidAsn(token.to_string()))?;
    let url = asn_url(&config.ripestat_url, asn);

    if config.sleep_msec > 0 {
        tokio::time::sleep(Duration::from_millis(config.sleep_msec)).await;
    }

    let body = fetch_text(client, &url).await?;
    let prefixes = parse_announced_prefixes(&body).map_err(|e| FetchError::Decode {
        url: url.clone(),
        message: e.to_string(),
    })?;
    log::debug!("AS{asn}: {} prefixes", prefixes.len());
    Ok(prefixes)
}

/// Resolve every ASN to its announced prefixes, `config.concurrency` requests at a time.
///
/// Failed lookups are logged and recorded; they never stop the remaining lookups.
pub async fn fetch_asn_prefixes(
    client: &reqwest::Client,
    config: &Config,
    asns: &[String],
) -> AsnLookup {
    let results: Vec<(&String, Result<Vec<String>, FetchError>)> = stream::iter(asns)
        .map(|token| async move { (token, lookup_asn(client, config, token).await) })
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    let mut lookup = AsnLookup::default();
    for (token, result) in results {
        match result {
            Ok(prefixes) => lookup.prefixes.extend(prefixes),
            Err(e) => {
                log::warn!("Failed to retrieve IP ranges for ASN {token}: {e}");
                lookup.failed.push(token.clone());
            }
        }
    }
    lookup.failed.sort();

    log::info!(
        "Resolved {} ASNs to {} unique prefixes ({} failed)",
        asns.len(),
        lookup.prefixes.len(),
        lookup.failed.len()
    );
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_asn() {
        assert_eq!(normalize_asn("64496"), Some(64496));
        assert_eq!(normalize_asn("AS64496"), Some(64496));
        assert_eq!(normalize_asn("as64496 "), Some(64496));
        assert_eq!(normalize_asn("AS"), None);
        assert_eq!(normalize_asn("ASN64496"), None);
        assert_eq!(normalize_asn("None"), None);
        assert_eq!(normalize_asn("9999999999"), None);
    }

    #[test]
    fn test_asn_url() {
        assert_eq!(
            asn_url(crate::config::DEFAULT_RIPESTAT_URL, 64496),
            "https://stat.ripe.net/data/announced-prefixes/data.json?resource=AS64496"
        );
    }

    #[test]
    fn test_parse_announced_prefixes() {
        let json = r#"{
            "status": "ok",
            "data": {
                "prefixes": [
                    {"prefix": "192.0.2.0/24", "timelines": [{"starttime": "2024-01-01T00:00:00"}]},
                    {"prefix": "2001:db8::/32", "timelines": []}
                ],
                "resource": "64496"
            }
        }"#;
        assert_eq!(
            parse_announced_prefixes(json).unwrap(),
            vec!["192.0.2.0/24", "2001:db8::/32"]
        );
    }

    #[test]
    fn test_parse_announced_prefixes_missing_data() {
        assert!(parse_announced_prefixes(r#"{"status": "ok"}"#).unwrap().is_empty());
        assert!(parse_announced_prefixes(r#"{"data": {}}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_announced_prefixes_reports_path() {
        let err = parse_announced_prefixes(r#"{"data": {"prefixes": [{"prefix": 5}]}}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("data.prefixes[0].prefix"), "{err}");
    }

    #[tokio::test]
    async fn test_invalid_asn_is_recorded_not_fatal() {
        let config = Config::default();
        let client = reqwest::Client::new();
        let asns = vec!["not-an-asn".to_string(), "AS".to_string()];
        let lookup = fetch_asn_prefixes(&client, &config, &asns).await;
        assert!(lookup.prefixes.is_empty());
        assert_eq!(lookup.failed, vec!["AS", "not-an-asn"]);
    }

    #[tokio::test]
    async fn test_sleep_before_each_lookup_request() {
        let config = Config {
            ripestat_url: "http://127.0.0.1:9/announced?resource=AS{asn}".to_string(),
            concurrency: 1,
            timeout_secs: 2,
            sleep_msec: 100,
            ..Default::default()
        };
        let client = reqwest::Client::new();
        let asns = vec!["AS64496".to_string(), "AS64497".to_string()];
        let started = std::time::Instant::now();
        let lookup = fetch_asn_prefixes(&client, &config, &asns).await;
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert_eq!(lookup.failed, vec!["AS64496", "AS64497"]);
    }
}
