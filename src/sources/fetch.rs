//! HTTP retrieval of all prefix sources.

use super::ripestat::fetch_asn_prefixes;
use super::spamhaus::fetch_drop_list;
use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use thiserror::Error;

/// A remote source could not be read.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("not an ASN: '{0}'")]
    InvalidAsn(String),
}

/// Raw tokens collected from every source, plus the sources that failed.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct SourceData {
    /// CIDR tokens from the DROP v4 list.
    pub drop_v4: Vec<String>,
    /// CIDR tokens from the DROP v6 list.
    pub drop_v6: Vec<String>,
    /// ASN tokens from the ASN-DROP list.
    pub asn_drop: Vec<String>,
    /// Unique prefixes announced by the ASN-DROP networks, sorted.
    pub asn_prefixes: Vec<String>,
    /// Labels of lists that could not be fetched.
    #[serde(default)]
    pub failed_sources: Vec<String>,
    /// ASN tokens whose prefix lookup failed.
    #[serde(default)]
    pub failed_asn_lookups: Vec<String>,
}

impl SourceData {
    /// All prefix tokens to consolidate.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.asn_prefixes
            .iter()
            .chain(self.drop_v4.iter())
            .chain(self.drop_v6.iter())
            .map(|s| s.as_str())
    }
}

/// Build the shared HTTP client.
pub fn build_client(config: &Config) -> Result<reqwest::Client, Box<dyn Error>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| format!("Error building HTTP client: {e}"))?;
    Ok(client)
}

/// GET a URL and return the body, treating non-2xx as an error.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    log::debug!("GET {url}");
    let response = client.get(url).send().await.map_err(|source| FetchError::Http {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| FetchError::Http {
        url: url.to_string(),
        source,
    })?;
    log::trace!("GET {url} => {} bytes", body.len());
    Ok(body)
}

/// Fetch the three DROP lists concurrently, then resolve the ASN-DROP entries.
///
/// A failed list contributes no entries and is recorded in
/// [`SourceData::failed_sources`]; the run carries on.
pub async fn fetch_all(config: &Config) -> Result<SourceData, Box<dyn Error>> {
    let client = build_client(config)?;

    let (drop_v4, drop_v6, asn_drop) = futures::join!(
        fetch_drop_list(&client, &config.drop_v4_url),
        fetch_drop_list(&client, &config.drop_v6_url),
        fetch_drop_list(&client, &config.asn_drop_url),
    );

    let mut data = SourceData::default();
    data.drop_v4 = entries_or_record("DROP v4", drop_v4, &mut data.failed_sources);
    data.drop_v6 = entries_or_record("DROP v6", drop_v6, &mut data.failed_sources);
    data.asn_drop = entries_or_record("ASN-DROP", asn_drop, &mut data.failed_sources);

    log::info!("Spamhaus DROP v4: {} entries", data.drop_v4.len());
    log::info!("Spamhaus DROP v6: {} entries", data.drop_v6.len());
    log::info!("Spamhaus ASN-DROP: {} entries", data.asn_drop.len());

    let lookup = fetch_asn_prefixes(&client, config, &data.asn_drop).await;
    data.asn_prefixes = lookup.prefixes.into_iter().collect();
    data.failed_asn_lookups = lookup.failed;
    log::info!("Fetched {} unique IP ranges", data.asn_prefixes.len());

    Ok(data)
}

fn entries_or_record(
    label: &str,
    result: Result<Vec<String>, FetchError>,
    failed: &mut Vec<String>,
) -> Vec<String> {
    match result {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Failed to retrieve {label} list: {e}");
            failed.push(label.to_string());
            Vec::new()
        }
    }
}
