//! Cache management for fetched source data.
//!
//! Provides a snapshot cache to avoid repeated Spamhaus and RIPEstat calls.

use super::fetch::{fetch_all, SourceData};
use crate::config::Config;
use crate::models::current_date;
use std::error::Error;
use std::path::Path;

/// Read source data from a cache file, or fetch it if the cache doesn't exist.
///
/// # Arguments
/// * `cache_file` - Optional path to a specific cache file. If None, uses a dated default name.
/// * `config` - Source URLs and timezone, used when fetching.
///
/// # Returns
/// * `Ok(SourceData)` - The source data from cache or the remote sources
/// * `Err` - If the cache file was specified but doesn't exist, or can't be parsed or written
pub async fn read_source_cache(
    cache_file: Option<&str>,
    config: &Config,
) -> Result<SourceData, Box<dyn Error>> {
    let cache_file = match cache_file {
        Some(file) => {
            if !Path::new(file).exists() {
                return Err(format!("Cache file does not exist: {file}").into());
            }
            log::info!("Using provided cache file: {file}");
            file.to_string()
        }
        None => format!("drop_cache_{}.json", current_date(config.timezone)),
    };

    let data = match std::fs::read_to_string(&cache_file) {
        Ok(json) => {
            log::info!("Reading from cache file: {cache_file}");
            parse_source_cache(&json)?
        }
        Err(_) => {
            log::warn!("Cache file not found: {cache_file}");
            let data = fetch_all(config).await?;
            cache_if_complete(&cache_file, &data)?;
            data
        }
    };

    Ok(data)
}

/// Parse a cache snapshot, reporting the JSON path of any error.
pub fn parse_source_cache(json: &str) -> Result<SourceData, Box<dyn Error>> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let data: SourceData = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| format!("Error parsing cache JSON: path={} error={}", e.path(), e))?;
    Ok(data)
}

/// Write a cache snapshot.
pub fn write_source_cache(cache_file: &str, data: &SourceData) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string(data).map_err(|e| format!("Error serializing JSON: {e}"))?;
    log::warn!("Writing data to cache file: {cache_file}");
    std::fs::write(cache_file, json)
        .map_err(|e| format!("Error writing cache file {cache_file}: {e}"))?;
    Ok(())
}

/// Write a cache snapshot only when every source and ASN lookup succeeded.
///
/// A partial fetch is not cached so the next run retries the failed sources.
/// Returns whether the snapshot was written.
pub fn cache_if_complete(cache_file: &str, data: &SourceData) -> Result<bool, Box<dyn Error>> {
    if !data.failed_sources.is_empty() || !data.failed_asn_lookups.is_empty() {
        log::warn!(
            "Not caching incomplete fetch to {cache_file}: failed sources {:?}, failed ASNs {}",
            data.failed_sources,
            data.failed_asn_lookups.len()
        );
        return Ok(false);
    }
    write_source_cache(cache_file, data)?;
    Ok(true)
}

/// Load source data through the cache when enabled, otherwise fetch it.
pub async fn load_sources(config: &Config) -> Result<SourceData, Box<dyn Error>> {
    if config.cache {
        read_source_cache(config.cache_file.as_deref(), config).await
    } else {
        fetch_all(config).await
    }
}
