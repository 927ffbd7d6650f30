//! Runtime configuration.
//!
//! Values are read from the environment (optionally via a `.env` file loaded in
//! `main`) with defaults matching the public Spamhaus and RIPEstat endpoints.

use chrono_tz::Tz;
use std::error::Error;

pub const DEFAULT_DROP_V4_URL: &str = "https://www.spamhaus.org/drop/drop_v4.json";
pub const DEFAULT_DROP_V6_URL: &str = "https://www.spamhaus.org/drop/drop_v6.json";
pub const DEFAULT_ASN_DROP_URL: &str = "https://www.spamhaus.org/drop/asndrop.json";
pub const DEFAULT_RIPESTAT_URL: &str =
    "https://stat.ripe.net/data/announced-prefixes/data.json?resource=AS{asn}";
pub const DEFAULT_OUTPUT_FILE: &str = "spamhaus_ripe.json";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Pause before each ASN lookup request, in milliseconds.
pub const DEFAULT_SLEEP_MSEC: u64 = 0;

/// Placeholder in the RIPEstat URL replaced by the ASN number.
pub const ASN_PLACEHOLDER: &str = "{asn}";

#[derive(Debug, Clone)]
pub struct Config {
    pub drop_v4_url: String,
    pub drop_v6_url: String,
    pub asn_drop_url: String,
    /// RIPEstat announced-prefixes URL template containing `{asn}`.
    pub ripestat_url: String,
    pub output_file: String,
    /// Use the snapshot cache instead of always fetching.
    pub cache: bool,
    /// Explicit cache snapshot path; `None` means a dated default name.
    pub cache_file: Option<String>,
    /// Concurrent ASN lookups.
    pub concurrency: usize,
    pub timeout_secs: u64,
    /// Pause before each ASN lookup request; with `concurrency` > 1 the pauses overlap.
    pub sleep_msec: u64,
    /// Timezone for timestamps and cache file names; `None` is local time.
    pub timezone: Option<Tz>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            drop_v4_url: DEFAULT_DROP_V4_URL.to_string(),
            drop_v6_url: DEFAULT_DROP_V6_URL.to_string(),
            asn_drop_url: DEFAULT_ASN_DROP_URL.to_string(),
            ripestat_url: DEFAULT_RIPESTAT_URL.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            cache: false,
            cache_file: None,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sleep_msec: DEFAULT_SLEEP_MSEC,
            timezone: None,
        }
    }
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Config, Box<dyn Error>> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, Box<dyn Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("DROP_V4_URL") {
            config.drop_v4_url = v;
        }
        if let Some(v) = get("DROP_V6_URL") {
            config.drop_v6_url = v;
        }
        if let Some(v) = get("ASN_DROP_URL") {
            config.asn_drop_url = v;
        }
        if let Some(v) = get("RIPESTAT_URL") {
            config.ripestat_url = v;
        }
        if let Some(v) = get("DROP_OUTPUT_FILE") {
            config.output_file = v;
        }
        if let Some(v) = get("DROP_CACHE") {
            config.cache = parse_bool("DROP_CACHE", &v)?;
        }
        if let Some(v) = get("DROP_CACHE_FILE") {
            config.cache = true;
            config.cache_file = Some(v);
        }
        if let Some(v) = get("DROP_CONCURRENCY") {
            config.concurrency = v
                .parse()
                .map_err(|e| format!("Invalid DROP_CONCURRENCY '{v}': {e}"))?;
        }
        if let Some(v) = get("DROP_TIMEOUT_SECS") {
            config.timeout_secs = v
                .parse()
                .map_err(|e| format!("Invalid DROP_TIMEOUT_SECS '{v}': {e}"))?;
        }
        if let Some(v) = get("DROP_SLEEP_MSEC") {
            config.sleep_msec = v
                .parse()
                .map_err(|e| format!("Invalid DROP_SLEEP_MSEC '{v}': {e}"))?;
        }
        if let Some(v) = get("DROP_TIMEZONE") {
            let tz: Tz = v
                .parse()
                .map_err(|e| format!("Invalid DROP_TIMEZONE '{v}': {e}"))?;
            config.timezone = Some(tz);
        }

        config.validate()?;
        log::debug!("Config: {config:?}");
        Ok(config)
    }

    fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !self.ripestat_url.contains(ASN_PLACEHOLDER) {
            return Err(format!(
                "RIPESTAT_URL must contain {ASN_PLACEHOLDER}: {}",
                self.ripestat_url
            )
            .into());
        }
        if self.concurrency == 0 {
            return Err("DROP_CONCURRENCY must be at least 1".into());
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Box<dyn Error>> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("Invalid {key} '{value}': expected true/false").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, Box<dyn Error>> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.drop_v4_url, DEFAULT_DROP_V4_URL);
        assert_eq!(config.output_file, "spamhaus_ripe.json");
        assert!(!config.cache);
        assert!(config.cache_file.is_none());
        assert_eq!(config.concurrency, 8);
        assert!(config.timezone.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DROP_V4_URL", "http://localhost/v4.json"),
            ("DROP_CACHE_FILE", "cache.json"),
            ("DROP_CONCURRENCY", "2"),
            ("DROP_TIMEZONE", "Pacific/Auckland"),
            ("DROP_SLEEP_MSEC", " 50 "),
        ])
        .unwrap();
        assert_eq!(config.drop_v4_url, "http://localhost/v4.json");
        assert!(config.cache);
        assert_eq!(config.cache_file.as_deref(), Some("cache.json"));
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.sleep_msec, 50);
        assert_eq!(config.timezone, Some(chrono_tz::Pacific::Auckland));
    }

    #[test]
    fn test_cache_flag() {
        assert!(config_from(&[("DROP_CACHE", "true")]).unwrap().cache);
        assert!(!config_from(&[("DROP_CACHE", "0")]).unwrap().cache);
        assert!(config_from(&[("DROP_CACHE", "maybe")]).is_err());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("DROP_CONCURRENCY", "many")]).is_err());
        assert!(config_from(&[("DROP_CONCURRENCY", "0")]).is_err());
        assert!(config_from(&[("DROP_TIMEZONE", "Mars/Olympus")]).is_err());
        assert!(config_from(&[("RIPESTAT_URL", "https://stat.ripe.net/no-placeholder")]).is_err());
    }
}
