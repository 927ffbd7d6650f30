//! Remote prefix sources.
//!
//! This module handles everything outside the consolidation core:
//! - [`spamhaus`] - Spamhaus DROP list retrieval
//! - [`ripestat`] - ASN to prefix resolution
//! - [`fetch`] - HTTP client and source collection
//! - [`cache`] - Snapshot caching of fetched data

mod cache;
mod fetch;
mod ripestat;
mod spamhaus;

// Re-export public types and functions
pub use cache::{cache_if_complete, load_sources, parse_source_cache, read_source_cache, write_source_cache};
pub use fetch::{build_client, fetch_all, fetch_text, FetchError, SourceData};
pub use ripestat::{asn_url, fetch_asn_prefixes, normalize_asn, parse_announced_prefixes, AsnLookup};
pub use spamhaus::{fetch_drop_list, parse_drop_lines};
