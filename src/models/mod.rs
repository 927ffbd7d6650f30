//! Domain models for the DROP CIDR summary.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Network`] - IPv4/IPv6 CIDR block with canonical base address
//! - [`DropReport`] and [`Summary`] - The output document

mod network;
mod report;

// Re-export public types
pub use network::{
    cut_addr, get_cidr_mask, host_bits, lo_mask, Family, Network, MAX_LENGTH_V4, MAX_LENGTH_V6,
};
pub use report::{current_date, get_current_timestamp, DropReport, Summary, REPORT_COMMENT};
