//! Address token parsing.
//!
//! Turns textual `addr/len` or bare address tokens into canonical [`Network`]
//! values. A bad token yields a [`ParseError`] and never stops a batch.

use crate::models::{Family, Network};
use itertools::{Either, Itertools};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;

/// Why a token was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("malformed syntax")]
    Malformed,
    #[error("prefix length out of range")]
    PrefixOutOfRange,
    #[error("not an IP literal")]
    NotAnIpLiteral,
    #[error("address family mismatch")]
    FamilyMismatch,
}

/// A token that could not be turned into a [`Network`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{token}': {reason}")]
pub struct ParseError {
    pub token: String,
    pub reason: ParseErrorKind,
}

impl ParseError {
    fn new(token: &str, reason: ParseErrorKind) -> ParseError {
        ParseError {
            token: token.to_string(),
            reason,
        }
    }
}

/// Parse a single address or CIDR token.
///
/// A bare address becomes a host route; host bits below the prefix are cleared.
/// When `family_hint` is given, a token of the other family is rejected.
///
/// # Examples
/// ```
/// use drop_cidr_summary::processing::parse;
/// assert_eq!(parse("192.0.2.77/24", None).unwrap().to_string(), "192.0.2.0/24");
/// assert_eq!(parse("203.0.113.5", None).unwrap().to_string(), "203.0.113.5/32");
/// ```
pub fn parse(token: &str, family_hint: Option<Family>) -> Result<Network, ParseError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new(token, ParseErrorKind::Malformed));
    }

    let (addr_part, len_part) = match trimmed.split_once('/') {
        Some((addr, len)) => (addr, Some(len)),
        None => (trimmed, None),
    };

    let ip = parse_ip(addr_part).ok_or_else(|| ParseError::new(token, ParseErrorKind::NotAnIpLiteral))?;
    let family = match ip {
        IpAddr::V4(_) => Family::V4,
        IpAddr::V6(_) => Family::V6,
    };
    if let Some(hint) = family_hint {
        if hint != family {
            return Err(ParseError::new(token, ParseErrorKind::FamilyMismatch));
        }
    }

    let len = match len_part {
        None => family.width(),
        Some(len) => parse_prefix_len(len, family).map_err(|reason| ParseError::new(token, reason))?,
    };

    Network::from_ip(ip, len).map_err(|_| ParseError::new(token, ParseErrorKind::PrefixOutOfRange))
}

/// Family is decided by syntax: a colon means IPv6, a dotted quad means IPv4.
fn parse_ip(addr: &str) -> Option<IpAddr> {
    if addr.contains(':') {
        addr.parse::<Ipv6Addr>().ok().map(IpAddr::V6)
    } else if addr.contains('.') {
        addr.parse::<Ipv4Addr>().ok().map(IpAddr::V4)
    } else {
        None
    }
}

fn parse_prefix_len(len: &str, family: Family) -> Result<u8, ParseErrorKind> {
    if family == Family::V4 && len.contains('.') {
        return parse_netmask(len);
    }
    if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::Malformed);
    }
    // All digits, so a failed parse can only mean the value is huge.
    let len: u32 = len.parse().map_err(|_| ParseErrorKind::PrefixOutOfRange)?;
    if len > family.width() as u32 {
        return Err(ParseErrorKind::PrefixOutOfRange);
    }
    Ok(len as u8)
}

/// Dotted netmask such as `255.255.255.0`; the ones must be contiguous.
fn parse_netmask(mask: &str) -> Result<u8, ParseErrorKind> {
    let mask: Ipv4Addr = mask.parse().map_err(|_| ParseErrorKind::Malformed)?;
    let bits = u32::from(mask);
    let len = bits.leading_ones();
    if bits.checked_shl(len).unwrap_or(0) != 0 {
        return Err(ParseErrorKind::Malformed);
    }
    Ok(len as u8)
}

/// Result of parsing a batch of tokens.
#[derive(Debug, Default)]
pub struct ParseReport {
    pub v4: Vec<Network>,
    pub v6: Vec<Network>,
    pub rejected: Vec<ParseError>,
}

/// Parse every token, partitioning valid networks by family and collecting rejects.
pub fn parse_batch<I, S>(tokens: I, family_hint: Option<Family>) -> ParseReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (networks, rejected): (Vec<Network>, Vec<ParseError>) = tokens
        .into_iter()
        .map(|t| parse(t.as_ref(), family_hint))
        .partition_map(|r| match r {
            Ok(net) => Either::Left(net),
            Err(e) => Either::Right(e),
        });

    for e in &rejected {
        log::warn!("Skipping invalid IP address or CIDR {e}");
    }

    let (v4, v6): (Vec<Network>, Vec<Network>) = networks
        .into_iter()
        .partition(|net| net.family() == Family::V4);

    log::debug!(
        "parse_batch: v4={} v6={} rejected={}",
        v4.len(),
        v6.len(),
        rejected.len()
    );

    ParseReport { v4, v6, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(token: &str) -> ParseErrorKind {
        parse(token, None).unwrap_err().reason
    }

    #[test]
    fn test_parse_cidr_v4() {
        let net = parse("192.0.2.0/24", None).unwrap();
        assert_eq!(net.family(), Family::V4);
        assert_eq!(net.prefix_len(), 24);
        assert_eq!(net.to_string(), "192.0.2.0/24");
    }

    #[test]
    fn test_parse_bare_host() {
        assert_eq!(parse("203.0.113.5", None).unwrap().to_string(), "203.0.113.5/32");
        assert_eq!(parse("2001:db8::1", None).unwrap().to_string(), "2001:db8::1/128");
    }

    #[test]
    fn test_parse_clears_host_bits() {
        assert_eq!(parse("10.1.2.3/8", None).unwrap().to_string(), "10.0.0.0/8");
        assert_eq!(
            parse("2001:db8:ffff::1/32", None).unwrap().to_string(),
            "2001:db8::/32"
        );
        assert_eq!(parse("1.2.3.4/0", None).unwrap().to_string(), "0.0.0.0/0");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse("  198.51.100.0/24\n", None).unwrap().to_string(), "198.51.100.0/24");
    }

    #[test]
    fn test_parse_netmask() {
        assert_eq!(
            parse("192.0.2.0/255.255.255.0", None).unwrap().to_string(),
            "192.0.2.0/24"
        );
        assert_eq!(reason("192.0.2.0/255.0.255.0"), ParseErrorKind::Malformed);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(reason("not-an-ip"), ParseErrorKind::NotAnIpLiteral);
        assert_eq!(reason("300.1.1.1/8"), ParseErrorKind::NotAnIpLiteral);
        assert_eq!(reason("12345"), ParseErrorKind::NotAnIpLiteral);
        assert_eq!(reason(""), ParseErrorKind::Malformed);
        assert_eq!(reason("10.0.0.0/"), ParseErrorKind::Malformed);
        assert_eq!(reason("10.0.0.0/8/8"), ParseErrorKind::Malformed);
        assert_eq!(reason("10.0.0.0/-1"), ParseErrorKind::Malformed);
        assert_eq!(reason("10.0.0.0/33"), ParseErrorKind::PrefixOutOfRange);
        assert_eq!(reason("10.0.0.0/99999999999"), ParseErrorKind::PrefixOutOfRange);
        assert_eq!(reason("::/129"), ParseErrorKind::PrefixOutOfRange);
        assert!(parse("::/128", None).is_ok());
    }

    #[test]
    fn test_parse_family_hint() {
        assert!(parse("10.0.0.0/8", Some(Family::V4)).is_ok());
        assert_eq!(
            parse("10.0.0.0/8", Some(Family::V6)).unwrap_err().reason,
            ParseErrorKind::FamilyMismatch
        );
    }

    #[test]
    fn test_parse_error_display() {
        let e = parse("not-an-ip", None).unwrap_err();
        assert_eq!(e.to_string(), "'not-an-ip': not an IP literal");
    }

    #[test]
    fn test_parse_batch_skips_bad_tokens() {
        let report = parse_batch(
            vec!["192.0.2.0/25", "not-an-ip", "2001:db8::/32", "192.0.2.128/25"],
            None,
        );
        assert_eq!(report.v4.len(), 2);
        assert_eq!(report.v6.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].token, "not-an-ip");
    }
}
