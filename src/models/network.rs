//! IPv4/IPv6 network prefixes and CIDR bit arithmetic.
//!
//! Provides [`Network`] for representing a canonical CIDR block of either
//! address family, along with utility functions for mask calculations.
//! Addresses of both families are held as `u128`; IPv4 values use the low 32 bits.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Maximum prefix length for an IPv4 network (32 bits).
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum prefix length for an IPv6 network (128 bits).
pub const MAX_LENGTH_V6: u8 = 128;

/// Address family of a [`Network`].
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    #[serde(rename = "v4")]
    V4,
    #[serde(rename = "v6")]
    V6,
}

impl Family {
    /// Address width in bits.
    pub fn width(self) -> u8 {
        match self {
            Family::V4 => MAX_LENGTH_V4,
            Family::V6 => MAX_LENGTH_V6,
        }
    }

    /// Highest address value of the family.
    pub fn max_addr(self) -> u128 {
        host_bits(self.width())
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4"),
            Family::V6 => write!(f, "IPv6"),
        }
    }
}

/// Value with the lowest `bits` bits set.
///
/// # Examples
/// ```
/// use drop_cidr_summary::models::host_bits;
/// assert_eq!(host_bits(8), 0xFF);
/// assert_eq!(host_bits(128), u128::MAX);
/// ```
pub fn host_bits(bits: u8) -> u128 {
    if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

/// Convert a CIDR prefix length to a network mask for the given address width.
///
/// # Examples
/// ```
/// use drop_cidr_summary::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(32, 24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(width: u8, len: u8) -> Result<u128, Box<dyn Error>> {
    if len > width {
        Err("Network length is too long".into())
    } else {
        Ok(host_bits(width) & !host_bits(width - len))
    }
}

/// Get the network address for a given address and prefix length.
pub fn cut_addr(addr: u128, width: u8, len: u8) -> Result<u128, Box<dyn Error>> {
    Ok(addr & get_cidr_mask(width, len)?)
}

/// Calculate the minimum prefix length an address can start, based on trailing zeros.
pub fn lo_mask(addr: u128, width: u8) -> u8 {
    let trailing_zeros = (addr.trailing_zeros() as u8).min(width);
    width - trailing_zeros
}

/// A canonical CIDR block: host bits of `addr` are always zero.
#[derive(Eq, Ord, PartialEq, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Network {
    family: Family,
    addr: u128,
    len: u8,
}

impl Network {
    /// Create a network, clearing any host bits in `addr`.
    pub fn new(family: Family, addr: u128, len: u8) -> Result<Network, Box<dyn Error>> {
        let width = family.width();
        if addr > family.max_addr() {
            return Err(format!("Address {addr:#x} does not fit in {family}").into());
        }
        let addr = cut_addr(addr, width, len)?;
        Ok(Network { family, addr, len })
    }

    /// Build from values already known to be canonical.
    pub(crate) fn from_parts(family: Family, addr: u128, len: u8) -> Network {
        debug_assert!(len <= family.width());
        debug_assert_eq!(addr & host_bits(family.width() - len), 0);
        Network { family, addr, len }
    }

    /// Create a network from a `std::net` address and prefix length.
    pub fn from_ip(ip: IpAddr, len: u8) -> Result<Network, Box<dyn Error>> {
        match ip {
            IpAddr::V4(v4) => Network::new(Family::V4, u32::from(v4) as u128, len),
            IpAddr::V6(v6) => Network::new(Family::V6, u128::from(v6), len),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Base address with host bits zeroed.
    pub fn addr(&self) -> u128 {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    /// Highest address inside the block.
    pub fn last_addr(&self) -> u128 {
        self.addr | host_bits(self.family.width() - self.len)
    }

    /// Number of addresses in the block; `None` for `::/0`, which exceeds `u128`.
    pub fn size(&self) -> Option<u128> {
        1u128.checked_shl((self.family.width() - self.len) as u32)
    }

    /// True when `other` lies entirely inside this block.
    pub fn contains(&self, other: &Network) -> bool {
        self.family == other.family
            && self.addr <= other.addr
            && self.last_addr() >= other.last_addr()
    }

    /// Base address as a `std::net` value.
    pub fn ip(&self) -> IpAddr {
        match self.family {
            Family::V4 => IpAddr::V4(Ipv4Addr::from(self.addr as u32)),
            Family::V6 => IpAddr::V6(Ipv6Addr::from(self.addr)),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.ip(), self.len)
    }
}

impl FromStr for Network {
    type Err = crate::processing::ParseError;

    fn from_str(s: &str) -> Result<Network, Self::Err> {
        crate::processing::parse(s, None)
    }
}

impl Serialize for Network {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> Result<Network, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Network::from_str(&s).map_err(de::Error::custom)
    }
}
