// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IPv4 and IPv6 network prefixes and the CIDR parser that produces them.
//!
//! Prefixes are always stored in network form: host bits below the prefix
//! length are zero and the length never exceeds the address width.

use crate::error::PrefixError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// What to do with a CIDR whose address has bits set below the prefix
/// length, e.g. `10.0.0.5/24`.
#[derive(
    Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
pub enum HostBits {
    /// Zero the host bits and keep the network (`10.0.0.0/24`).
    #[default]
    Mask,
    /// Treat the CIDR as malformed.
    Reject,
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct Prefix4 {
    value: Ipv4Addr,
    length: u8,
}

impl PartialOrd for Prefix4 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Prefix4 {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.value != other.value {
            return self.value.cmp(&other.value);
        }
        self.length.cmp(&other.length)
    }
}

impl Prefix4 {
    pub const HOST_MASK: u8 = 32;

    /// Create a new `Prefix4` from an IP address and prefix length. Host bits
    /// are zeroed on creation.
    /// ```
    /// use bgp_speaker::prefix::Prefix4;
    /// use std::net::Ipv4Addr;
    /// let p4 = Prefix4::new(Ipv4Addr::new(10, 0, 0, 5), 24).unwrap();
    /// assert_eq!(p4.value(), Ipv4Addr::new(10, 0, 0, 0));
    /// ```
    pub fn new(ip: Ipv4Addr, length: u8) -> Result<Self, PrefixError> {
        if length > Self::HOST_MASK {
            return Err(PrefixError::InvalidPrefixLength(
                length,
                Self::HOST_MASK,
            ));
        }
        Ok(Self {
            value: Ipv4Addr::from_bits(ip.to_bits() & Self::mask(length)),
            length,
        })
    }

    pub fn value(&self) -> Ipv4Addr {
        self.value
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    fn mask(length: u8) -> u32 {
        match length {
            0 => 0,
            _ => (!0u32) << (Self::HOST_MASK - length),
        }
    }
}

impl fmt::Display for Prefix4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.length)
    }
}

#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct Prefix6 {
    value: Ipv6Addr,
    length: u8,
}

impl PartialOrd for Prefix6 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Prefix6 {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.value != other.value {
            return self.value.cmp(&other.value);
        }
        self.length.cmp(&other.length)
    }
}

impl Prefix6 {
    pub const HOST_MASK: u8 = 128;

    /// Create a new `Prefix6` from an IP address and prefix length. Host bits
    /// are zeroed on creation.
    pub fn new(ip: Ipv6Addr, length: u8) -> Result<Self, PrefixError> {
        if length > Self::HOST_MASK {
            return Err(PrefixError::InvalidPrefixLength(
                length,
                Self::HOST_MASK,
            ));
        }
        Ok(Self {
            value: Ipv6Addr::from_bits(ip.to_bits() & Self::mask(length)),
            length,
        })
    }

    pub fn value(&self) -> Ipv6Addr {
        self.value
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    fn mask(length: u8) -> u128 {
        match length {
            0 => 0,
            _ => (!0u128) << (Self::HOST_MASK - length),
        }
    }
}

impl fmt::Display for Prefix6 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.length)
    }
}

#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Prefix {
    V4(Prefix4),
    V6(Prefix6),
}

impl Prefix {
    pub fn addr(&self) -> IpAddr {
        match self {
            Prefix::V4(p) => p.value.into(),
            Prefix::V6(p) => p.value.into(),
        }
    }

    pub fn length(&self) -> u8 {
        match self {
            Prefix::V4(p) => p.length,
            Prefix::V6(p) => p.length,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::V4(p) => p.fmt(f),
            Prefix::V6(p) => p.fmt(f),
        }
    }
}

impl From<Prefix4> for Prefix {
    fn from(value: Prefix4) -> Self {
        Self::V4(value)
    }
}

impl From<Prefix6> for Prefix {
    fn from(value: Prefix6) -> Self {
        Self::V6(value)
    }
}

impl FromStr for Prefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cidr(s, HostBits::Mask)
    }
}

/// Parse an `address/length` CIDR string into a network prefix.
///
/// Surrounding whitespace is ignored. The length must be plain decimal
/// digits. Addresses containing `:` are parsed as IPv6.
pub fn parse_cidr(s: &str, host_bits: HostBits) -> Result<Prefix, PrefixError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(PrefixError::Empty);
    }
    let (value, length) = s.split_once('/').ok_or(PrefixError::MissingLength)?;

    if length.is_empty() || !length.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PrefixError::MalformedLength);
    }
    let length: u8 =
        length.parse().map_err(|_| PrefixError::MalformedLength)?;

    let prefix: Prefix = if value.contains(':') {
        let addr: Ipv6Addr =
            value.parse().map_err(|_| PrefixError::MalformedAddr)?;
        Prefix6::new(addr, length)?.into()
    } else {
        let addr: Ipv4Addr =
            value.parse().map_err(|_| PrefixError::MalformedAddr)?;
        Prefix4::new(addr, length)?.into()
    };

    if host_bits == HostBits::Reject
        && value.parse::<IpAddr>().ok() != Some(prefix.addr())
    {
        return Err(PrefixError::HostBitsSet);
    }

    Ok(prefix)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_v4_and_v6() {
        let p = parse_cidr("10.0.1.0/24", HostBits::Mask).unwrap();
        assert_eq!(
            p,
            Prefix::V4(Prefix4::new(Ipv4Addr::new(10, 0, 1, 0), 24).unwrap())
        );
        assert_eq!(p.to_string(), "10.0.1.0/24");

        let p = parse_cidr("fd00:1122::/64", HostBits::Mask).unwrap();
        assert_eq!(p.length(), 64);
        assert_eq!(p.to_string(), "fd00:1122::/64");
    }

    #[test]
    fn host_bits_policy() {
        let masked = parse_cidr("10.0.0.5/24", HostBits::Mask).unwrap();
        assert_eq!(masked.to_string(), "10.0.0.0/24");
        assert_eq!(
            parse_cidr("10.0.0.5/24", HostBits::Reject),
            Err(PrefixError::HostBitsSet)
        );
        assert_eq!(
            parse_cidr("10.0.0.0/24", HostBits::Reject).map(|p| p.length()),
            Ok(24)
        );
        assert_eq!(
            parse_cidr("fd00::1/64", HostBits::Reject),
            Err(PrefixError::HostBitsSet)
        );
    }

    #[test]
    fn zero_length_and_host_routes() {
        assert_eq!(
            parse_cidr("192.168.7.9/0", HostBits::Mask).unwrap().to_string(),
            "0.0.0.0/0"
        );
        assert_eq!(
            parse_cidr("192.168.7.9/32", HostBits::Reject)
                .unwrap()
                .to_string(),
            "192.168.7.9/32"
        );
        assert_eq!(
            parse_cidr("::1/128", HostBits::Reject).unwrap().to_string(),
            "::1/128"
        );
    }

    #[test]
    fn malformed() {
        let cases = [
            ("", PrefixError::Empty),
            ("   ", PrefixError::Empty),
            ("not-a-cidr", PrefixError::MissingLength),
            ("10.0.0.0", PrefixError::MissingLength),
            ("10.0.0.0/", PrefixError::MalformedLength),
            ("10.0.0.0/+8", PrefixError::MalformedLength),
            ("10.0.0.0/-1", PrefixError::MalformedLength),
            ("10.0.0.0/300", PrefixError::MalformedLength),
            ("10.0.0.0/33", PrefixError::InvalidPrefixLength(33, 32)),
            ("::/129", PrefixError::InvalidPrefixLength(129, 128)),
            ("300.1.1.1/8", PrefixError::MalformedAddr),
            ("fd00::zz/64", PrefixError::MalformedAddr),
        ];
        for (input, expected) in cases {
            assert_eq!(
                parse_cidr(input, HostBits::Mask),
                Err(expected),
                "input {input:?}"
            );
        }
    }
}
