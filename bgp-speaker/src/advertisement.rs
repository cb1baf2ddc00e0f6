// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::MalformedCidr;
use crate::log::speaker_log;
use crate::prefix::{parse_cidr, HostBits, Prefix};
use crate::MOD_SANITIZER;
use slog::Logger;
use std::fmt;

/// A single prefix to be advertised to BGP peers. Only obtainable by parsing
/// a CIDR string.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct PrefixAdvertisement {
    prefix: Prefix,
}

impl PrefixAdvertisement {
    pub fn parse(
        cidr: &str,
        host_bits: HostBits,
    ) -> Result<Self, MalformedCidr> {
        match parse_cidr(cidr, host_bits) {
            Ok(prefix) => Ok(Self { prefix }),
            Err(reason) => Err(MalformedCidr {
                cidr: cidr.to_string(),
                reason,
            }),
        }
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }
}

impl fmt::Display for PrefixAdvertisement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.prefix.fmt(f)
    }
}

/// Everything that should currently be advertised to a peer. Pushing an
/// empty set withdraws every route the peer has from us.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PrefixSet {
    adverts: Vec<PrefixAdvertisement>,
}

impl PrefixSet {
    /// The canonical empty set.
    pub fn withdraw_all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.adverts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.adverts.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PrefixAdvertisement> {
        self.adverts.iter()
    }

    pub fn prefixes(&self) -> Vec<Prefix> {
        self.adverts.iter().map(PrefixAdvertisement::prefix).collect()
    }
}

impl FromIterator<PrefixAdvertisement> for PrefixSet {
    fn from_iter<I: IntoIterator<Item = PrefixAdvertisement>>(iter: I) -> Self {
        Self {
            adverts: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PrefixSet {
    type Item = &'a PrefixAdvertisement;
    type IntoIter = std::slice::Iter<'a, PrefixAdvertisement>;

    fn into_iter(self) -> Self::IntoIter {
        self.adverts.iter()
    }
}

impl fmt::Display for PrefixSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, advert) in self.adverts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{advert}")?;
        }
        write!(f, "]")
    }
}

/// Turns untrusted CIDR strings into advertisements, dropping and logging
/// the ones that do not parse.
#[derive(Clone)]
pub struct Sanitizer {
    host_bits: HostBits,
    log: Logger,
}

impl Sanitizer {
    pub fn new(host_bits: HostBits, log: Logger) -> Self {
        Self { host_bits, log }
    }

    /// Output order follows input order. Duplicates are kept.
    pub fn to_advertisements<S: AsRef<str>>(&self, cidrs: &[S]) -> PrefixSet {
        let mut adverts = Vec::with_capacity(cidrs.len());
        for cidr in cidrs {
            match PrefixAdvertisement::parse(cidr.as_ref(), self.host_bits) {
                Ok(advert) => adverts.push(advert),
                Err(e) => {
                    speaker_log!(self.log,
                        error,
                        MOD_SANITIZER,
                        "could not announce malformed cidr, continuing to next";
                        "cidr" => e.cidr.clone(),
                        "error" => e.reason.to_string()
                    );
                }
            }
        }
        PrefixSet { adverts }
    }
}

/// Sanitize `cidrs` with the default host-bit policy.
pub fn to_advertisements<S: AsRef<str>>(
    log: &Logger,
    cidrs: &[S],
) -> PrefixSet {
    Sanitizer::new(HostBits::default(), log.clone()).to_advertisements(cidrs)
}
