// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property-based tests for CIDR sanitation and announcement fan-out.

use crate::advertisement::{PrefixSet, Sanitizer};
use crate::announcer::Announcer;
use crate::error::SessionError;
use crate::prefix::{HostBits, Prefix, Prefix4, Prefix6};
use crate::session::{PeerSession, SessionRegistry};
use proptest::prelude::*;
use speaker_common::lock;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, Mutex};

const MALFORMED: &[&str] = &[
    "",
    "not-a-cidr",
    "also-bad",
    "10.0.0.0",
    "10.0.0.0/",
    "10.0.0.0/33",
    "10.0.0.0/+8",
    "300.1.1.1/8",
    "::/129",
    "fd00::zz/64",
];

#[derive(Debug, Clone)]
enum Entry {
    Valid(String, Prefix),
    Malformed(String),
}

fn discard_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}

/// Strategy for valid IPv4 CIDR strings, host bits included
fn cidr4_strategy() -> impl Strategy<Value = Entry> {
    (any::<u32>(), 0u8..=32u8).prop_map(|(bits, length)| {
        let addr = Ipv4Addr::from(bits);
        let prefix = Prefix4::new(addr, length).expect("valid v4 prefix");
        Entry::Valid(format!("{addr}/{length}"), prefix.into())
    })
}

/// Strategy for valid IPv6 CIDR strings, host bits included
fn cidr6_strategy() -> impl Strategy<Value = Entry> {
    (any::<u128>(), 0u8..=128u8).prop_map(|(bits, length)| {
        let addr = Ipv6Addr::from(bits);
        let prefix = Prefix6::new(addr, length).expect("valid v6 prefix");
        Entry::Valid(format!("{addr}/{length}"), prefix.into())
    })
}

fn entry_strategy() -> impl Strategy<Value = Entry> {
    prop_oneof![
        cidr4_strategy(),
        cidr6_strategy(),
        prop::sample::select(MALFORMED)
            .prop_map(|s| Entry::Malformed(s.to_string())),
    ]
}

fn entries_strategy() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(entry_strategy(), 0..16)
}

fn split(entries: &[Entry]) -> (Vec<String>, Vec<Prefix>) {
    let mut input = Vec::new();
    let mut expected = Vec::new();
    for entry in entries {
        match entry {
            Entry::Valid(s, p) => {
                input.push(s.clone());
                expected.push(*p);
            }
            Entry::Malformed(s) => input.push(s.clone()),
        }
    }
    (input, expected)
}

struct Recorder {
    name: String,
    calls: Mutex<Vec<PrefixSet>>,
}

impl PeerSession for Recorder {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn set(&self, adverts: &PrefixSet) -> Result<(), SessionError> {
        lock!(self.calls).push(adverts.clone());
        Ok(())
    }
}

struct Recorders(Vec<Arc<Recorder>>);

impl SessionRegistry for Recorders {
    fn peer_sessions(&self) -> Vec<Arc<dyn PeerSession>> {
        self.0
            .iter()
            .map(|r| r.clone() as Arc<dyn PeerSession>)
            .collect()
    }
}

proptest! {
    /// Every valid entry shows up exactly once, in input order, and
    /// malformed entries never disturb their neighbours.
    #[test]
    fn prop_sanitizer_keeps_valid_in_order(entries in entries_strategy()) {
        let (input, expected) = split(&entries);
        let sanitizer = Sanitizer::new(HostBits::Mask, discard_logger());
        let set = sanitizer.to_advertisements(&input);
        prop_assert_eq!(set.prefixes(), expected);
    }

    /// Every sanitized prefix is in network form.
    #[test]
    fn prop_sanitized_host_bits_unset(entries in entries_strategy()) {
        let (input, _) = split(&entries);
        let sanitizer = Sanitizer::new(HostBits::Mask, discard_logger());
        let set = sanitizer.to_advertisements(&input);

        let strict = Sanitizer::new(HostBits::Reject, discard_logger());
        let rendered: Vec<String> =
            set.iter().map(|a| a.to_string()).collect();
        prop_assert_eq!(strict.to_advertisements(&rendered), set);
    }

    /// Every session receives the same set, once per announcement.
    #[test]
    fn prop_announce_same_set_everywhere(
        entries in entries_strategy(),
        peers in 1usize..6,
    ) {
        let (input, expected) = split(&entries);
        let recorders: Vec<Arc<Recorder>> = (0..peers)
            .map(|i| Arc::new(Recorder {
                name: format!("peer-{i}"),
                calls: Mutex::new(Vec::new()),
            }))
            .collect();
        let announcer = Announcer::new(
            Arc::new(Recorders(recorders.clone())),
            discard_logger(),
        );

        let result = announcer.announce(&input);
        prop_assert_eq!(result.is_ok(), !expected.is_empty());
        for r in &recorders {
            let calls = lock!(r.calls).clone();
            if expected.is_empty() {
                prop_assert!(calls.is_empty());
            } else {
                prop_assert_eq!(calls.len(), 1);
                prop_assert_eq!(calls[0].prefixes(), expected.clone());
            }
        }
    }
}
