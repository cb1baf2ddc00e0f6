// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Keeps the pod CIDR advertisements of a set of BGP peer sessions in sync.
//!
//! An [`announcer::Announcer`] pushes the full prefix set to every live
//! session and fails if any session rejects it. A
//! [`withdrawer::Withdrawer`] pushes the empty set to every live session on
//! a best-effort basis. The BGP sessions themselves are supplied by the
//! caller through [`session::SessionRegistry`].

pub mod advertisement;
pub mod announcer;
pub mod config;
pub mod error;
pub mod group;
pub mod log;
pub mod prefix;
pub mod session;
pub mod speaker;
pub mod withdrawer;

#[cfg(test)]
mod proptest;


pub const COMPONENT_SPEAKER: &str = "bgp-speaker";
pub const MOD_ANNOUNCER: &str = "announcer";
pub const MOD_WITHDRAWER: &str = "withdrawer";
pub const MOD_SANITIZER: &str = "sanitizer";
pub const MOD_GROUP: &str = "group";
