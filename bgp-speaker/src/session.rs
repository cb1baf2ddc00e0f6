// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::advertisement::PrefixSet;
use crate::error::{Error, SessionError};
use speaker_common::lock;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// One established BGP peering.
pub trait PeerSession: Send + Sync {
    /// Label used in logs and failure reports.
    fn name(&self) -> String;

    /// Replace everything advertised to this peer with `adverts`. Each call
    /// fully supersedes the previous one, so repeating a call is harmless.
    fn set(&self, adverts: &PrefixSet) -> Result<(), SessionError>;
}

/// Source of the currently established sessions.
pub trait SessionRegistry: Send + Sync {
    /// Snapshot of the live sessions. May be empty; order is not
    /// significant.
    fn peer_sessions(&self) -> Vec<Arc<dyn PeerSession>>;
}

/// In-memory registry keyed by peer address.
#[derive(Default)]
pub struct SessionTable {
    sessions: Mutex<BTreeMap<IpAddr, Arc<dyn PeerSession>>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session(
        &self,
        peer: IpAddr,
        session: Arc<dyn PeerSession>,
    ) -> Result<(), Error> {
        let mut sessions = lock!(self.sessions);
        if sessions.contains_key(&peer) {
            return Err(Error::PeerExists(peer));
        }
        sessions.insert(peer, session);
        Ok(())
    }

    pub fn remove_session(&self, peer: IpAddr) -> Option<Arc<dyn PeerSession>> {
        lock!(self.sessions).remove(&peer)
    }

    pub fn len(&self) -> usize {
        lock!(self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        lock!(self.sessions).is_empty()
    }
}

impl SessionRegistry for SessionTable {
    fn peer_sessions(&self) -> Vec<Arc<dyn PeerSession>> {
        lock!(self.sessions).values().cloned().collect()
    }
}
