// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt::Display;
use std::net::IpAddr;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no established BGP session")]
    NoSession,

    #[error("no BGP advertisements made")]
    NoAdvertisement,

    #[error("peer push failed: {0}")]
    PeerPush(PushFailures),

    #[error("session for peer {0} already exists")]
    PeerExists(IpAddr),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse: {0}")]
    Config(#[from] serde_json::Error),
}

/// Errors a [`crate::session::PeerSession`] reports when it cannot replace
/// its advertised set.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("session not established")]
    NotEstablished,

    #[error("update rejected: {0}")]
    Rejected(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the task machinery itself, independent of what the task was
/// doing.
#[derive(thiserror::Error, Debug)]
pub enum TaskError {
    #[error("failed to spawn task {task}: {error}")]
    Spawn {
        task: String,
        error: std::io::Error,
    },

    #[error("task {task} panicked: {message}")]
    Panicked { task: String, message: String },
}

impl TaskError {
    pub fn task(&self) -> &str {
        match self {
            Self::Spawn { task, .. } | Self::Panicked { task, .. } => task,
        }
    }
}

/// A single peer that did not accept an announcement.
#[derive(thiserror::Error, Debug)]
pub enum PushFailure {
    #[error("peer {peer}: {error}")]
    Session { peer: String, error: SessionError },

    #[error("{0}")]
    Task(#[from] TaskError),
}

impl PushFailure {
    pub fn peer(&self) -> &str {
        match self {
            Self::Session { peer, .. } => peer,
            Self::Task(e) => e.task(),
        }
    }
}

/// Every push failure observed during one announcement, in the order the
/// failures were recorded. Never empty when carried by [`Error::PeerPush`].
#[derive(Debug)]
pub struct PushFailures(pub Vec<PushFailure>);

impl PushFailures {
    pub fn peers(&self) -> Vec<&str> {
        self.0.iter().map(PushFailure::peer).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for PushFailures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    #[error("empty cidr")]
    Empty,

    #[error("missing prefix length")]
    MissingLength,

    #[error("malformed ip addr")]
    MalformedAddr,

    #[error("malformed length")]
    MalformedLength,

    #[error("invalid prefix length {0}, max is {1}")]
    InvalidPrefixLength(u8, u8),

    #[error("host bits set")]
    HostBitsSet,
}

/// A CIDR string that was dropped instead of advertised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed cidr {cidr:?}: {reason}")]
pub struct MalformedCidr {
    pub cidr: String,
    pub reason: PrefixError,
}
