// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::advertisement::PrefixSet;
use crate::group::WaitGroup;
use crate::log::speaker_log;
use crate::session::{PeerSession, SessionRegistry};
use crate::MOD_WITHDRAWER;
use slog::Logger;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Outcome of a withdrawal, for diagnostics only.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WithdrawReport {
    pub attempted: usize,
    pub failed: usize,
}

/// Withdraws every route from every established peer, best effort.
pub struct Withdrawer {
    registry: Arc<dyn SessionRegistry>,
    log: Logger,
}

impl Withdrawer {
    pub fn new(registry: Arc<dyn SessionRegistry>, log: Logger) -> Self {
        Self { registry, log }
    }

    /// Push the empty set to every live session and wait for all of them.
    /// Failures are logged and counted in the report but never returned.
    pub fn withdraw(&self) -> WithdrawReport {
        let sessions = self.registry.peer_sessions();
        if sessions.is_empty() {
            speaker_log!(
                self.log,
                debug,
                MOD_WITHDRAWER,
                "no sessions to withdraw from"
            );
            return WithdrawReport::default();
        }

        let attempted = sessions.len();
        let empty = Arc::new(PrefixSet::withdraw_all());
        let failed = Arc::new(AtomicUsize::new(0));

        let mut group = WaitGroup::new(self.log.clone());
        for session in sessions {
            let name = session.name();
            let log = self.log.new(slog::o!("peer" => name.clone()));
            group.go(
                name,
                (session, empty.clone(), failed.clone(), log),
                |(session, empty, failed, log)| {
                    withdraw_one(&log, session.as_ref(), &empty, &failed)
                },
            );
        }
        let lost = group.wait();

        let report = WithdrawReport {
            attempted,
            failed: failed.load(Ordering::Relaxed) + lost,
        };
        speaker_log!(self.log,
            info,
            MOD_WITHDRAWER,
            "withdrew routes";
            "attempted" => report.attempted,
            "failed" => report.failed
        );
        report
    }
}

fn withdraw_one(
    log: &Logger,
    session: &dyn PeerSession,
    empty: &PrefixSet,
    failed: &AtomicUsize,
) {
    if let Err(e) = session.set(empty) {
        speaker_log!(log,
            error,
            MOD_WITHDRAWER,
            "failed to gracefully remove BGP routes";
            "error" => e.to_string()
        );
        failed.fetch_add(1, Ordering::Relaxed);
    }
}
