// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::advertisement::{PrefixSet, Sanitizer};
use crate::error::{Error, PushFailure, PushFailures};
use crate::group::ErrorGroup;
use crate::log::speaker_log;
use crate::prefix::HostBits;
use crate::session::{PeerSession, SessionRegistry};
use crate::MOD_ANNOUNCER;
use slog::Logger;
use std::sync::Arc;

/// Pushes the full advertisement set to every established peer.
pub struct Announcer {
    registry: Arc<dyn SessionRegistry>,
    sanitizer: Sanitizer,
    log: Logger,
}

impl Announcer {
    pub fn new(registry: Arc<dyn SessionRegistry>, log: Logger) -> Self {
        Self::with_host_bits(registry, HostBits::default(), log)
    }

    pub fn with_host_bits(
        registry: Arc<dyn SessionRegistry>,
        host_bits: HostBits,
        log: Logger,
    ) -> Self {
        Self {
            registry,
            sanitizer: Sanitizer::new(host_bits, log.clone()),
            log,
        }
    }

    /// Advertise `cidrs` to every live session.
    ///
    /// Fails without contacting any peer if there are no sessions or if no
    /// entry of `cidrs` parses. Otherwise every session gets the push, and
    /// the result is an error if at least one of them failed. Sessions that
    /// accepted the push keep the new set either way.
    pub fn announce<S: AsRef<str>>(&self, cidrs: &[S]) -> Result<(), Error> {
        let sessions = self.registry.peer_sessions();
        if sessions.is_empty() {
            speaker_log!(
                self.log,
                warn,
                MOD_ANNOUNCER,
                "no established BGP session"
            );
            return Err(Error::NoSession);
        }

        let adverts = self.sanitizer.to_advertisements(cidrs);
        if adverts.is_empty() {
            speaker_log!(self.log,
                warn,
                MOD_ANNOUNCER,
                "no BGP advertisements made";
                "cidrs" => cidrs.len()
            );
            return Err(Error::NoAdvertisement);
        }

        speaker_log!(self.log,
            info,
            MOD_ANNOUNCER,
            "announcing {} prefixes to {} peers", adverts.len(), sessions.len();
            "prefixes" => adverts.to_string()
        );

        let adverts = Arc::new(adverts);
        let mut group = ErrorGroup::new();
        for session in sessions {
            let name = session.name();
            let log = self.log.new(slog::o!("peer" => name.clone()));
            group.go(
                name,
                (session, adverts.clone(), log),
                |(session, adverts, log)| push(&log, session, &adverts),
            );
        }

        group.wait().map_err(|failures| {
            let failures = PushFailures(failures);
            speaker_log!(self.log,
                error,
                MOD_ANNOUNCER,
                "announcement failed on {} peers", failures.len();
                "error" => failures.to_string()
            );
            Error::PeerPush(failures)
        })
    }
}

fn push(
    log: &Logger,
    session: Arc<dyn PeerSession>,
    adverts: &PrefixSet,
) -> Result<(), PushFailure> {
    match session.set(adverts) {
        Ok(()) => {
            speaker_log!(log, debug, MOD_ANNOUNCER, "announced prefixes");
            Ok(())
        }
        Err(error) => {
            speaker_log!(log,
                error,
                MOD_ANNOUNCER,
                "failed to announce prefixes";
                "error" => error.to_string()
            );
            Err(PushFailure::Session {
                peer: session.name(),
                error,
            })
        }
    }
}
