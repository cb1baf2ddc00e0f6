// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::announcer::Announcer;
use crate::config::SpeakerConfig;
use crate::error::Error;
use crate::session::SessionRegistry;
use crate::withdrawer::{WithdrawReport, Withdrawer};
use slog::Logger;
use std::sync::Arc;

/// Announces and withdraws pod CIDRs over one shared set of peer sessions.
pub struct Speaker {
    name: String,
    announcer: Announcer,
    withdrawer: Withdrawer,
}

impl Speaker {
    pub fn new(
        config: &SpeakerConfig,
        registry: Arc<dyn SessionRegistry>,
        log: Logger,
    ) -> Self {
        let log = log.new(slog::o!("speaker" => config.name.clone()));
        Self {
            name: config.name.clone(),
            announcer: Announcer::with_host_bits(
                registry.clone(),
                config.host_bits,
                log.clone(),
            ),
            withdrawer: Withdrawer::new(registry, log),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn announce_pod_cidrs<S: AsRef<str>>(
        &self,
        cidrs: &[S],
    ) -> Result<(), Error> {
        self.announcer.announce(cidrs)
    }

    pub fn withdraw(&self) -> WithdrawReport {
        self.withdrawer.withdraw()
    }
}
