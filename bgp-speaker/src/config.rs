// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Error;
use crate::prefix::HostBits;
use serde::{Deserialize, Serialize};
use slog::Logger;
use std::path::{Path, PathBuf};

pub const DEFAULT_SPEAKER_NAME: &str = "bgp-speaker";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SpeakerConfig {
    /// Attached to every log record of the speaker.
    pub name: String,

    /// Handling of CIDRs with host bits set.
    pub host_bits: HostBits,

    /// Log to this file instead of stdout.
    pub log_file: Option<PathBuf>,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SPEAKER_NAME.to_string(),
            host_bits: HostBits::default(),
            log_file: None,
        }
    }
}

impl SpeakerConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn logger(&self) -> Result<Logger, Error> {
        match &self.log_file {
            Some(path) => Ok(speaker_common::log::init_file_logger(path)?),
            None => Ok(speaker_common::log::init_logger()),
        }
    }
}
