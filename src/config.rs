//! Attack configuration
//!
//! Mirrors the options of the command-line front end as a serde value, so a
//! run can be described in YAML:
//!
//! ```yaml
//! cmc_frame: 5000
//! timeslot: 1
//! channel_mode: SDCCH8
//! attack_mode: SDCCH/SACCH
//! verbose: true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{AttackMode, ChannelMode, FrameNumber};
use crate::{AttackError, Result};

/// Frame the attack starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Frame of the Cipher Mode Command
    CipherModeCommand(FrameNumber),
    /// Frame of the Immediate Assignment that opened the dedicated channel
    ImmediateAssignment(FrameNumber),
}

/// Parameters of one attack run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttackConfig {
    /// Frame number of the Cipher Mode Command
    pub cmc_frame: Option<u32>,
    /// Frame number of the Immediate Assignment
    pub ia_frame: Option<u32>,
    /// Timeslot of the Immediate Assignment or Cipher Mode Command
    pub timeslot: u8,
    pub channel_mode: ChannelMode,
    pub attack_mode: AttackMode,
    /// Log every candidate submission and ask the oracle for verbose output
    pub verbose: bool,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            cmc_frame: None,
            ia_frame: None,
            timeslot: 0,
            channel_mode: ChannelMode::BcchSdcch4,
            attack_mode: AttackMode::Both,
            verbose: false,
        }
    }
}

impl AttackConfig {
    /// Attack starting from a known Cipher Mode Command frame.
    pub fn from_cmc(frame: u32, timeslot: u8) -> Self {
        Self { cmc_frame: Some(frame), timeslot, ..Self::default() }
    }

    /// Attack starting from an Immediate Assignment frame.
    pub fn from_immediate_assignment(frame: u32, timeslot: u8) -> Self {
        Self { ia_frame: Some(frame), timeslot, ..Self::default() }
    }

    pub fn with_attack_mode(mut self, attack_mode: AttackMode) -> Self {
        self.attack_mode = attack_mode;
        self
    }

    pub fn with_channel_mode(mut self, channel_mode: ChannelMode) -> Self {
        self.channel_mode = channel_mode;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Parse a configuration from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| AttackError::parse("Attack configuration", e.to_string()))
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AttackError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&text)
    }

    /// Validate the frame selection and return the starting point.
    pub fn anchor(&self) -> Result<Anchor> {
        let frame = |value: u32| {
            FrameNumber::try_from(value).map_err(|e| AttackError::configuration(e.to_string()))
        };

        match (self.cmc_frame, self.ia_frame) {
            (Some(cmc), None) => Ok(Anchor::CipherModeCommand(frame(cmc)?)),
            (None, Some(ia)) => Ok(Anchor::ImmediateAssignment(frame(ia)?)),
            (Some(_), Some(_)) => Err(AttackError::configuration(
                "Cipher Mode Command and Immediate Assignment frames are mutually exclusive",
            )),
            (None, None) => Err(AttackError::configuration(
                "No valid frame number for Cipher Mode Command or Immediate Assignment \
                 was provided",
            )),
        }
    }

    /// Validate everything that can be checked before any pipeline run.
    pub fn validate(&self) -> Result<Anchor> {
        if self.timeslot > 7 {
            return Err(AttackError::configuration(format!(
                "timeslot {} is outside 0-7",
                self.timeslot
            )));
        }
        self.anchor()
    }
}
