//! Replay pipeline for pre-extracted record files
//!
//! A record file holds the output of an earlier decoding run over the whole
//! capture: every burst of the timeslots of interest and every decoded control
//! message. The replay pipeline answers [`DecodeRequest`]s by filtering those
//! records, so the attack runs without the radio stack.
//!
//! ## File Format
//!
//! ```yaml
//! bursts:
//!   - frame_number: 5051
//!     timeslot: 1
//!     subchannel: 2
//!     payload: "0110...1"        # 114 payload bits or a full 148-bit burst
//! messages:
//!   - frame_number: 5000
//!     timeslot: 1
//!     subchannel: 2
//!     type: cipher_mode_command
//!     algorithm: A5/1
//!   - frame_number: 4800
//!     timeslot: 1
//!     subchannel: 2
//!     type: system_information
//!     si_type: System Information Type 5
//!     payload: "051c0303490..."   # hex
//! ```

use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

use crate::pipeline::{DecodeRequest, DecodedCapture, DecodingPipeline};
use crate::{AttackError, Result};

/// Pipeline replaying decoded records from memory.
#[derive(Debug, Clone)]
pub struct ReplayPipeline {
    capture: DecodedCapture,
    path: PathBuf,
}

impl ReplayPipeline {
    /// Load a record file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AttackError::file_error(path.to_path_buf(), e))?;

        let mut pipeline = Self::from_yaml_str(&text)?;
        pipeline.path = path.to_path_buf();

        info!(
            "Opened record file {}: {} bursts, {} messages",
            path.display(),
            pipeline.capture.bursts.len(),
            pipeline.capture.messages.len()
        );
        Ok(pipeline)
    }

    /// Parse a record file from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let capture: DecodedCapture = serde_yaml_ng::from_str(yaml).map_err(|e| {
            AttackError::parse("Record file", e.to_string())
        })?;
        Ok(Self::from_capture(capture))
    }

    /// Replay records that are already in memory.
    pub fn from_capture(capture: DecodedCapture) -> Self {
        Self { capture, path: PathBuf::from("<memory>") }
    }

    /// Path the records were loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, unfiltered.
    pub fn capture(&self) -> &DecodedCapture {
        &self.capture
    }

    /// Apply the request filters to the loaded records.
    pub fn filter(&self, request: &DecodeRequest) -> DecodedCapture {
        let in_window =
            |frame| request.frames.as_ref().is_none_or(|window| window.contains(frame));

        let bursts = self
            .capture
            .bursts
            .iter()
            .filter(|burst| burst.timeslot == request.timeslot)
            .filter(|burst| match (request.subchannel, burst.subchannel) {
                (Some(wanted), Some(actual)) => wanted == actual,
                _ => true,
            })
            .filter(|burst| in_window(burst.frame_number))
            .cloned()
            .collect();

        let messages = self
            .capture
            .messages
            .iter()
            .filter(|message| message.timeslot == request.timeslot)
            .filter(|message| request.subchannel.is_none_or(|wanted| wanted == message.subchannel))
            .filter(|message| in_window(message.frame_number))
            .cloned()
            .collect();

        DecodedCapture { bursts, messages }
    }
}

#[async_trait::async_trait]
impl DecodingPipeline for ReplayPipeline {
    async fn decode(&self, request: &DecodeRequest) -> Result<DecodedCapture> {
        request.validate()?;

        trace!(?request, "Replaying records");
        let capture = self.filter(request);

        debug!(
            timeslot = request.timeslot,
            subchannel = ?request.subchannel,
            "Replay produced {} bursts, {} messages",
            capture.bursts.len(),
            capture.messages.len()
        );
        Ok(capture)
    }
}
