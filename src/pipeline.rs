//! Decoding pipeline trait for capture sources

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{Burst, BurstIndex, ChannelMode, DecodedControlMessage};
use crate::window::FrameWindow;
use crate::{AttackError, Result};

/// Filters applied by the decoding pipeline to one run over the capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeRequest {
    pub timeslot: u8,
    /// Restrict to one SDCCH/SACCH subchannel
    pub subchannel: Option<u8>,
    /// Restrict to a frame window; `None` decodes the whole capture
    pub frames: Option<FrameWindow>,
    pub channel_mode: ChannelMode,
}

impl DecodeRequest {
    /// Request for a whole timeslot with no subchannel or frame filter.
    pub fn timeslot(timeslot: u8, channel_mode: ChannelMode) -> Self {
        Self { timeslot, subchannel: None, frames: None, channel_mode }
    }

    pub fn with_subchannel(mut self, subchannel: u8) -> Self {
        self.subchannel = Some(subchannel);
        self
    }

    pub fn with_frames(mut self, frames: FrameWindow) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Check the filters are consistent with the channel mode.
    pub fn validate(&self) -> Result<()> {
        if self.timeslot > 7 {
            return Err(AttackError::configuration(format!(
                "timeslot {} is outside 0-7",
                self.timeslot
            )));
        }
        if let Some(subchannel) = self.subchannel {
            if subchannel >= self.channel_mode.subchannel_count() {
                return Err(AttackError::configuration(format!(
                    "subchannel {} does not exist in {:?}",
                    subchannel, self.channel_mode
                )));
            }
        }
        Ok(())
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCapture {
    #[serde(default)]
    pub bursts: Vec<Burst>,
    #[serde(default)]
    pub messages: Vec<DecodedControlMessage>,
}

impl DecodedCapture {
    /// Index the captured bursts by frame number.
    pub fn ciphertext_index(&self) -> BurstIndex {
        BurstIndex::from_bursts(&self.bursts)
    }
}

/// Source of decoded bursts and control messages.
///
/// A pipeline run is one-shot: the request goes in, the complete result
/// comes out, and nothing is consumed incrementally.
#[async_trait::async_trait]
pub trait DecodingPipeline: Send + Sync {
    /// Decode the capture under the given filters.
    ///
    /// Returns:
    /// - `Ok(capture)` - All records that pass the filters (possibly none)
    /// - `Err(e)` - The pipeline could not run
    async fn decode(&self, request: &DecodeRequest) -> Result<DecodedCapture>;
}

#[async_trait::async_trait]
impl<T: DecodingPipeline + ?Sized> DecodingPipeline for Arc<T> {
    async fn decode(&self, request: &DecodeRequest) -> Result<DecodedCapture> {
        (**self).decode(request).await
    }
}
