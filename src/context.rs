//! Dedicated channel resolution
//!
//! The attack needs the timeslot, subchannel and channel combination of the
//! dedicated channel the session runs on. They come either straight from the
//! configuration (when the Cipher Mode Command frame is known) or from the
//! Immediate Assignment that opened the channel.

use tracing::{debug, info};

use crate::cmc::{CipherModeCommand, CipherModeCommandLocator};
use crate::config::AttackConfig;
use crate::pipeline::{DecodeRequest, DecodingPipeline};
use crate::types::{ChannelMode, ControlMessage, DecodedControlMessage, FrameNumber};
use crate::window::{FrameWindow, FrameWindowPlanner};
use crate::{AttackError, Result};

/// Where the attacked session lives on the air interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelContext {
    pub timeslot: u8,
    /// Unknown until the Cipher Mode Command or Immediate Assignment is matched
    pub subchannel: Option<u8>,
    pub channel_mode: ChannelMode,
}

impl ChannelContext {
    pub fn new(timeslot: u8, subchannel: Option<u8>, channel_mode: ChannelMode) -> Self {
        Self { timeslot, subchannel, channel_mode }
    }

    pub fn with_subchannel(self, subchannel: u8) -> Self {
        Self { subchannel: Some(subchannel), ..self }
    }

    /// Request covering this channel, filtered by subchannel when known.
    pub fn request(&self) -> DecodeRequest {
        let request = DecodeRequest::timeslot(self.timeslot, self.channel_mode);
        match self.subchannel {
            Some(subchannel) => request.with_subchannel(subchannel),
            None => request,
        }
    }
}

/// Resolves the [`ChannelContext`] and, from an Immediate Assignment, the
/// Cipher Mode Command that follows it.
pub struct ChannelContextResolver<'a, P: ?Sized> {
    pipeline: &'a P,
}

impl<'a, P: DecodingPipeline + ?Sized> ChannelContextResolver<'a, P> {
    pub fn new(pipeline: &'a P) -> Self {
        Self { pipeline }
    }

    /// Context for a known Cipher Mode Command frame: the configured channel
    /// with the subchannel left open.
    pub fn from_config(config: &AttackConfig) -> ChannelContext {
        ChannelContext::new(config.timeslot, None, config.channel_mode)
    }

    /// Context described by the Immediate Assignment decoded at `frame`.
    pub fn from_immediate_assignment(
        messages: &[DecodedControlMessage],
        frame: FrameNumber,
    ) -> Result<ChannelContext> {
        messages
            .iter()
            .filter(|message| message.frame_number == frame)
            .find_map(|message| match message.message {
                ControlMessage::ImmediateAssignment {
                    assigned_timeslot,
                    assigned_subchannel,
                    channel_type,
                } => Some(ChannelContext::new(
                    assigned_timeslot,
                    Some(assigned_subchannel),
                    ChannelMode::from_assignment(channel_type),
                )),
                _ => None,
            })
            .ok_or_else(|| {
                AttackError::not_found(format!("no Immediate Assignment at frame {}", frame))
            })
    }

    /// Decode the configured timeslot at the assignment frame and read the
    /// assigned channel from it.
    pub async fn resolve_assignment(
        &self,
        config: &AttackConfig,
        frame: FrameNumber,
    ) -> Result<ChannelContext> {
        let request = DecodeRequest::timeslot(config.timeslot, config.channel_mode)
            .with_frames(FrameWindow::new(frame, frame));
        let capture = self.pipeline.decode(&request).await?;

        let context = Self::from_immediate_assignment(&capture.messages, frame)?;
        info!(
            timeslot = context.timeslot,
            subchannel = ?context.subchannel,
            channel_mode = ?context.channel_mode,
            "Immediate Assignment at frame {}",
            frame
        );
        Ok(context)
    }

    /// Find the first Cipher Mode Command on the assigned channel after the
    /// assignment at `frame`.
    pub async fn locate_cmc(
        &self,
        context: &ChannelContext,
        frame: FrameNumber,
    ) -> Result<CipherModeCommand> {
        let window = FrameWindowPlanner::cmc_search(frame);
        debug!(start = %window.start(), end = %window.end(), "Searching for Cipher Mode Command");

        let capture = self.pipeline.decode(&context.request().with_frames(window)).await?;
        let locator = CipherModeCommandLocator::new(&capture.messages);

        let command = locator.first_after(&window).copied().ok_or_else(|| {
            AttackError::not_found(format!(
                "no Cipher Mode Command within {} frames after the Immediate Assignment \
                 at frame {}",
                window.frame_count() - 1,
                frame
            ))
        })?;

        info!(
            algorithm = %command.algorithm,
            "Cipher Mode Command at frame {}",
            command.frame_number
        );
        Ok(command)
    }
}
