//! Cipher Mode Command lookup and A5/1 validation

use crate::types::{CipherAlgorithm, ControlMessage, DecodedControlMessage, FrameNumber};
use crate::window::FrameWindow;
use crate::{AttackError, Result};

/// A decoded Cipher Mode Command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherModeCommand {
    pub frame_number: FrameNumber,
    pub timeslot: u8,
    pub subchannel: u8,
    pub algorithm: CipherAlgorithm,
}

impl CipherModeCommand {
    pub fn is_a51(&self) -> bool {
        self.algorithm == CipherAlgorithm::A5_1
    }
}

/// Why a Cipher Mode Command was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No Cipher Mode Command at the requested frame
    Missing,
    /// The command selects another algorithm
    WrongAlgorithm(CipherAlgorithm),
}

/// Result of validating the Cipher Mode Command at a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmcVerdict {
    Accepted(CipherModeCommand),
    Rejected(Rejection),
}

impl CmcVerdict {
    /// Convert to a result; every rejection is a [`AttackError::WrongCipher`].
    pub fn into_result(self, frame: FrameNumber) -> Result<CipherModeCommand> {
        match self {
            CmcVerdict::Accepted(command) => Ok(command),
            CmcVerdict::Rejected(Rejection::Missing) => Err(AttackError::wrong_cipher(frame, None)),
            CmcVerdict::Rejected(Rejection::WrongAlgorithm(found)) => {
                Err(AttackError::wrong_cipher(frame, Some(found)))
            }
        }
    }
}

/// Finds Cipher Mode Commands among decoded control messages.
#[derive(Debug, Clone, Default)]
pub struct CipherModeCommandLocator {
    commands: Vec<CipherModeCommand>,
}

impl CipherModeCommandLocator {
    /// Collect the Cipher Mode Commands in `messages`, keeping capture order.
    pub fn new(messages: &[DecodedControlMessage]) -> Self {
        let commands = messages
            .iter()
            .filter_map(|message| match message.message {
                ControlMessage::CipherModeCommand { algorithm } => Some(CipherModeCommand {
                    frame_number: message.frame_number,
                    timeslot: message.timeslot,
                    subchannel: message.subchannel,
                    algorithm,
                }),
                _ => None,
            })
            .collect();
        Self { commands }
    }

    pub fn commands(&self) -> &[CipherModeCommand] {
        &self.commands
    }

    /// The first command recorded at exactly `frame`.
    pub fn find_at(&self, frame: FrameNumber) -> Option<&CipherModeCommand> {
        self.commands.iter().find(|command| command.frame_number == frame)
    }

    /// Accept the command at `frame` only if it selects A5/1.
    pub fn validate(&self, frame: FrameNumber) -> CmcVerdict {
        match self.find_at(frame) {
            None => CmcVerdict::Rejected(Rejection::Missing),
            Some(command) if command.is_a51() => CmcVerdict::Accepted(*command),
            Some(command) => CmcVerdict::Rejected(Rejection::WrongAlgorithm(command.algorithm)),
        }
    }

    /// The earliest command inside `window`, counting from its start.
    pub fn first_after(&self, window: &FrameWindow) -> Option<&CipherModeCommand> {
        self.commands
            .iter()
            .filter_map(|command| {
                window.position_of(command.frame_number).map(|pos| (pos, command))
            })
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, command)| command)
    }
}
