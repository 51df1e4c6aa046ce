//! Decoded control messages on the dedicated and common control channels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::FrameNumber;
use crate::{AttackError, Result};

/// A5 cipher algorithm identifier carried by a Cipher Mode Command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CipherAlgorithm(u8);

impl CipherAlgorithm {
    /// The only algorithm this crate attacks.
    pub const A5_1: CipherAlgorithm = CipherAlgorithm(1);

    /// Create an identifier for A5/`version`, `version` in 0..=7.
    pub fn new(version: u8) -> Option<Self> {
        (version <= 7).then_some(Self(version))
    }

    /// Get the algorithm version number.
    pub fn version(self) -> u8 {
        self.0
    }
}

impl FromStr for CipherAlgorithm {
    type Err = AttackError;

    fn from_str(s: &str) -> Result<Self> {
        let version = s
            .trim()
            .strip_prefix("A5/")
            .and_then(|v| v.parse::<u8>().ok())
            .and_then(CipherAlgorithm::new);
        version.ok_or_else(|| {
            AttackError::parse("Cipher algorithm", format!("{:?} is not A5/0 to A5/7", s))
        })
    }
}

impl TryFrom<String> for CipherAlgorithm {
    type Error = AttackError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CipherAlgorithm> for String {
    fn from(algorithm: CipherAlgorithm) -> Self {
        algorithm.to_string()
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A5/{}", self.0)
    }
}

/// System Information types broadcast on SACCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SiType {
    #[serde(rename = "System Information Type 5")]
    Type5,
    #[serde(rename = "System Information Type 5bis")]
    Type5bis,
    #[serde(rename = "System Information Type 5ter")]
    Type5ter,
    #[serde(rename = "System Information Type 6")]
    Type6,
}

impl SiType {
    /// Order in which a network cycles through SACCH System Information.
    pub const SACCH_ROTATION: [SiType; 4] =
        [SiType::Type5, SiType::Type5bis, SiType::Type5ter, SiType::Type6];
}

impl fmt::Display for SiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SiType::Type5 => "System Information Type 5",
            SiType::Type5bis => "System Information Type 5bis",
            SiType::Type5ter => "System Information Type 5ter",
            SiType::Type6 => "System Information Type 6",
        };
        f.write_str(name)
    }
}

/// Dedicated channel type assigned by an Immediate Assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    #[serde(rename = "SDCCH/4")]
    Sdcch4,
    #[serde(rename = "SDCCH/8")]
    Sdcch8,
    #[serde(other)]
    Other,
}

/// Decoded message content, closed over the messages the attack reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Assignment of a dedicated channel to a mobile
    ImmediateAssignment {
        assigned_timeslot: u8,
        assigned_subchannel: u8,
        channel_type: ChannelType,
    },
    /// Ciphering start on the dedicated channel
    CipherModeCommand { algorithm: CipherAlgorithm },
    /// System Information on SACCH
    SystemInformation { si_type: SiType },
    /// Anything else the decoder reported
    Other { name: String },
}

/// A control message decoded by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedControlMessage {
    /// Frame number of the message's first burst
    pub frame_number: FrameNumber,
    pub timeslot: u8,
    pub subchannel: u8,
    #[serde(flatten)]
    pub message: ControlMessage,
    /// Layer 2 payload as decoded, including the SACCH layer 1 header
    #[serde(default, with = "hex_payload")]
    pub payload: Vec<u8>,
}

impl DecodedControlMessage {
    /// Returns the System Information type if this is a SACCH SI message.
    pub fn si_type(&self) -> Option<SiType> {
        match self.message {
            ControlMessage::SystemInformation { si_type } => Some(si_type),
            _ => None,
        }
    }
}

mod hex_payload {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        hex::decode(compact).map_err(D::Error::custom)
    }
}
