//! Burst payloads and per-frame burst records

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::FrameNumber;
use crate::{AttackError, Result};

/// Payload bits carried by a normal burst (two 57-bit halves).
pub const PAYLOAD_BITS: usize = 114;

/// Length of a complete normal burst including tail, stealing and training bits.
pub const NORMAL_BURST_BITS: usize = 148;

/// Number of bursts a control channel message is interleaved over.
pub const BURSTS_PER_MESSAGE: usize = 4;

/// The 114 payload bits of one burst, one bit per element.
///
/// Backed by `Arc<[u8]>` so the same plaintext can be shared by many
/// attack burst sets without copying.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BurstPayload(Arc<[u8]>);

impl BurstPayload {
    /// Create a payload from exactly [`PAYLOAD_BITS`] bits, each 0 or 1.
    pub fn from_bits(bits: impl Into<Vec<u8>>) -> Result<Self> {
        let bits = bits.into();
        if bits.len() != PAYLOAD_BITS {
            return Err(AttackError::parse(
                "Burst payload",
                format!("expected {} bits, got {}", PAYLOAD_BITS, bits.len()),
            ));
        }
        if let Some(position) = bits.iter().position(|&bit| bit > 1) {
            return Err(AttackError::parse(
                "Burst payload",
                format!("value {} at bit {} is not a bit", bits[position], position),
            ));
        }
        Ok(Self(bits.into()))
    }

    /// Extract the payload from a full 148-bit normal burst.
    ///
    /// Keeps bits 3..60 and 88..145, dropping tail bits, stealing flags and
    /// the training sequence.
    pub fn from_normal_burst(burst: &[u8]) -> Result<Self> {
        if burst.len() != NORMAL_BURST_BITS {
            return Err(AttackError::parse(
                "Normal burst",
                format!("expected {} bits, got {}", NORMAL_BURST_BITS, burst.len()),
            ));
        }
        let bits: Vec<u8> = burst[3..60].iter().chain(&burst[88..145]).copied().collect();
        Self::from_bits(bits)
    }

    /// Get the payload bits.
    pub fn bits(&self) -> &[u8] {
        &self.0
    }

    /// XOR with another payload bit by bit.
    pub fn xor(&self, other: &BurstPayload) -> Vec<u8> {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a ^ b).collect()
    }
}

impl FromStr for BurstPayload {
    type Err = AttackError;

    /// Parse a string of `0`/`1` characters, either bare payload or a full normal burst.
    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .trim()
            .chars()
            .map(|c| match c {
                '0' => Ok(0),
                '1' => Ok(1),
                other => Err(AttackError::parse(
                    "Burst payload",
                    format!("unexpected character {:?}", other),
                )),
            })
            .collect::<Result<Vec<u8>>>()?;

        if bits.len() == NORMAL_BURST_BITS {
            Self::from_normal_burst(&bits)
        } else {
            Self::from_bits(bits)
        }
    }
}

impl TryFrom<String> for BurstPayload {
    type Error = AttackError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<BurstPayload> for String {
    fn from(payload: BurstPayload) -> Self {
        payload.to_string()
    }
}

impl fmt::Display for BurstPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.0.iter() {
            f.write_str(if *bit == 0 { "0" } else { "1" })?;
        }
        Ok(())
    }
}

/// The four burst payloads a message is encoded into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBursts([BurstPayload; BURSTS_PER_MESSAGE]);

impl MessageBursts {
    /// Get the payload at burst position `index` within the message.
    pub fn get(&self, index: usize) -> Option<&BurstPayload> {
        self.0.get(index)
    }

    /// Iterate over the payloads in burst order.
    pub fn iter(&self) -> impl Iterator<Item = &BurstPayload> {
        self.0.iter()
    }
}

impl TryFrom<Vec<BurstPayload>> for MessageBursts {
    type Error = AttackError;

    fn try_from(payloads: Vec<BurstPayload>) -> Result<Self> {
        let count = payloads.len();
        let bursts: [BurstPayload; BURSTS_PER_MESSAGE] =
            payloads.try_into().map_err(|_| {
                AttackError::inconclusive(format!(
                    "encoder produced {} bursts, expected {}",
                    count, BURSTS_PER_MESSAGE
                ))
            })?;
        Ok(Self(bursts))
    }
}

/// One decoded burst of a captured timeslot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Burst {
    pub frame_number: FrameNumber,
    pub timeslot: u8,
    /// SDCCH/SACCH subchannel, when the demapper assigned one
    #[serde(default)]
    pub subchannel: Option<u8>,
    pub payload: BurstPayload,
}

/// Ciphertext lookup by frame number for one timeslot.
#[derive(Debug, Clone, Default)]
pub struct BurstIndex {
    bursts: HashMap<FrameNumber, BurstPayload>,
}

impl BurstIndex {
    /// Index bursts by frame number. Later duplicates replace earlier ones.
    pub fn from_bursts<'a>(bursts: impl IntoIterator<Item = &'a Burst>) -> Self {
        let bursts =
            bursts.into_iter().map(|burst| (burst.frame_number, burst.payload.clone())).collect();
        Self { bursts }
    }

    /// Get the captured payload at `frame`.
    pub fn get(&self, frame: FrameNumber) -> Option<&BurstPayload> {
        self.bursts.get(&frame)
    }

    /// Number of indexed bursts.
    pub fn len(&self) -> usize {
        self.bursts.len()
    }

    /// Returns true if no bursts are indexed.
    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }
}
