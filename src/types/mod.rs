//! Core types for captured bursts and decoded control messages.
//!
//! This module provides the data model shared by every attack phase:
//! - [`FrameNumber`] is a TDMA frame number with hyperframe wraparound
//! - [`BurstPayload`] holds the 114 payload bits of a normal burst, shared via `Arc`
//! - [`Burst`] and [`BurstIndex`] give per-frame ciphertext lookup
//! - [`DecodedControlMessage`] carries the decoded Immediate Assignment,
//!   Cipher Mode Command and System Information records
//! - [`AttackBurstSet`] pairs target and check bursts with their known plaintext
//! - [`SessionKey`] is the recovered Kc
//!
//! ## Usage Example
//!
//! ```rust
//! use a51_replay::types::{
//!     AttackBurstSet, Burst, BurstIndex, BurstPayload, FrameNumber, MessageBursts,
//! };
//!
//! let zeros = BurstPayload::from_bits(vec![0u8; 114]).unwrap();
//! let bursts: Vec<Burst> = (5051..5055)
//!     .map(|f| Burst {
//!         frame_number: FrameNumber::new(f),
//!         timeslot: 1,
//!         subchannel: Some(2),
//!         payload: zeros.clone(),
//!     })
//!     .collect();
//! let index = BurstIndex::from_bursts(&bursts);
//! let plaintext = MessageBursts::try_from(vec![zeros.clone(); 4]).unwrap();
//!
//! let sets = AttackBurstSet::for_message(FrameNumber::new(5051), &plaintext, &index);
//! assert_eq!(sets.len(), 4);
//! ```

mod attack_set;
mod burst;
mod frame;
mod key;
mod message;

pub use attack_set::{AttackBurstSet, KnownBurst};
pub use burst::{
    BURSTS_PER_MESSAGE, Burst, BurstIndex, BurstPayload, MessageBursts, NORMAL_BURST_BITS,
    PAYLOAD_BITS,
};
pub use frame::{FrameNumber, HYPERFRAME};
pub use key::SessionKey;
pub use message::{ChannelType, CipherAlgorithm, ControlMessage, DecodedControlMessage, SiType};

use serde::{Deserialize, Serialize};

/// Channel combination of the timeslot carrying the dedicated channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelMode {
    /// Combined BCCH/CCCH with four SDCCH subchannels
    #[default]
    #[serde(rename = "BCCH_SDCCH4")]
    BcchSdcch4,
    /// Eight SDCCH subchannels
    #[serde(rename = "SDCCH8")]
    Sdcch8,
}

impl ChannelMode {
    /// Number of SDCCH/SACCH subchannels on the timeslot.
    pub fn subchannel_count(self) -> u8 {
        match self {
            ChannelMode::BcchSdcch4 => 4,
            ChannelMode::Sdcch8 => 8,
        }
    }

    /// Channel mode implied by the channel type of an Immediate Assignment.
    pub fn from_assignment(channel_type: ChannelType) -> Self {
        match channel_type {
            ChannelType::Sdcch8 => ChannelMode::Sdcch8,
            _ => ChannelMode::BcchSdcch4,
        }
    }
}

/// Which known-plaintext sources to attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackMode {
    #[serde(rename = "SDCCH")]
    Sdcch,
    #[serde(rename = "SACCH")]
    Sacch,
    /// SDCCH first, SACCH if it fails
    #[default]
    #[serde(rename = "SDCCH/SACCH")]
    Both,
}

impl AttackMode {
    pub fn attacks_sdcch(self) -> bool {
        matches!(self, AttackMode::Sdcch | AttackMode::Both)
    }

    pub fn attacks_sacch(self) -> bool {
        matches!(self, AttackMode::Sacch | AttackMode::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn channel_mode_from_assignment() {
        assert_eq!(ChannelMode::from_assignment(ChannelType::Sdcch8), ChannelMode::Sdcch8);
        assert_eq!(ChannelMode::from_assignment(ChannelType::Sdcch4), ChannelMode::BcchSdcch4);
        assert_eq!(ChannelMode::from_assignment(ChannelType::Other), ChannelMode::BcchSdcch4);
    }

    #[test]
    fn attack_mode_phases() {
        assert!(AttackMode::Both.attacks_sdcch() && AttackMode::Both.attacks_sacch());
        assert!(AttackMode::Sdcch.attacks_sdcch() && !AttackMode::Sdcch.attacks_sacch());
        assert!(!AttackMode::Sacch.attacks_sdcch() && AttackMode::Sacch.attacks_sacch());
    }

    #[test]
    fn modes_use_tool_names() {
        assert_eq!(serde_yaml_ng::from_str::<AttackMode>("SDCCH/SACCH").unwrap(), AttackMode::Both);
        assert_eq!(serde_yaml_ng::from_str::<ChannelMode>("SDCCH8").unwrap(), ChannelMode::Sdcch8);
    }

    proptest! {
        #[test]
        fn payload_text_round_trips(bits in prop::collection::vec(0u8..=1, PAYLOAD_BITS)) {
            let payload = BurstPayload::from_bits(bits.clone()).unwrap();
            let parsed: BurstPayload = payload.to_string().parse().unwrap();
            prop_assert_eq!(parsed.bits(), &bits[..]);
        }
    }
}
