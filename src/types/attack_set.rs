//! Known-plaintext candidates submitted to the key oracle

use tracing::warn;

use super::{BURSTS_PER_MESSAGE, BurstIndex, BurstPayload, FrameNumber, MessageBursts};
use crate::{AttackError, Result};

/// A captured burst paired with the plaintext it is believed to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownBurst {
    pub frame_number: FrameNumber,
    pub ciphertext: BurstPayload,
    pub plaintext: BurstPayload,
}

impl KnownBurst {
    /// Keystream bits implied by the pairing (ciphertext XOR plaintext).
    pub fn keystream(&self) -> Vec<u8> {
        self.ciphertext.xor(&self.plaintext)
    }
}

/// One oracle candidate: a target burst to search and a check burst to
/// confirm the key against.
///
/// Both bursts belong to the same message on the same timeslot and
/// subchannel, so one session key explains both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackBurstSet {
    target: KnownBurst,
    check: KnownBurst,
}

impl AttackBurstSet {
    /// Pair a target with a check burst. The two must be different frames.
    pub fn new(target: KnownBurst, check: KnownBurst) -> Result<Self> {
        if target.frame_number == check.frame_number {
            return Err(AttackError::configuration(format!(
                "check burst must differ from target burst (both at frame {})",
                target.frame_number
            )));
        }
        Ok(Self { target, check })
    }

    /// Position within the message of the check burst for the burst at `position`.
    ///
    /// The first burst is checked against the second; every other burst
    /// against the first.
    pub const fn check_position(position: usize) -> usize {
        if position == 0 { 1 } else { 0 }
    }

    /// Build the candidates for one four-burst message starting at `base`.
    ///
    /// Bursts whose target or check ciphertext is missing from `ciphertext`
    /// are skipped.
    pub fn for_message(
        base: FrameNumber,
        plaintext: &MessageBursts,
        ciphertext: &BurstIndex,
    ) -> Vec<AttackBurstSet> {
        let mut sets = Vec::with_capacity(BURSTS_PER_MESSAGE);

        for (position, target_plaintext) in plaintext.iter().enumerate() {
            let check_position = Self::check_position(position);
            let target_frame = base.offset(position as i64);
            let check_frame = base.offset(check_position as i64);

            let (Some(target_cipher), Some(check_cipher), Some(check_plaintext)) = (
                ciphertext.get(target_frame),
                ciphertext.get(check_frame),
                plaintext.get(check_position),
            ) else {
                warn!(
                    target = %target_frame,
                    check = %check_frame,
                    "Skipping candidate, ciphertext missing from capture"
                );
                continue;
            };

            let target = KnownBurst {
                frame_number: target_frame,
                ciphertext: target_cipher.clone(),
                plaintext: target_plaintext.clone(),
            };
            let check = KnownBurst {
                frame_number: check_frame,
                ciphertext: check_cipher.clone(),
                plaintext: check_plaintext.clone(),
            };
            match Self::new(target, check) {
                Ok(set) => sets.push(set),
                Err(e) => warn!("Skipping candidate: {}", e),
            }
        }

        sets
    }

    pub fn target(&self) -> &KnownBurst {
        &self.target
    }

    pub fn check(&self) -> &KnownBurst {
        &self.check
    }

    pub fn target_frame_number(&self) -> FrameNumber {
        self.target.frame_number
    }

    pub fn target_ciphertext(&self) -> &BurstPayload {
        &self.target.ciphertext
    }

    pub fn target_plaintext(&self) -> &BurstPayload {
        &self.target.plaintext
    }

    pub fn check_frame_number(&self) -> FrameNumber {
        self.check.frame_number
    }

    pub fn check_ciphertext(&self) -> &BurstPayload {
        &self.check.ciphertext
    }

    pub fn check_plaintext(&self) -> &BurstPayload {
        &self.check.plaintext
    }
}
