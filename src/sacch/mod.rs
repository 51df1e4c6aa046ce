//! SACCH known-plaintext reconstruction
//!
//! SACCH carries System Information in a fixed rotation. Apart from the timing
//! advance in the layer 1 header its content is the same for every mobile in
//! the cell, so the messages following the Cipher Mode Command can be predicted
//! from the last one sent in clear and from those seen elsewhere in the capture.
//!
//! Reconstruction works in three steps:
//! 1. [`SacchReference::find`] picks the last System Information before the
//!    command and reads the session's timing advance from it
//! 2. [`PlaintextCatalogue::build`] merges it with the types collected across
//!    the capture and normalizes their timing advance
//! 3. [`SiRotation`] predicts the type of each of the next SACCH messages
//!
//! ```rust
//! use a51_replay::sacch::{PlaintextCatalogue, SacchReference, SiRotation};
//! use a51_replay::types::{FrameNumber, SiType};
//!
//! let reference = SacchReference {
//!     frame_number: FrameNumber::new(4800),
//!     si_type: SiType::Type5,
//!     timing_advance: 0x1c,
//!     payload: vec![0x05, 0x1c, 0x03, 0x03, 0x49, 0x06, 0x1d],
//! };
//! let catalogue = PlaintextCatalogue::build(&reference, &[]);
//! let rotation = SiRotation::pruned(&catalogue);
//! assert_eq!(rotation.after(SiType::Type5, 1), Some(SiType::Type6));
//! ```

mod catalogue;
mod rotation;

pub use catalogue::{
    MAX_SI_TYPES, PlaintextCatalogue, SacchReference, TIMING_ADVANCE_OFFSET, collect_si_types,
};
pub use rotation::SiRotation;

use tracing::{debug, warn};

use crate::cmc::CipherModeCommand;
use crate::encoder::MessageEncoder;
use crate::types::{
    AttackBurstSet, BurstIndex, DecodedControlMessage, FrameNumber, MessageBursts, SiType,
};
use crate::window::SACCH_PERIOD;
use crate::{AttackError, Result};

/// SACCH messages after the reference that are attacked.
pub const PREDICTED_SLOTS: u32 = 3;

/// A SACCH message position and the System Information type expected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SacchSlot {
    pub frame_number: FrameNumber,
    pub si_type: SiType,
}

/// Candidates built for one predicted slot.
#[derive(Debug)]
pub struct SlotCandidates {
    pub slot: SacchSlot,
    /// The slot's burst sets, or why none could be built
    pub burst_sets: Result<Vec<AttackBurstSet>>,
}

/// Predicts SACCH plaintext after a Cipher Mode Command.
#[derive(Debug, Clone)]
pub struct SacchReconstructor {
    reference: SacchReference,
    catalogue: PlaintextCatalogue,
    rotation: SiRotation,
}

impl SacchReconstructor {
    /// Build the reconstruction for `cmc`.
    ///
    /// `session` holds the decoded messages around the command, `collected`
    /// the System Information types gathered from the whole timeslot.
    pub fn new(
        session: &[DecodedControlMessage],
        collected: &[(SiType, Vec<u8>)],
        cmc: &CipherModeCommand,
    ) -> Result<Self> {
        let reference = SacchReference::find(session, cmc)?;
        Ok(Self::from_reference(reference, collected))
    }

    /// Build the reconstruction from an already located reference message.
    pub fn from_reference(reference: SacchReference, collected: &[(SiType, Vec<u8>)]) -> Self {
        debug!(
            si_type = %reference.si_type,
            timing_advance = reference.timing_advance,
            "Last System Information before ciphering at frame {}",
            reference.frame_number
        );

        let catalogue = PlaintextCatalogue::build(&reference, collected);
        let rotation = SiRotation::pruned(&catalogue);
        Self { reference, catalogue, rotation }
    }

    pub fn reference(&self) -> &SacchReference {
        &self.reference
    }

    pub fn catalogue(&self) -> &PlaintextCatalogue {
        &self.catalogue
    }

    pub fn rotation(&self) -> &SiRotation {
        &self.rotation
    }

    /// The SACCH messages following the reference, one period apart.
    pub fn predicted_slots(&self) -> Result<Vec<SacchSlot>> {
        (1..=PREDICTED_SLOTS)
            .map(|i| -> Result<SacchSlot> {
                let si_type =
                    self.rotation.after(self.reference.si_type, i as usize).ok_or_else(|| {
                        AttackError::inconclusive(format!(
                            "{} is not part of the SACCH rotation",
                            self.reference.si_type
                        ))
                    })?;
                Ok(SacchSlot {
                    frame_number: self.reference.frame_number.offset(i64::from(i * SACCH_PERIOD)),
                    si_type,
                })
            })
            .collect()
    }

    /// Encode the predicted plaintext of `slot` and pair it with the capture.
    pub async fn build_slot<E: MessageEncoder + ?Sized>(
        &self,
        slot: SacchSlot,
        encoder: &E,
        ciphertext: &BurstIndex,
    ) -> Result<Vec<AttackBurstSet>> {
        let plaintext = self.catalogue.get(slot.si_type).ok_or_else(|| {
            AttackError::inconclusive(format!(
                "no plaintext for {} predicted at frame {}",
                slot.si_type, slot.frame_number
            ))
        })?;

        let bursts = MessageBursts::try_from(encoder.encode(plaintext).await?)?;
        Ok(AttackBurstSet::for_message(slot.frame_number, &bursts, ciphertext))
    }

    /// Build every predicted slot. A failing slot does not stop the others.
    pub async fn build<E: MessageEncoder + ?Sized>(
        &self,
        encoder: &E,
        ciphertext: &BurstIndex,
    ) -> Result<Vec<SlotCandidates>> {
        let mut slots = Vec::with_capacity(PREDICTED_SLOTS as usize);
        for slot in self.predicted_slots()? {
            let burst_sets = self.build_slot(slot, encoder, ciphertext).await;
            match &burst_sets {
                Ok(sets) => debug!(
                    si_type = %slot.si_type,
                    "Slot {}: {} candidates",
                    slot.frame_number,
                    sets.len()
                ),
                Err(e) => {
                    warn!(si_type = %slot.si_type, "Slot {} skipped: {}", slot.frame_number, e)
                }
            }
            slots.push(SlotCandidates { slot, burst_sets });
        }
        Ok(slots)
    }
}
