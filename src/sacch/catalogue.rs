//! System Information plaintext catalogue

use std::collections::BTreeMap;
use tracing::debug;

use crate::cmc::CipherModeCommand;
use crate::types::{DecodedControlMessage, FrameNumber, SiType};
use crate::{AttackError, Result};

/// Byte offset of the timing advance in a SACCH payload.
pub const TIMING_ADVANCE_OFFSET: usize = 1;

/// Distinct System Information types a network sends on SACCH.
pub const MAX_SI_TYPES: usize = 4;

/// Last System Information on the session's SACCH before ciphering started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SacchReference {
    pub frame_number: FrameNumber,
    pub si_type: SiType,
    pub timing_advance: u8,
    pub payload: Vec<u8>,
}

impl SacchReference {
    /// Find the System Information on the command's subchannel closest before it.
    pub fn find(messages: &[DecodedControlMessage], cmc: &CipherModeCommand) -> Result<Self> {
        let (message, si_type) = messages
            .iter()
            .filter(|message| message.subchannel == cmc.subchannel)
            .filter(|message| message.frame_number.is_before(cmc.frame_number))
            .filter_map(|message| message.si_type().map(|si_type| (message, si_type)))
            .min_by_key(|(message, _)| cmc.frame_number.frames_since(message.frame_number))
            .ok_or_else(|| {
                AttackError::inconclusive(format!(
                    "no System Information on subchannel {} before frame {}",
                    cmc.subchannel, cmc.frame_number
                ))
            })?;

        let timing_advance = *message.payload.get(TIMING_ADVANCE_OFFSET).ok_or_else(|| {
            AttackError::inconclusive(format!(
                "System Information at frame {} is too short to carry a timing advance",
                message.frame_number
            ))
        })?;

        Ok(Self {
            frame_number: message.frame_number,
            si_type,
            timing_advance,
            payload: message.payload.clone(),
        })
    }
}

/// First payload of each SACCH System Information type, in capture order.
///
/// Stops at [`MAX_SI_TYPES`] types. Payloads too short to carry a timing
/// advance are ignored.
pub fn collect_si_types(messages: &[DecodedControlMessage]) -> Vec<(SiType, Vec<u8>)> {
    let mut collected: Vec<(SiType, Vec<u8>)> = Vec::with_capacity(MAX_SI_TYPES);
    for message in messages {
        if collected.len() >= MAX_SI_TYPES {
            break;
        }
        let Some(si_type) = message.si_type() else { continue };
        if message.payload.len() <= TIMING_ADVANCE_OFFSET {
            continue;
        }
        if collected.iter().all(|(seen, _)| *seen != si_type) {
            collected.push((si_type, message.payload.clone()));
        }
    }
    collected
}

/// Known plaintext per System Information type, with the session's timing
/// advance written into every entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaintextCatalogue {
    entries: BTreeMap<SiType, Vec<u8>>,
    timing_advance: u8,
}

impl PlaintextCatalogue {
    /// Seed with the reference message, merge the collected types, then
    /// normalize the timing advance.
    pub fn build(reference: &SacchReference, collected: &[(SiType, Vec<u8>)]) -> Self {
        let timing_advance = reference.timing_advance;
        let seed = BTreeMap::from([(reference.si_type, reference.payload.clone())]);

        let merged = collected.iter().fold(seed, |mut entries, (si_type, payload)| {
            if entries.len() >= MAX_SI_TYPES {
                return entries;
            }
            let stale = entries
                .get(si_type)
                .is_none_or(|known| known.get(TIMING_ADVANCE_OFFSET) != Some(&timing_advance));
            if stale {
                entries.insert(*si_type, payload.clone());
            }
            entries
        });

        let entries = merged
            .into_iter()
            .map(|(si_type, mut payload)| {
                if let Some(byte) = payload.get_mut(TIMING_ADVANCE_OFFSET) {
                    *byte = timing_advance;
                }
                (si_type, payload)
            })
            .collect();

        let catalogue = Self { entries, timing_advance };
        debug!(types = ?catalogue.types().collect::<Vec<_>>(), "Built SACCH plaintext catalogue");
        catalogue
    }

    pub fn get(&self, si_type: SiType) -> Option<&[u8]> {
        self.entries.get(&si_type).map(Vec::as_slice)
    }

    pub fn contains(&self, si_type: SiType) -> bool {
        self.entries.contains_key(&si_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn timing_advance(&self) -> u8 {
        self.timing_advance
    }

    pub fn types(&self) -> impl Iterator<Item = SiType> + '_ {
        self.entries.keys().copied()
    }
}
