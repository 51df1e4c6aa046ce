//! SDCCH known-plaintext candidates
//!
//! After a Cipher Mode Command the mobile and network exchange LAPDm UI
//! fill frames whose content is fixed by the standard. The first five SDCCH
//! messages following the command are assumed to be such fill frames.

use tracing::{debug, warn};

use crate::encoder::MessageEncoder;
use crate::types::{AttackBurstSet, BurstIndex, FrameNumber, MessageBursts};
use crate::window::MULTIFRAME;
use crate::Result;

/// LAPDm UI frame with an empty information field, padded with `0x2B`.
pub const LAPDM_UI_FILLER: [u8; 23] = [
    0x03, 0x03, 0x01, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B,
    0x2B, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B, 0x2B,
];

/// SDCCH messages after the Cipher Mode Command attacked as fill frames.
pub const SDCCH_MESSAGES: u32 = 5;

/// Builds the SDCCH candidates around a validated Cipher Mode Command.
#[derive(Debug, Clone)]
pub struct SdcchBurstSetBuilder {
    plaintext: MessageBursts,
}

impl SdcchBurstSetBuilder {
    /// Use already-encoded fill frame bursts.
    pub fn new(plaintext: MessageBursts) -> Self {
        Self { plaintext }
    }

    /// Encode the fill frame once.
    ///
    /// Fails [`AttackError::Inconclusive`](crate::AttackError::Inconclusive)
    /// when the encoder returns fewer than four bursts.
    pub async fn encode<E: MessageEncoder + ?Sized>(encoder: &E) -> Result<Self> {
        let bursts = encoder.encode(&LAPDM_UI_FILLER).await?;
        let plaintext = MessageBursts::try_from(bursts).inspect_err(|e| {
            warn!("LAPDm fill frame encoding unusable: {}", e);
        })?;
        Ok(Self::new(plaintext))
    }

    pub fn plaintext(&self) -> &MessageBursts {
        &self.plaintext
    }

    /// First frame of the `message`-th SDCCH message after the command (1-based).
    pub fn message_base(cmc: FrameNumber, message: u32) -> FrameNumber {
        cmc.offset(i64::from(message * MULTIFRAME))
    }

    /// Build the candidates in ascending frame order: four per message, for
    /// each of the [`SDCCH_MESSAGES`] messages after the command.
    pub fn build(&self, cmc: FrameNumber, ciphertext: &BurstIndex) -> Vec<AttackBurstSet> {
        let sets: Vec<AttackBurstSet> = (1..=SDCCH_MESSAGES)
            .flat_map(|message| {
                AttackBurstSet::for_message(
                    Self::message_base(cmc, message),
                    &self.plaintext,
                    ciphertext,
                )
            })
            .collect();

        let expected = (SDCCH_MESSAGES as usize) * self.plaintext.iter().count();
        if sets.len() < expected {
            warn!("Built {} of {} SDCCH candidates", sets.len(), expected);
        } else {
            debug!("Built {} SDCCH candidates", sets.len());
        }
        sets
    }
}
