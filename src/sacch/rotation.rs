//! SACCH System Information rotation

use super::PlaintextCatalogue;
use crate::types::SiType;

/// Order the network cycles through System Information on SACCH, pruned to
/// the types the capture shows it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiRotation {
    types: Vec<SiType>,
}

impl SiRotation {
    /// Canonical rotation without Type 5ter when the catalogue has none, and
    /// without Type 5bis as well when neither is present.
    pub fn pruned(catalogue: &PlaintextCatalogue) -> Self {
        let has_5bis = catalogue.contains(SiType::Type5bis);
        let has_5ter = catalogue.contains(SiType::Type5ter);

        let types = SiType::SACCH_ROTATION
            .into_iter()
            .filter(|si_type| match si_type {
                SiType::Type5ter => has_5ter,
                SiType::Type5bis => has_5bis || has_5ter,
                _ => true,
            })
            .collect();
        Self { types }
    }

    pub fn types(&self) -> &[SiType] {
        &self.types
    }

    /// Type expected `step` messages after a message of type `last`.
    ///
    /// Returns `None` if `last` is not part of the rotation.
    pub fn after(&self, last: SiType, step: usize) -> Option<SiType> {
        let index = self.types.iter().position(|si_type| *si_type == last)?;
        Some(self.types[(index + step) % self.types.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sacch::SacchReference;
    use crate::test_utils::si_payload;
    use crate::types::FrameNumber;

    fn catalogue(types: &[SiType]) -> PlaintextCatalogue {
        let reference = SacchReference {
            frame_number: FrameNumber::new(4800),
            si_type: SiType::Type5,
            timing_advance: 0,
            payload: si_payload(SiType::Type5, 0),
        };
        let collected: Vec<(SiType, Vec<u8>)> =
            types.iter().map(|si_type| (*si_type, si_payload(*si_type, 0))).collect();
        PlaintextCatalogue::build(&reference, &collected)
    }

    #[test]
    fn full_rotation() {
        let rotation = SiRotation::pruned(&catalogue(&SiType::SACCH_ROTATION));
        assert_eq!(rotation.types(), &SiType::SACCH_ROTATION);
        assert_eq!(rotation.after(SiType::Type5, 1), Some(SiType::Type5bis));
        assert_eq!(rotation.after(SiType::Type5, 2), Some(SiType::Type5ter));
        assert_eq!(rotation.after(SiType::Type5, 3), Some(SiType::Type6));
        assert_eq!(rotation.after(SiType::Type6, 1), Some(SiType::Type5));
    }

    #[test]
    fn missing_5ter_keeps_5bis() {
        let rotation = SiRotation::pruned(&catalogue(&[SiType::Type5bis, SiType::Type6]));
        assert_eq!(rotation.types(), &[SiType::Type5, SiType::Type5bis, SiType::Type6]);
    }

    #[test]
    fn missing_both_drops_both() {
        let rotation = SiRotation::pruned(&catalogue(&[SiType::Type6]));
        assert_eq!(rotation.types(), &[SiType::Type5, SiType::Type6]);
        assert_eq!(rotation.after(SiType::Type5, 1), Some(SiType::Type6));
        assert_eq!(rotation.after(SiType::Type5, 2), Some(SiType::Type5));
        assert_eq!(rotation.after(SiType::Type5bis, 1), None);
    }

    #[test]
    fn missing_5bis_with_5ter_keeps_both() {
        let rotation = SiRotation::pruned(&catalogue(&[SiType::Type5ter, SiType::Type6]));
        assert_eq!(rotation.types(), &SiType::SACCH_ROTATION);
    }
}
