pub mod error;
pub mod layout;
pub mod outcome;
pub mod subject;
pub mod taxonomy;

pub use error::{ModelError, Result};
pub use layout::{CanonicalLayout, Modality, SESSION_LABEL};
pub use outcome::{MatchOutcome, UnmatchedReason};
pub use subject::SubjectId;
pub use taxonomy::{SCAN_TAXONOMY, ScanClass, TaxonomyEntry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_id_serializes_transparently() {
        let subject = SubjectId::new("ABC-01-M").unwrap();
        let json = serde_json::to_string(&subject).expect("serialize subject");
        assert_eq!(json, "\"ABC-01-M\"");
        let round: SubjectId = serde_json::from_str(&json).expect("deserialize subject");
        assert_eq!(round, subject);
    }

    #[test]
    fn taxonomy_modalities_stay_inside_searched_set() {
        for entry in &SCAN_TAXONOMY {
            let modality = entry.class.modality();
            assert!(matches!(
                modality,
                Modality::T2 | Modality::Dwi | Modality::Fmri
            ));
        }
    }
}
