//! The fixed scan taxonomy each subject session is expected to produce.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::layout::Modality;

/// Scan families recognized by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScanClass {
    StructuralT2,
    Diffusion,
    Functional,
}

impl ScanClass {
    /// The `scan_type` column label for this class.
    #[must_use]
    pub fn scan_type(self) -> &'static str {
        match self {
            Self::StructuralT2 => "MR structural (T2)",
            Self::Diffusion => "MR diffusion",
            Self::Functional => "fMRI",
        }
    }

    /// Parse a `scan_type` column value.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::UnknownScanType` for labels outside the taxonomy.
    pub fn from_scan_type(value: &str) -> Result<Self> {
        match value.trim() {
            "MR structural (T2)" => Ok(Self::StructuralT2),
            "MR diffusion" => Ok(Self::Diffusion),
            "fMRI" => Ok(Self::Functional),
            other => Err(ModelError::UnknownScanType(other.to_string())),
        }
    }

    /// Canonical subfolder searched when binding a row of this class.
    #[must_use]
    pub fn modality(self) -> Modality {
        match self {
            Self::StructuralT2 => Modality::T2,
            Self::Diffusion => Modality::Dwi,
            Self::Functional => Modality::Fmri,
        }
    }
}

/// One expected scan per subject session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub class: ScanClass,
    pub image_description: &'static str,
}

/// The fixed expansion taxonomy, in output order. Each skeleton row becomes
/// exactly one row per entry.
pub const SCAN_TAXONOMY: [TaxonomyEntry; 5] = [
    TaxonomyEntry {
        class: ScanClass::StructuralT2,
        image_description: "T2_axial",
    },
    TaxonomyEntry {
        class: ScanClass::StructuralT2,
        image_description: "T2_coronal",
    },
    TaxonomyEntry {
        class: ScanClass::StructuralT2,
        image_description: "T2_sagittal",
    },
    TaxonomyEntry {
        class: ScanClass::Diffusion,
        image_description: "dwi b500_1000",
    },
    TaxonomyEntry {
        class: ScanClass::Functional,
        image_description: "bold, resting",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_has_five_unique_entries() {
        let unique: std::collections::BTreeSet<(&str, &str)> = SCAN_TAXONOMY
            .iter()
            .map(|entry| (entry.class.scan_type(), entry.image_description))
            .collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn scan_type_labels_round_trip() {
        for entry in &SCAN_TAXONOMY {
            let parsed = ScanClass::from_scan_type(entry.class.scan_type()).unwrap();
            assert_eq!(parsed, entry.class);
        }
    }

    #[test]
    fn unknown_scan_type_rejected() {
        assert!(ScanClass::from_scan_type("CT perfusion").is_err());
    }

    #[test]
    fn classes_resolve_to_searched_modalities() {
        assert_eq!(ScanClass::StructuralT2.modality(), Modality::T2);
        assert_eq!(ScanClass::Diffusion.modality(), Modality::Dwi);
        assert_eq!(ScanClass::Functional.modality(), Modality::Fmri);
    }
}
