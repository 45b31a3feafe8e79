//! Filename classification rules.
//!
//! Rules form an ordered table evaluated top-to-bottom over the
//! lower-cased filename; the first matching rule wins. Priority:
//! localizer, diffusion, T1, T2, functional. A filename matching no rule
//! stays unclassified.

use bids_model::Modality;

/// Markers identifying a diffusion series.
const DIFFUSION_MARKERS: [&str; 4] = ["dti_", "_dwi_", "_dwi", "dwi_"];

/// One classification rule: a predicate over the normalized filename and
/// the destination modality it implies.
pub struct ClassificationRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub destination: Modality,
}

fn is_localizer(name: &str) -> bool {
    name.contains("_loc_")
}

fn is_diffusion(name: &str) -> bool {
    DIFFUSION_MARKERS.iter().any(|marker| name.contains(marker))
}

fn is_t1(name: &str) -> bool {
    name.contains("_t1_")
}

fn is_t2(name: &str) -> bool {
    name.contains("t2_")
}

fn is_functional(name: &str) -> bool {
    name.contains("bold_")
}

/// The ordered rule table. Position encodes priority.
pub const CLASSIFICATION_RULES: [ClassificationRule; 5] = [
    ClassificationRule {
        name: "localizer",
        matches: is_localizer,
        destination: Modality::Localized,
    },
    ClassificationRule {
        name: "diffusion",
        matches: is_diffusion,
        destination: Modality::Dwi,
    },
    ClassificationRule {
        name: "t1",
        matches: is_t1,
        destination: Modality::T1,
    },
    ClassificationRule {
        name: "t2",
        matches: is_t2,
        destination: Modality::T2,
    },
    ClassificationRule {
        name: "functional",
        matches: is_functional,
        destination: Modality::Fmri,
    },
];

/// Classify a raw filename, returning the destination modality of the
/// first matching rule.
#[must_use]
pub fn classify_filename(filename: &str) -> Option<Modality> {
    let normalized = filename.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| (rule.matches)(&normalized))
        .map(|rule| rule.destination)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localizer_outranks_every_other_marker() {
        // Carries both localizer and diffusion markers.
        assert_eq!(
            classify_filename("head_LOC_dwi_001.nii.gz"),
            Some(Modality::Localized)
        );
    }

    #[test]
    fn diffusion_markers_match_case_insensitively() {
        for name in [
            "DTI_scan.nii.gz",
            "scan_dwi_01.nii.gz",
            "scan_dwi.nii.gz",
            "dwi_scan.nii.gz",
        ] {
            assert_eq!(classify_filename(name), Some(Modality::Dwi), "{name}");
        }
    }

    #[test]
    fn diffusion_outranks_anatomical_rules() {
        // A dwi marker plus a T2 marker still lands in dwi.
        assert_eq!(
            classify_filename("sub_dwi_T2_recon.nii.gz"),
            Some(Modality::Dwi)
        );
    }

    #[test]
    fn anatomical_and_functional_markers() {
        assert_eq!(classify_filename("sub_T1_mprage.nii.gz"), Some(Modality::T1));
        assert_eq!(classify_filename("FETUS_T2_AX.nii.gz"), Some(Modality::T2));
        assert_eq!(classify_filename("rest_bold_01.nii.gz"), Some(Modality::Fmri));
    }

    #[test]
    fn unmarked_files_stay_unclassified() {
        assert_eq!(classify_filename("notes.txt"), None);
        assert_eq!(classify_filename("survey_scan.nii.gz"), None);
    }
}
