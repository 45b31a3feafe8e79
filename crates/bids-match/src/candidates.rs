//! Description-specific candidate filtering.
//!
//! Each image description maps to a filter over the modality directory's
//! file listing. All filters require the compressed image extension;
//! anatomical-plane filters additionally exclude derivative
//! reconstructions carrying the equalized marker.

/// Compressed image extension required of every candidate.
pub const IMAGE_EXTENSION: &str = ".nii.gz";

/// Acquisition-family token required by the anatomical-plane filters.
const FAMILY_MARKER: &str = "fetus";
/// Derivative marker excluded by the anatomical-plane filters.
const DERIVATIVE_MARKER: &str = "eq";

/// Anatomical plane of a structural acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Axial,
    Coronal,
    Sagittal,
}

impl Plane {
    fn token(self) -> &'static str {
        match self {
            Self::Axial => "ax",
            Self::Coronal => "cor",
            Self::Sagittal => "sag",
        }
    }
}

/// Candidate filter derived from an image description label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionFilter {
    /// Structural plane: family marker plus plane token, no derivative.
    Structural(Plane),
    /// Functional: bold marker.
    Functional,
    /// Diffusion: b-value 500 marker.
    Diffusion,
    /// Unknown label: matches nothing.
    Unrecognized,
}

impl DescriptionFilter {
    /// Derive the filter from an `image_description` label.
    #[must_use]
    pub fn for_description(description: &str) -> Self {
        let description = description.to_lowercase();
        if description.contains("axial") {
            Self::Structural(Plane::Axial)
        } else if description.contains("coronal") {
            Self::Structural(Plane::Coronal)
        } else if description.contains("sagittal") {
            Self::Structural(Plane::Sagittal)
        } else if description.contains("bold") {
            Self::Functional
        } else if description.contains("1000") {
            Self::Diffusion
        } else {
            Self::Unrecognized
        }
    }

    /// Whether a directory entry satisfies this filter.
    #[must_use]
    pub fn matches(self, filename: &str) -> bool {
        let name = filename.to_lowercase();
        if !name.ends_with(IMAGE_EXTENSION) {
            return false;
        }
        match self {
            Self::Structural(plane) => {
                name.contains(FAMILY_MARKER)
                    && name.contains(plane.token())
                    && !name.contains(DERIVATIVE_MARKER)
            }
            Self::Functional => name.contains("bold"),
            Self::Diffusion => name.contains("b500"),
            Self::Unrecognized => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_map_to_filters() {
        assert_eq!(
            DescriptionFilter::for_description("T2_axial"),
            DescriptionFilter::Structural(Plane::Axial)
        );
        assert_eq!(
            DescriptionFilter::for_description("T2_coronal"),
            DescriptionFilter::Structural(Plane::Coronal)
        );
        assert_eq!(
            DescriptionFilter::for_description("T2_sagittal"),
            DescriptionFilter::Structural(Plane::Sagittal)
        );
        assert_eq!(
            DescriptionFilter::for_description("bold, resting"),
            DescriptionFilter::Functional
        );
        assert_eq!(
            DescriptionFilter::for_description("dwi b500_1000"),
            DescriptionFilter::Diffusion
        );
        assert_eq!(
            DescriptionFilter::for_description("spectroscopy"),
            DescriptionFilter::Unrecognized
        );
    }

    #[test]
    fn structural_filter_requires_family_and_plane() {
        let filter = DescriptionFilter::Structural(Plane::Axial);
        assert!(filter.matches("FETUS_T2_AX_3.nii.gz"));
        assert!(!filter.matches("FETUS_T2_COR_3.nii.gz"));
        assert!(!filter.matches("ADULT_T2_AX_3.nii.gz"));
        assert!(!filter.matches("FETUS_T2_AX_3.nii"));
    }

    #[test]
    fn structural_filter_excludes_derivatives() {
        let filter = DescriptionFilter::Structural(Plane::Sagittal);
        assert!(filter.matches("FETUS_T2_SAG_2.nii.gz"));
        assert!(!filter.matches("FETUS_T2_SAG_2_Eq_1.nii.gz"));
    }

    #[test]
    fn diffusion_filter_requires_bvalue_marker() {
        let filter = DescriptionFilter::Diffusion;
        assert!(filter.matches("sub_dwi_b500_1000_01.nii.gz"));
        assert!(!filter.matches("sub_dwi_b0_01.nii.gz"));
        assert!(!filter.matches("sub_dwi_b500_1000_01.bval"));
    }

    #[test]
    fn unrecognized_filter_matches_nothing() {
        assert!(!DescriptionFilter::Unrecognized.matches("FETUS_T2_AX.nii.gz"));
    }
}
