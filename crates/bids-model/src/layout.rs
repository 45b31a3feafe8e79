//! The canonical per-subject directory layout.
//!
//! Every subject directory carries the same fixed tree under `ses-01`,
//! created in full before any file is classified:
//!
//! ```text
//! <subject>/ses-01/anat/T1
//! <subject>/ses-01/anat/T2
//! <subject>/ses-01/dwi
//! <subject>/ses-01/fmri
//! <subject>/ses-01/localized
//! <subject>/ses-01/questionable
//! ```

use std::path::{Path, PathBuf};

/// Fixed session label; the pipeline handles single-session studies.
pub const SESSION_LABEL: &str = "ses-01";

/// Canonical modality subfolders under the session directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modality {
    T1,
    T2,
    Dwi,
    Fmri,
    Localized,
    Questionable,
}

impl Modality {
    /// All modalities, in canonical creation order.
    pub const ALL: [Modality; 6] = [
        Modality::T1,
        Modality::T2,
        Modality::Dwi,
        Modality::Fmri,
        Modality::Localized,
        Modality::Questionable,
    ];

    /// Path of this modality's folder relative to the session directory.
    #[must_use]
    pub fn relative_path(self) -> &'static str {
        match self {
            Self::T1 => "anat/T1",
            Self::T2 => "anat/T2",
            Self::Dwi => "dwi",
            Self::Fmri => "fmri",
            Self::Localized => "localized",
            Self::Questionable => "questionable",
        }
    }

    /// Short label for logs and reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::T1 => "T1",
            Self::T2 => "T2",
            Self::Dwi => "dwi",
            Self::Fmri => "fmri",
            Self::Localized => "localized",
            Self::Questionable => "questionable",
        }
    }
}

/// Resolves canonical paths under a single subject root.
#[derive(Debug, Clone)]
pub struct CanonicalLayout {
    subject_root: PathBuf,
}

impl CanonicalLayout {
    pub fn new(subject_root: impl Into<PathBuf>) -> Self {
        Self {
            subject_root: subject_root.into(),
        }
    }

    pub fn subject_root(&self) -> &Path {
        &self.subject_root
    }

    #[must_use]
    pub fn session_dir(&self) -> PathBuf {
        self.subject_root.join(SESSION_LABEL)
    }

    #[must_use]
    pub fn modality_dir(&self, modality: Modality) -> PathBuf {
        self.session_dir().join(modality.relative_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modality_paths_are_canonical() {
        let layout = CanonicalLayout::new("/data/ABC_01_M");
        assert_eq!(
            layout.modality_dir(Modality::T2),
            PathBuf::from("/data/ABC_01_M/ses-01/anat/T2")
        );
        assert_eq!(
            layout.modality_dir(Modality::Questionable),
            PathBuf::from("/data/ABC_01_M/ses-01/questionable")
        );
    }

    #[test]
    fn all_covers_six_subfolders() {
        assert_eq!(Modality::ALL.len(), 6);
        let unique: std::collections::BTreeSet<&str> =
            Modality::ALL.iter().map(|m| m.relative_path()).collect();
        assert_eq!(unique.len(), 6);
    }
}
