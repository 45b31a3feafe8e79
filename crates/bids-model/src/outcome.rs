//! Per-row matching outcomes.

use std::fmt;
use std::path::{Path, PathBuf};

/// Why a row could not be bound to a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmatchedReason {
    /// The row carries no usable subject identifier.
    MissingSubjectId,
    /// The subject+session directory does not exist.
    SubjectDirectoryNotFound,
    /// The modality subdirectory implied by the scan type does not exist.
    ScanDirectoryNotFound,
    /// No file in the modality directory satisfies the description filter.
    NoMatchingFile,
    /// A candidate was selected but mirroring it failed.
    CopyFailed(String),
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSubjectId => f.write_str("no subject identifier in row"),
            Self::SubjectDirectoryNotFound => f.write_str("subject directory not found"),
            Self::ScanDirectoryNotFound => f.write_str("scan-type directory not found"),
            Self::NoMatchingFile => f.write_str("no matching file for this description"),
            Self::CopyFailed(detail) => {
                write!(f, "failed to mirror selected file: {detail}")
            }
        }
    }
}

/// Result of candidate matching: a bound file path or a failure reason,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Bound(PathBuf),
    Unmatched(UnmatchedReason),
}

impl MatchOutcome {
    #[must_use]
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    #[must_use]
    pub fn bound_path(&self) -> Option<&Path> {
        match self {
            Self::Bound(path) => Some(path),
            Self::Unmatched(_) => None,
        }
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&UnmatchedReason> {
        match self {
            Self::Bound(_) => None,
            Self::Unmatched(reason) => Some(reason),
        }
    }
}
