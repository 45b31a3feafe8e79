//! Subject identifiers and their on-disk directory form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A subject identifier as it appears in the metadata skeleton,
/// e.g. `MOMMAR-01-M`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Create a subject identifier from a raw table cell.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::EmptySubjectId` when the value is blank.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptySubjectId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory form of the identifier: every hyphen replaced with an
    /// underscore (`ABC-01-M` -> `ABC_01_M`).
    #[must_use]
    pub fn directory_name(&self) -> String {
        self.0.replace('-', "_")
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_name_replaces_hyphens() {
        let subject = SubjectId::new("ABC-01-M").unwrap();
        assert_eq!(subject.directory_name(), "ABC_01_M");
        assert_eq!(subject.as_str(), "ABC-01-M");
    }

    #[test]
    fn blank_identifier_rejected() {
        assert!(SubjectId::new("   ").is_err());
        assert!(SubjectId::new("").is_err());
    }

    #[test]
    fn identifier_is_trimmed() {
        let subject = SubjectId::new(" XYZ-02-F ").unwrap();
        assert_eq!(subject.as_str(), "XYZ-02-F");
    }
}
