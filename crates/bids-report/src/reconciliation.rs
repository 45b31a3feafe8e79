//! Human-auditable summary of a reconciliation run.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use bids_model::{MatchOutcome, UnmatchedReason};

/// Matching outcome of one expanded row, as observed by the report.
#[derive(Debug, Clone)]
pub struct RowOutcome {
    pub subject: String,
    pub scan_type: String,
    pub description: String,
    pub outcome: MatchOutcome,
}

/// A bound (scan type, description, filename) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundScan {
    pub scan_type: String,
    pub description: String,
    pub filename: String,
}

/// Derived summary of the matcher's and merger's outputs.
#[derive(Debug, Default)]
pub struct ReconciliationReport {
    /// Subjects present in the skeleton but absent from the file tree.
    pub missing_subjects: Vec<String>,
    /// Subjects present with at least one unmatched scan.
    pub subjects_with_gaps: Vec<String>,
    /// Bound triples per matched subject.
    pub bound: BTreeMap<String, Vec<BoundScan>>,
    /// Every subject seen in the skeleton.
    pub total_subjects: usize,
}

impl ReconciliationReport {
    /// Build the report from per-row outcomes. A subject is *missing*
    /// when every one of its rows failed with the subject-directory
    /// reason; it *has gaps* when some rows failed for any other mix of
    /// reasons.
    #[must_use]
    pub fn from_outcomes(rows: &[RowOutcome]) -> Self {
        let mut per_subject: BTreeMap<String, Vec<&RowOutcome>> = BTreeMap::new();
        for row in rows {
            per_subject.entry(row.subject.clone()).or_default().push(row);
        }

        let mut report = Self {
            total_subjects: per_subject.len(),
            ..Self::default()
        };
        for (subject, rows) in per_subject {
            let all_missing = rows.iter().all(|row| {
                matches!(
                    row.outcome,
                    MatchOutcome::Unmatched(UnmatchedReason::SubjectDirectoryNotFound)
                )
            });
            if all_missing {
                report.missing_subjects.push(subject);
                continue;
            }
            let mut bound = Vec::new();
            let mut has_gap = false;
            for row in rows {
                match &row.outcome {
                    MatchOutcome::Bound(path) => bound.push(BoundScan {
                        scan_type: row.scan_type.clone(),
                        description: row.description.clone(),
                        filename: path
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                    }),
                    MatchOutcome::Unmatched(_) => has_gap = true,
                }
            }
            if has_gap {
                report.subjects_with_gaps.push(subject.clone());
            }
            if !bound.is_empty() {
                report.bound.insert(subject, bound);
            }
        }
        report
    }

    /// Total number of bound files across all subjects.
    #[must_use]
    pub fn total_bound(&self) -> usize {
        self.bound.values().map(Vec::len).sum()
    }

    /// Render the report as plain text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Reconciliation report");
        let _ = writeln!(out, "=====================");
        let _ = writeln!(out, "Subjects in skeleton:   {}", self.total_subjects);
        let _ = writeln!(out, "Missing on disk:        {}", self.missing_subjects.len());
        let _ = writeln!(out, "With unmatched scans:   {}", self.subjects_with_gaps.len());
        let _ = writeln!(out, "Bound files:            {}", self.total_bound());

        if !self.missing_subjects.is_empty() {
            let _ = writeln!(out, "\nMissing subjects:");
            for subject in &self.missing_subjects {
                let _ = writeln!(out, "  - {subject}");
            }
        }
        if !self.subjects_with_gaps.is_empty() {
            let _ = writeln!(out, "\nSubjects with unmatched scans:");
            for subject in &self.subjects_with_gaps {
                let _ = writeln!(out, "  - {subject}");
            }
        }
        if !self.bound.is_empty() {
            let _ = writeln!(out, "\nBound scans:");
            for (subject, scans) in &self.bound {
                let _ = writeln!(out, "  {subject}:");
                for scan in scans {
                    let _ = writeln!(
                        out,
                        "    {} | {} | {}",
                        scan.scan_type, scan.description, scan.filename
                    );
                }
            }
        }
        out
    }
}
