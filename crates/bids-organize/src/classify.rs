//! Moves raw acquisition files into the canonical per-subject tree.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use bids_model::{CanonicalLayout, Modality};

use crate::rules::classify_filename;

/// Name of the raw scan folder the external converter deposits into.
pub const RAW_SCAN_DIR: &str = "DICOM";

/// A failed file operation, recorded instead of unwinding the batch.
#[derive(Debug)]
pub struct MoveFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of classifying one subject directory.
#[derive(Debug, Default)]
pub struct SubjectClassification {
    pub subject: String,
    /// Destination paths of moved files, by modality.
    pub moved: BTreeMap<Modality, Vec<PathBuf>>,
    /// Files matching no classification rule, left in place.
    pub unclassified: Vec<PathBuf>,
    pub failures: Vec<MoveFailure>,
}

impl SubjectClassification {
    #[must_use]
    pub fn moved_count(&self) -> usize {
        self.moved.values().map(Vec::len).sum()
    }
}

/// Classification index across a whole tree: subject directory name to
/// modality to destination file list. Handed to downstream stages so they
/// need not re-derive what the classifier placed where.
pub type ClassificationIndex = BTreeMap<String, BTreeMap<Modality, Vec<PathBuf>>>;

/// Outcome of classifying every subject under a base directory.
#[derive(Debug, Default)]
pub struct TreeClassification {
    pub subjects: Vec<SubjectClassification>,
    /// Raw scan folders that were not empty after classification, with
    /// their leftover entry names. Advisory only.
    pub residue: Vec<(PathBuf, Vec<String>)>,
}

impl TreeClassification {
    /// Index of destination files keyed by subject directory name.
    #[must_use]
    pub fn index(&self) -> ClassificationIndex {
        self.subjects
            .iter()
            .map(|subject| (subject.subject.clone(), subject.moved.clone()))
            .collect()
    }
}

/// Create the six canonical subfolders for one subject.
///
/// # Errors
///
/// Propagates directory-creation failures; classification must not run
/// against a partial layout.
pub fn prepare_layout(subject_dir: &Path) -> io::Result<CanonicalLayout> {
    let layout = CanonicalLayout::new(subject_dir);
    for modality in Modality::ALL {
        fs::create_dir_all(layout.modality_dir(modality))?;
    }
    debug!(subject = %subject_dir.display(), "created canonical subfolders");
    Ok(layout)
}

/// Classify the loose files in one subject's raw scan folder, moving each
/// into the canonical subfolder implied by its filename.
///
/// Move failures are recorded and the file stays at its source; the batch
/// continues.
pub fn classify_subject(subject_dir: &Path, layout: &CanonicalLayout) -> SubjectClassification {
    let subject = directory_name(subject_dir);
    let mut outcome = SubjectClassification {
        subject,
        ..SubjectClassification::default()
    };

    let raw_dir = subject_dir.join(RAW_SCAN_DIR);
    if !raw_dir.is_dir() {
        warn!(subject = %outcome.subject, raw_dir = %raw_dir.display(), "raw scan folder not found");
        return outcome;
    }

    for path in list_files(&raw_dir, &mut outcome.failures) {
        let filename = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name.to_string(),
            None => {
                outcome.failures.push(MoveFailure {
                    path,
                    message: "filename is not valid UTF-8".to_string(),
                });
                continue;
            }
        };
        let Some(modality) = classify_filename(&filename) else {
            debug!(subject = %outcome.subject, file = %filename, "no rule matched; skipping");
            outcome.unclassified.push(path);
            continue;
        };
        let dest = layout.modality_dir(modality).join(&filename);
        match fs::rename(&path, &dest) {
            Ok(()) => {
                info!(
                    subject = %outcome.subject,
                    file = %filename,
                    modality = modality.label(),
                    dest = %dest.display(),
                    "moved"
                );
                outcome.moved.entry(modality).or_default().push(dest);
            }
            Err(source) => {
                warn!(
                    subject = %outcome.subject,
                    file = %filename,
                    error = %source,
                    "could not move file"
                );
                outcome.failures.push(MoveFailure {
                    path,
                    message: source.to_string(),
                });
            }
        }
    }
    outcome
}

/// Classify every subject directory under `base`, then verify each raw
/// scan folder emptied out. Empty raw folders are removed; residue is
/// reported per entry but never aborts the run.
pub fn classify_tree(base: &Path) -> io::Result<TreeClassification> {
    let mut tree = TreeClassification::default();

    for subject_dir in subject_dirs(base)? {
        let layout = prepare_layout(&subject_dir)?;
        tree.subjects.push(classify_subject(&subject_dir, &layout));
    }

    for subject_dir in subject_dirs(base)? {
        let raw_dir = subject_dir.join(RAW_SCAN_DIR);
        if !raw_dir.is_dir() {
            continue;
        }
        let leftovers: Vec<String> = match fs::read_dir(&raw_dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(source) => {
                error!(raw_dir = %raw_dir.display(), error = %source, "could not inspect raw scan folder");
                continue;
            }
        };
        if leftovers.is_empty() {
            if let Err(source) = fs::remove_dir(&raw_dir) {
                error!(raw_dir = %raw_dir.display(), error = %source, "could not remove empty raw scan folder");
            } else {
                info!(raw_dir = %raw_dir.display(), "removed empty raw scan folder");
            }
        } else {
            error!(
                raw_dir = %raw_dir.display(),
                leftover_count = leftovers.len(),
                "raw scan folder not empty after classification"
            );
            for name in &leftovers {
                error!(raw_dir = %raw_dir.display(), entry = %name, "leftover entry");
            }
            tree.residue.push((raw_dir, leftovers));
        }
    }

    Ok(tree)
}

/// Verify each subject carries the session directory and all six canonical
/// subfolders. Advisory: returns one warning line per gap.
#[must_use]
pub fn check_structure(base: &Path) -> Vec<String> {
    let mut warnings = Vec::new();
    let Ok(dirs) = subject_dirs(base) else {
        warnings.push(format!("could not list subject directories under {}", base.display()));
        return warnings;
    };
    if dirs.is_empty() {
        warnings.push(format!("no subject directories under {}", base.display()));
        return warnings;
    }
    for subject_dir in dirs {
        let layout = CanonicalLayout::new(&subject_dir);
        if !layout.session_dir().is_dir() {
            warnings.push(format!(
                "{}: missing session directory",
                directory_name(&subject_dir)
            ));
            continue;
        }
        for modality in Modality::ALL {
            if !layout.modality_dir(modality).is_dir() {
                warnings.push(format!(
                    "{}: missing {} subfolder",
                    directory_name(&subject_dir),
                    modality.relative_path()
                ));
            }
        }
    }
    warnings
}

/// Subject directories directly under `base`, sorted by name.
pub fn subject_dirs(base: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(base)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

pub(crate) fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn list_files(dir: &Path, failures: &mut Vec<MoveFailure>) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            failures.push(MoveFailure {
                path: dir.to_path_buf(),
                message: source.to_string(),
            });
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}
