//! Undersized diffusion output quarantine and filename normalization.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use bids_model::{CanonicalLayout, Modality};

use crate::classify::{MoveFailure, list_files};

/// Compressed multi-volume diffusion output below this size almost
/// certainly holds no real data.
pub const SMALL_DWI_THRESHOLD: u64 = 1_000_000;

/// Misleading placeholder the source naming tool writes for the b-value
/// range, and the convention it actually encodes.
const BVALUE_PLACEHOLDER: &str = "_b0_";
const BVALUE_RANGE: &str = "_b500_1000_";

/// Stray scanner token removed from functional filenames.
const FMRI_STRAY_TOKEN: &str = "CANB";

/// Outcome of the quarantine pass for one subject.
#[derive(Debug, Default)]
pub struct QuarantineOutcome {
    /// Files relocated to `questionable`.
    pub quarantined: Vec<PathBuf>,
    pub failures: Vec<MoveFailure>,
}

/// Outcome of the rename pass for one subject.
#[derive(Debug, Default)]
pub struct RenameOutcome {
    /// (old name, new name) pairs.
    pub renamed: Vec<(String, String)>,
    pub failures: Vec<MoveFailure>,
}

/// Group key for sibling diffusion outputs: the last five characters of
/// the stem after stripping one trailing `.nii`. Sibling b-value series of
/// one acquisition share this per-volume suffix.
#[must_use]
pub fn group_key(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(filename);
    let stem = stem.strip_suffix(".nii").unwrap_or(stem);
    last_chars(stem, 5).to_string()
}

fn last_chars(value: &str, count: usize) -> &str {
    let length = value.chars().count();
    if length <= count {
        return value;
    }
    match value.char_indices().nth(length - count) {
        Some((idx, _)) => &value[idx..],
        None => value,
    }
}

fn is_compressed(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Move undersized compressed diffusion outputs into `questionable`.
///
/// Files are grouped by [`group_key`] so sibling series are triaged as a
/// unit; only the undersized members move.
pub fn quarantine_small_dwi(layout: &CanonicalLayout) -> QuarantineOutcome {
    let mut outcome = QuarantineOutcome::default();
    let dwi_dir = layout.modality_dir(Modality::Dwi);
    if !dwi_dir.is_dir() {
        return outcome;
    }

    let mut groups: std::collections::BTreeMap<String, Vec<PathBuf>> =
        std::collections::BTreeMap::new();
    for path in list_files(&dwi_dir, &mut outcome.failures) {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        groups.entry(group_key(name)).or_default().push(path);
    }

    let questionable_dir = layout.modality_dir(Modality::Questionable);
    for (key, files) in groups {
        let mut small = Vec::new();
        for path in files {
            if !is_compressed(&path) {
                continue;
            }
            let size = match fs::metadata(&path) {
                Ok(metadata) => metadata.len(),
                Err(source) => {
                    outcome.failures.push(MoveFailure {
                        path,
                        message: source.to_string(),
                    });
                    continue;
                }
            };
            if size < SMALL_DWI_THRESHOLD {
                small.push((path, size));
            }
        }
        if small.is_empty() {
            continue;
        }
        warn!(group = %key, count = small.len(), "undersized compressed dwi output");
        for (path, size) in small {
            let Some(name) = path.file_name().map(std::ffi::OsStr::to_os_string) else {
                continue;
            };
            let dest = questionable_dir.join(&name);
            match fs::rename(&path, &dest) {
                Ok(()) => {
                    info!(
                        file = %name.to_string_lossy(),
                        size,
                        dest = %dest.display(),
                        "quarantined undersized file"
                    );
                    outcome.quarantined.push(dest);
                }
                Err(source) => {
                    warn!(file = %name.to_string_lossy(), error = %source, "could not quarantine file");
                    outcome.failures.push(MoveFailure {
                        path,
                        message: source.to_string(),
                    });
                }
            }
        }
    }
    outcome
}

/// Normalize the two known filename quirks for one subject: the diffusion
/// b-value placeholder and the stray functional token. Substitutions are
/// textual and one-shot; an already-renamed file no longer matches.
pub fn normalize_names(layout: &CanonicalLayout) -> RenameOutcome {
    let mut outcome = RenameOutcome::default();
    rename_in_dir(
        &layout.modality_dir(Modality::Dwi),
        BVALUE_PLACEHOLDER,
        BVALUE_RANGE,
        &mut outcome,
    );
    rename_in_dir(
        &layout.modality_dir(Modality::Fmri),
        FMRI_STRAY_TOKEN,
        "",
        &mut outcome,
    );
    outcome
}

fn rename_in_dir(dir: &Path, token: &str, replacement: &str, outcome: &mut RenameOutcome) {
    if !dir.is_dir() {
        return;
    }
    for path in list_files(dir, &mut outcome.failures) {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !name.contains(token) {
            continue;
        }
        let new_name = name.replace(token, replacement);
        let dest = dir.join(&new_name);
        match fs::rename(&path, &dest) {
            Ok(()) => {
                info!(old = %name, new = %new_name, "renamed");
                outcome.renamed.push((name.to_string(), new_name));
            }
            Err(source) => {
                warn!(file = %name, error = %source, "could not rename file");
                outcome.failures.push(MoveFailure {
                    path,
                    message: source.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_key_strips_inner_nii_extension() {
        assert_eq!(group_key("scan_b500_00123.nii.gz"), "00123");
        assert_eq!(group_key("scan_b500_00123.nii"), "00123");
        assert_eq!(group_key("scan_b500_00123.bval"), "00123");
    }

    #[test]
    fn group_key_of_short_stem_is_whole_stem() {
        assert_eq!(group_key("ab.nii.gz"), "ab");
    }

    #[test]
    fn siblings_share_a_group_key() {
        assert_eq!(
            group_key("sub_dwi_b500_01a2b.nii.gz"),
            group_key("sub_dwi_b1000_01a2b.nii")
        );
    }
}
