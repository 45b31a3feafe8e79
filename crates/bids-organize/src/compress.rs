//! Post-move cleanup: leftover pre-layout directories and NIfTI compression.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{info, warn};

use bids_model::SESSION_LABEL;

/// Outcome of the compression pass for one subject tree.
#[derive(Debug, Default)]
pub struct CompressOutcome {
    pub compressed: Vec<PathBuf>,
    pub errors: Vec<String>,
}

/// Remove a leftover `ses-01/dti` directory from before the canonical
/// layout existed. Returns whether one was removed.
pub fn remove_leftover_dti(subject_dir: &Path) -> bool {
    let dti_dir = subject_dir.join(SESSION_LABEL).join("dti");
    if !dti_dir.is_dir() {
        return false;
    }
    let had_contents = fs::read_dir(&dti_dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    match fs::remove_dir_all(&dti_dir) {
        Ok(()) => {
            info!(dir = %dti_dir.display(), had_contents, "removed leftover dti folder");
            true
        }
        Err(source) => {
            warn!(dir = %dti_dir.display(), error = %source, "could not remove leftover dti folder");
            false
        }
    }
}

/// Gzip every `.nii` file under `subject_dir` to `.nii.gz`, removing the
/// original on success. Already-compressed files are untouched; per-file
/// errors are recorded and the walk continues.
pub fn compress_nifti_tree(subject_dir: &Path) -> CompressOutcome {
    let mut outcome = CompressOutcome::default();
    visit(subject_dir, &mut outcome);
    outcome
}

fn visit(dir: &Path, outcome: &mut CompressOutcome) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            outcome
                .errors
                .push(format!("{}: {source}", dir.display()));
            return;
        }
    };
    for entry in entries.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if path.is_dir() {
            visit(&path, outcome);
        } else if is_uncompressed_nifti(&path) {
            match compress_file(&path) {
                Ok(dest) => {
                    info!(src = %path.display(), dest = %dest.display(), "compressed");
                    outcome.compressed.push(dest);
                }
                Err(source) => {
                    warn!(file = %path.display(), error = %source, "could not compress file");
                    outcome
                        .errors
                        .push(format!("{}: {source}", path.display()));
                }
            }
        }
    }
}

fn is_uncompressed_nifti(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("nii"))
}

fn compress_file(path: &Path) -> io::Result<PathBuf> {
    let mut dest = path.as_os_str().to_os_string();
    dest.push(".gz");
    let dest = PathBuf::from(dest);

    let mut reader = BufReader::new(File::open(path)?);
    let writer = BufWriter::new(File::create(&dest)?);
    let mut encoder = GzEncoder::new(writer, Compression::default());
    io::copy(&mut reader, &mut encoder)?;
    let mut writer = encoder.finish()?;
    io::Write::flush(&mut writer)?;
    fs::remove_file(path)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn compresses_nii_and_removes_original() {
        let dir = TempDir::new().unwrap();
        let nii = dir.path().join("scan_dwi_01.nii");
        fs::write(&nii, vec![7u8; 4096]).unwrap();

        let outcome = compress_nifti_tree(dir.path());
        assert_eq!(outcome.compressed.len(), 1);
        assert!(outcome.errors.is_empty());
        assert!(!nii.exists());
        assert!(dir.path().join("scan_dwi_01.nii.gz").exists());
    }

    #[test]
    fn leaves_compressed_files_untouched() {
        let dir = TempDir::new().unwrap();
        let gz = dir.path().join("scan_dwi_01.nii.gz");
        fs::write(&gz, b"already compressed").unwrap();

        let outcome = compress_nifti_tree(dir.path());
        assert!(outcome.compressed.is_empty());
        assert!(gz.exists());
    }

    #[test]
    fn removes_leftover_dti_dir() {
        let dir = TempDir::new().unwrap();
        let dti = dir.path().join(SESSION_LABEL).join("dti");
        fs::create_dir_all(&dti).unwrap();
        fs::write(dti.join("old.nii"), b"x").unwrap();

        assert!(remove_leftover_dti(dir.path()));
        assert!(!dti.exists());
        assert!(!remove_leftover_dti(dir.path()));
    }
}
