//! External DICOM-to-NIfTI converter gate.
//!
//! The converter is a thin collaborator: it is probed once before
//! classification runs, then invoked per folder still holding raw `.dcm`
//! files with a fixed argument contract. Its output correctness is not
//! this crate's concern; only process exit signaling is observed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{error, info, warn};

/// Converter binary expected on PATH.
pub const CONVERTER_BIN: &str = "dcm2niix";

/// Marker the converter prints from `--version`. The converter exits
/// non-zero even when the version prints, so the marker is the probe.
const VERSION_MARKER: &str = "dcm2niiX version";

/// Outcome of the conversion pass.
#[derive(Debug, Default)]
pub struct ConvertOutcome {
    /// Folders the converter was invoked on.
    pub converted: Vec<PathBuf>,
    pub errors: Vec<String>,
}

/// Probe whether the converter is installed and accessible.
#[must_use]
pub fn converter_available() -> bool {
    match Command::new(CONVERTER_BIN).arg("--version").output() {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if stdout.contains(VERSION_MARKER) {
                info!("{CONVERTER_BIN} is installed and accessible");
                true
            } else {
                error!("{CONVERTER_BIN} returned unexpected output");
                false
            }
        }
        Err(source) => {
            error!(error = %source, "{CONVERTER_BIN} is not installed or not in PATH");
            false
        }
    }
}

/// Run the converter on every folder under `base` still containing `.dcm`
/// files, producing NIfTI plus JSON sidecars in the same folder, then
/// remove the consumed `.dcm` files. Per-folder failures are recorded and
/// the pass continues.
pub fn convert_unprocessed(base: &Path) -> ConvertOutcome {
    let mut outcome = ConvertOutcome::default();
    let mut pending = Vec::new();
    collect_dcm_dirs(base, &mut pending);

    for folder in pending {
        info!(folder = %folder.display(), "converting raw files");
        let status = Command::new(CONVERTER_BIN)
            .args(["-b", "y", "-z", "y", "-f", "%d_%s"])
            .arg(&folder)
            .status();
        match status {
            Ok(status) if status.success() => {
                remove_dcm_files(&folder, &mut outcome.errors);
                outcome.converted.push(folder);
            }
            Ok(status) => {
                let message = format!("{}: converter exited with {status}", folder.display());
                warn!("{message}");
                outcome.errors.push(message);
            }
            Err(source) => {
                let message = format!("{}: could not run converter: {source}", folder.display());
                warn!("{message}");
                outcome.errors.push(message);
            }
        }
    }
    outcome
}

fn collect_dcm_dirs(dir: &Path, pending: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut has_dcm = false;
    let mut subdirs = Vec::new();
    for entry in entries.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
        {
            has_dcm = true;
        }
    }
    if has_dcm {
        pending.push(dir.to_path_buf());
    }
    for subdir in subdirs {
        collect_dcm_dirs(&subdir, pending);
    }
}

fn remove_dcm_files(folder: &Path, errors: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(folder) else {
        return;
    };
    for entry in entries.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        let is_dcm = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"));
        if !is_dcm {
            continue;
        }
        if let Err(source) = fs::remove_file(&path) {
            warn!(file = %path.display(), error = %source, "could not remove consumed raw file");
            errors.push(format!("{}: {source}", path.display()));
        }
    }
}
