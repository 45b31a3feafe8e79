//! Best-candidate matching: binds one expanded row to a concrete file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use bids_model::{MatchOutcome, SESSION_LABEL, ScanClass, SubjectId, UnmatchedReason};

use crate::candidates::DescriptionFilter;
use crate::sidecar::{companion_paths, sidecar_path};

/// Directory roots the matcher works against.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    /// Organized tree the classifier produced; read-only input.
    pub source_root: &'a Path,
    /// Destination tree mirroring the relative path under the source root.
    pub mirror_root: &'a Path,
}

/// The scan a single expanded row asks for.
#[derive(Debug, Clone, Copy)]
pub struct RowScan<'a> {
    pub subject: &'a SubjectId,
    pub class: ScanClass,
    pub description: &'a str,
}

/// Locate the file a row should bind to, mirror it (plus sidecars) into
/// the destination tree, and return the bound path or the failure reason.
pub fn match_row(ctx: MatchContext<'_>, scan: RowScan<'_>) -> MatchOutcome {
    let session_dir = ctx
        .source_root
        .join(scan.subject.directory_name())
        .join(SESSION_LABEL);
    if !session_dir.is_dir() {
        debug!(subject = %scan.subject, dir = %session_dir.display(), "subject directory not found");
        return MatchOutcome::Unmatched(UnmatchedReason::SubjectDirectoryNotFound);
    }

    let modality_dir = session_dir.join(scan.class.modality().relative_path());
    if !modality_dir.is_dir() {
        debug!(subject = %scan.subject, dir = %modality_dir.display(), "scan-type directory not found");
        return MatchOutcome::Unmatched(UnmatchedReason::ScanDirectoryNotFound);
    }

    let filter = DescriptionFilter::for_description(scan.description);
    let Some(selected) = select_candidate(&modality_dir, filter) else {
        debug!(
            subject = %scan.subject,
            description = scan.description,
            dir = %modality_dir.display(),
            "no matching file for this description"
        );
        return MatchOutcome::Unmatched(UnmatchedReason::NoMatchingFile);
    };

    match mirror_selected(ctx, &modality_dir, &selected, scan.class) {
        Ok(bound) => {
            info!(
                subject = %scan.subject,
                description = scan.description,
                file = %selected,
                bound = %bound.display(),
                "bound row to file"
            );
            MatchOutcome::Bound(bound)
        }
        Err(message) => {
            warn!(
                subject = %scan.subject,
                description = scan.description,
                file = %selected,
                error = %message,
                "could not mirror selected file"
            );
            MatchOutcome::Unmatched(UnmatchedReason::CopyFailed(message))
        }
    }
}

/// Pick the filename of the largest candidate in `dir` passing `filter`.
///
/// Candidates are walked in lexicographic filename order and only a
/// strictly greater byte size displaces the current best, so equal-size
/// ties resolve to the lexicographically smallest filename.
fn select_candidate(dir: &Path, filter: DescriptionFilter) -> Option<String> {
    let entries = fs::read_dir(dir).ok()?;
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| filter.matches(name))
        .collect();
    names.sort();

    let mut best: Option<(String, u64)> = None;
    for name in names {
        let size = match fs::metadata(dir.join(&name)) {
            Ok(metadata) => metadata.len(),
            Err(_) => continue,
        };
        match &best {
            Some((_, best_size)) if size <= *best_size => {}
            _ => best = Some((name, size)),
        }
    }
    best.map(|(name, _)| name)
}

/// Copy the selected file plus its co-located sidecars into the mirror
/// tree, preserving the relative path under the source root. Identical
/// source and destination means the file is already placed; the copy is
/// skipped.
fn mirror_selected(
    ctx: MatchContext<'_>,
    modality_dir: &Path,
    filename: &str,
    class: ScanClass,
) -> Result<PathBuf, String> {
    let relative = modality_dir
        .strip_prefix(ctx.source_root)
        .map_err(|_| format!("{} is outside the source root", modality_dir.display()))?;
    let dest_dir = ctx.mirror_root.join(relative);
    let source = modality_dir.join(filename);
    let dest = dest_dir.join(filename);

    if source == dest {
        debug!(file = %dest.display(), "already placed; skipping copy");
        return Ok(dest);
    }

    fs::create_dir_all(&dest_dir).map_err(|error| error.to_string())?;
    fs::copy(&source, &dest).map_err(|error| error.to_string())?;

    let mut extras = Vec::new();
    if let Some(json) = sidecar_path(&source) {
        extras.push(json);
    }
    if class == ScanClass::Diffusion {
        extras.extend(companion_paths(&source));
    }
    for extra in extras {
        if !extra.is_file() {
            continue;
        }
        let Some(name) = extra.file_name() else {
            continue;
        };
        let extra_dest = dest_dir.join(name);
        if let Err(error) = fs::copy(&extra, &extra_dest) {
            // The image itself is bound; a lost sidecar only costs
            // merged columns downstream.
            warn!(file = %extra.display(), error = %error, "could not copy companion file");
        } else {
            debug!(src = %extra.display(), dest = %extra_dest.display(), "copied companion file");
        }
    }

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, size: usize) {
        fs::write(dir.join(name), vec![0u8; size]).unwrap();
    }

    #[test]
    fn largest_candidate_wins() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "FETUS_T2_AX_1.nii.gz", 100);
        write(dir.path(), "FETUS_T2_AX_2.nii.gz", 300);
        write(dir.path(), "FETUS_T2_AX_3.nii.gz", 200);

        let selected = select_candidate(
            dir.path(),
            DescriptionFilter::for_description("T2_axial"),
        );
        assert_eq!(selected.as_deref(), Some("FETUS_T2_AX_2.nii.gz"));
    }

    #[test]
    fn equal_sizes_fall_back_to_lexicographic_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "FETUS_T2_AX_b.nii.gz", 200);
        write(dir.path(), "FETUS_T2_AX_a.nii.gz", 200);

        let selected = select_candidate(
            dir.path(),
            DescriptionFilter::for_description("T2_axial"),
        );
        assert_eq!(selected.as_deref(), Some("FETUS_T2_AX_a.nii.gz"));
    }

    #[test]
    fn no_candidate_yields_none() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "FETUS_T2_COR_1.nii.gz", 100);

        let selected = select_candidate(
            dir.path(),
            DescriptionFilter::for_description("T2_axial"),
        );
        assert_eq!(selected, None);
    }
}
