//! Curation pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Convert**: gate on the external converter, convert raw folders
//! 2. **Organize**: classify files into the canonical tree, quarantine
//!    undersized diffusion outputs, normalize filenames
//! 3. **Enrich**: expand the skeleton, bind each row to a file, merge
//!    sidecar fields
//! 4. **Report**: exclusion log, reconciliation report, final table
//!
//! Each stage takes the output of the previous stage and returns typed
//! results. Per-item failures are collected into the stage result; only
//! configuration-level problems propagate as errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use bids_ingest::{MetadataTable, SUBJECT_COLUMN, load_key_map, read_skeleton, write_table};
use bids_match::{
    IMAGE_DESCRIPTION_COLUMN, MatchContext, RowScan, SCAN_TYPE_COLUMN, expand_for_scan_types,
    match_row, merge_sidecar,
};
use bids_model::{CanonicalLayout, MatchOutcome, ScanClass, SubjectId, UnmatchedReason};
use bids_organize::{
    CONVERTER_BIN, ClassificationIndex, MoveFailure, check_structure, classify_tree,
    compress_nifti_tree, convert_unprocessed, converter_available, normalize_names,
    quarantine_small_dwi, remove_leftover_dti, subject_dirs,
};
use bids_report::{ExcludedScan, ReconciliationReport, RowOutcome, write_exclusion_log};

use crate::paths::output_path;

/// Column the matcher writes the bound path into.
pub const IMAGE_FILE_COLUMN: &str = "image_file";

// ============================================================================
// Stages 1-2: Convert and Organize
// ============================================================================

/// Options for the organize stage.
#[derive(Debug, Clone, Copy)]
pub struct OrganizeOptions {
    pub run_converter: bool,
    pub compress: bool,
}

/// Result of the organize stage.
#[derive(Debug, Default)]
pub struct OrganizeResult {
    pub subject_count: usize,
    pub moved: usize,
    pub unclassified: usize,
    pub quarantined: usize,
    pub renamed: usize,
    pub compressed: usize,
    /// Raw scan folders with leftovers, per entry name. Advisory.
    pub residue: Vec<(PathBuf, Vec<String>)>,
    /// What the classifier placed where, for downstream consumers.
    pub index: ClassificationIndex,
    /// Layout gaps found after classification. Advisory.
    pub structure_warnings: Vec<String>,
    /// Per-item failures encountered along the way.
    pub errors: Vec<String>,
}

/// Run the converter gate plus classification, quarantine, and cleanup
/// over an acquisition tree.
///
/// # Errors
///
/// Fails when the tree is absent or the converter is required but
/// unavailable; everything else is collected into the result.
pub fn organize(bids_dir: &Path, options: OrganizeOptions) -> Result<OrganizeResult> {
    let span = info_span!("organize", bids_dir = %bids_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    if !bids_dir.is_dir() {
        bail!("acquisition tree not found: {}", bids_dir.display());
    }

    let mut result = OrganizeResult::default();

    if options.run_converter {
        if !converter_available() {
            bail!("{CONVERTER_BIN} is required but not installed or not in PATH");
        }
        let converted = convert_unprocessed(bids_dir);
        info!(folders = converted.converted.len(), "conversion pass complete");
        result.errors.extend(converted.errors);
    }

    let tree = classify_tree(bids_dir).context("classify acquisition tree")?;
    result.subject_count = tree.subjects.len();
    for subject in &tree.subjects {
        result.moved += subject.moved_count();
        result.unclassified += subject.unclassified.len();
        push_failures(&mut result.errors, &subject.failures);
    }
    result.index = tree.index();
    result.residue = tree.residue;

    for subject_dir in subject_dirs(bids_dir).context("list subject directories")? {
        let layout = CanonicalLayout::new(&subject_dir);
        remove_leftover_dti(&subject_dir);
        if options.compress {
            let compressed = compress_nifti_tree(&subject_dir);
            result.compressed += compressed.compressed.len();
            result.errors.extend(compressed.errors);
        }
        let quarantine = quarantine_small_dwi(&layout);
        result.quarantined += quarantine.quarantined.len();
        push_failures(&mut result.errors, &quarantine.failures);
        let renames = normalize_names(&layout);
        result.renamed += renames.renamed.len();
        push_failures(&mut result.errors, &renames.failures);
    }

    result.structure_warnings = check_structure(bids_dir);
    for warning in &result.structure_warnings {
        warn!("{warning}");
    }

    info!(
        subjects = result.subject_count,
        moved = result.moved,
        unclassified = result.unclassified,
        quarantined = result.quarantined,
        renamed = result.renamed,
        compressed = result.compressed,
        residue_dirs = result.residue.len(),
        duration_ms = start.elapsed().as_millis(),
        "organize complete"
    );
    Ok(result)
}

fn push_failures(errors: &mut Vec<String>, failures: &[MoveFailure]) {
    for failure in failures {
        errors.push(format!("{}: {}", failure.path.display(), failure.message));
    }
}

// ============================================================================
// Stages 3-4: Enrich and Report
// ============================================================================

/// Input for the enrich stage.
#[derive(Debug, Clone, Copy)]
pub struct EnrichParams<'a> {
    /// Metadata skeleton CSV.
    pub skeleton: &'a Path,
    /// Sidecar key-map CSV.
    pub key_map: &'a Path,
    /// Organized tree the classifier produced.
    pub source_root: &'a Path,
    /// Destination tree for mirrored files.
    pub mirror_root: &'a Path,
}

/// Result of the enrich stage.
#[derive(Debug)]
pub struct EnrichResult {
    /// The final tabular dataset, unmatched rows already dropped.
    pub table: MetadataTable,
    pub report: ReconciliationReport,
    pub excluded: Vec<ExcludedScan>,
    pub output_csv: PathBuf,
    pub exclusion_log: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    /// Per-item failures encountered along the way.
    pub errors: Vec<String>,
}

/// Expand the skeleton, bind every row, merge sidecars, and write the
/// derived outputs.
///
/// # Errors
///
/// Fails before any mutation when the skeleton or key map cannot be
/// loaded, and when the final dataset cannot be written. Per-row failures
/// surface through the exclusion list and the reconciliation report.
pub fn enrich(params: EnrichParams<'_>) -> Result<EnrichResult> {
    let span = info_span!("enrich", skeleton = %params.skeleton.display());
    let _guard = span.enter();
    let start = Instant::now();

    let mut skeleton = read_skeleton(params.skeleton).context("read skeleton table")?;
    let key_map = load_key_map(params.key_map).context("load key map")?;
    info!(
        rows = skeleton.rows.len(),
        mappings = key_map.len(),
        "loaded skeleton and key map"
    );

    skeleton.set_constant("scan_object", "Live");
    skeleton.set_constant("image_file_format", "NIFTI");
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    skeleton.set_constant("procdate", &today);

    let mut table = expand_for_scan_types(&skeleton);
    let image_idx = table.ensure_column(IMAGE_FILE_COLUMN);
    let ctx = MatchContext {
        source_root: params.source_root,
        mirror_root: params.mirror_root,
    };

    let mut row_outcomes: Vec<RowOutcome> = Vec::with_capacity(table.rows.len());
    let mut excluded = Vec::new();
    let mut keep = vec![true; table.rows.len()];

    for row in 0..table.rows.len() {
        let subject = table.value(row, SUBJECT_COLUMN).unwrap_or("").to_string();
        let scan_type = table.value(row, SCAN_TYPE_COLUMN).unwrap_or("").to_string();
        let description = table
            .value(row, IMAGE_DESCRIPTION_COLUMN)
            .unwrap_or("")
            .to_string();

        let outcome = bind_row(ctx, &subject, &scan_type, &description);
        match &outcome {
            MatchOutcome::Bound(path) => {
                table.set_value(row, image_idx, path.display().to_string());
                merge_sidecar(&mut table, row, path, &key_map);
            }
            MatchOutcome::Unmatched(reason) => {
                excluded.push(ExcludedScan {
                    subject: subject.clone(),
                    scan_type: scan_type.clone(),
                    description: description.clone(),
                    reason: reason.to_string(),
                });
                keep[row] = false;
            }
        }
        row_outcomes.push(RowOutcome {
            subject,
            scan_type,
            description,
            outcome,
        });
    }

    table.retain_rows(|row| keep[row]);
    let report = ReconciliationReport::from_outcomes(&row_outcomes);
    let mut errors = Vec::new();

    let output_csv = output_path(params.skeleton, "_enriched", "csv", "csv");
    write_table(&output_csv, &table).context("write enriched table")?;

    let exclusion_log_path = output_path(params.skeleton, "_excluded_scans", "log", "log");
    let exclusion_log = match write_exclusion_log(&exclusion_log_path, &excluded) {
        Ok(()) => Some(exclusion_log_path),
        Err(error) => {
            errors.push(format!("exclusion log: {error}"));
            None
        }
    };

    let report_file = output_path(params.skeleton, "_reconciliation", "log", "log");
    let report_path = match write_report(&report_file, &report) {
        Ok(()) => Some(report_file),
        Err(error) => {
            errors.push(format!("reconciliation report: {error}"));
            None
        }
    };

    info!(
        subjects = report.total_subjects,
        bound = report.total_bound(),
        excluded = excluded.len(),
        output = %output_csv.display(),
        duration_ms = start.elapsed().as_millis(),
        "enrich complete"
    );

    Ok(EnrichResult {
        table,
        report,
        excluded,
        output_csv,
        exclusion_log,
        report_path,
        errors,
    })
}

/// Bind one expanded row, mapping malformed identifying columns to the
/// appropriate failure reason instead of unwinding.
fn bind_row(
    ctx: MatchContext<'_>,
    subject: &str,
    scan_type: &str,
    description: &str,
) -> MatchOutcome {
    let subject = match SubjectId::new(subject) {
        Ok(subject) => subject,
        Err(_) => return MatchOutcome::Unmatched(UnmatchedReason::MissingSubjectId),
    };
    let class = match ScanClass::from_scan_type(scan_type) {
        Ok(class) => class,
        Err(error) => {
            warn!(subject = %subject, error = %error, "row outside the scan taxonomy");
            return MatchOutcome::Unmatched(UnmatchedReason::NoMatchingFile);
        }
    };
    match_row(
        ctx,
        RowScan {
            subject: &subject,
            class,
            description,
        },
    )
}

fn write_report(path: &Path, report: &ReconciliationReport) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report.render())
}
