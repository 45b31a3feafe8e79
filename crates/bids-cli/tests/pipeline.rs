//! End-to-end tests for the organize and enrich stages.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use bids_cli::pipeline::{EnrichParams, OrganizeOptions, enrich, organize};

const OPTIONS: OrganizeOptions = OrganizeOptions {
    run_converter: false,
    compress: true,
};

/// One subject with a structural, a diffusion (with sidecar), and a
/// functional acquisition waiting in the raw scan folder.
fn seed_acquisition_tree(base: &Path) {
    let raw = base.join("ABC_01_M").join("DICOM");
    fs::create_dir_all(&raw).unwrap();
    fs::write(raw.join("FETUS_T2_AX_1.nii"), vec![1u8; 2048]).unwrap();
    // Named as already-compressed so the quarantine size check sees the
    // on-disk byte count; large enough to stay out of questionable.
    fs::write(
        raw.join("sub_dwi_b0_00001.nii.gz"),
        vec![2u8; 1_500_000],
    )
    .unwrap();
    fs::write(raw.join("sub_dwi_b0_00001.json"), "{\"EchoTime\": 0.09}").unwrap();
    fs::write(raw.join("rest_bold_1.nii.gz"), vec![3u8; 4096]).unwrap();
}

fn seed_tables(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let skeleton = dir.join("skeleton.csv");
    fs::write(
        &skeleton,
        "image,3\nsrc_subject_id,sex\nABC-01-M,M\nXYZ-02-F,F\n",
    )
    .unwrap();
    let key_map = dir.join("map.csv");
    fs::write(&key_map, "json_name,csv_name\nEchoTime,echo_time\n").unwrap();
    (skeleton, key_map)
}

#[test]
fn organize_then_enrich_binds_and_excludes() {
    let bids = TempDir::new().unwrap();
    let mirror = TempDir::new().unwrap();
    let tables = TempDir::new().unwrap();
    seed_acquisition_tree(bids.path());
    let (skeleton, key_map) = seed_tables(tables.path());

    // ------------------------------------------------------------------
    // Organize
    // ------------------------------------------------------------------
    let organized = organize(bids.path(), OPTIONS).unwrap();
    assert_eq!(organized.subject_count, 1);
    assert_eq!(organized.moved, 4);
    assert_eq!(organized.compressed, 1);
    assert_eq!(organized.quarantined, 0);
    // Both the diffusion image and its sidecar carry the placeholder.
    assert_eq!(organized.renamed, 2);
    assert!(organized.residue.is_empty());
    assert!(organized.structure_warnings.is_empty());

    let session = bids.path().join("ABC_01_M").join("ses-01");
    assert!(session.join("anat/T2/FETUS_T2_AX_1.nii.gz").exists());
    assert!(session.join("dwi/sub_dwi_b500_1000_00001.nii.gz").exists());
    assert!(session.join("dwi/sub_dwi_b500_1000_00001.json").exists());
    assert!(session.join("fmri/rest_bold_1.nii.gz").exists());
    // The emptied raw folder is gone.
    assert!(!bids.path().join("ABC_01_M").join("DICOM").exists());

    // ------------------------------------------------------------------
    // Enrich
    // ------------------------------------------------------------------
    let enriched = enrich(EnrichParams {
        skeleton: &skeleton,
        key_map: &key_map,
        source_root: bids.path(),
        mirror_root: mirror.path(),
    })
    .unwrap();

    let report = &enriched.report;
    assert_eq!(report.total_subjects, 2);
    assert_eq!(report.missing_subjects, vec!["XYZ-02-F".to_string()]);
    assert_eq!(report.subjects_with_gaps, vec!["ABC-01-M".to_string()]);
    assert_eq!(report.total_bound(), 3);

    // Two coronal/sagittal gaps plus five rows for the absent subject.
    assert_eq!(enriched.excluded.len(), 7);
    let missing_dir = enriched
        .excluded
        .iter()
        .filter(|entry| entry.reason == "subject directory not found")
        .count();
    assert_eq!(missing_dir, 5);
    assert!(
        enriched
            .excluded
            .iter()
            .filter(|entry| entry.subject == "XYZ-02-F")
            .all(|entry| entry.reason == "subject directory not found")
    );

    // Final dataset keeps only the bound rows, in expansion order.
    let table = &enriched.table;
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.value(0, "image_description"), Some("T2_axial"));
    assert_eq!(table.value(1, "image_description"), Some("dwi b500_1000"));
    assert_eq!(table.value(2, "image_description"), Some("bold, resting"));
    for row in 0..3 {
        assert_eq!(table.value(row, "src_subject_id"), Some("ABC-01-M"));
        assert_eq!(table.value(row, "scan_object"), Some("Live"));
        assert_eq!(table.value(row, "image_file_format"), Some("NIFTI"));
        assert!(!table.value(row, "procdate").unwrap().is_empty());
        assert!(!table.value(row, "image_file").unwrap().is_empty());
    }

    // Sidecar fields merged only where a sidecar existed.
    assert_eq!(table.value(1, "echo_time"), Some("0.09"));
    assert_eq!(table.value(0, "echo_time"), Some(""));

    // Bound files mirrored with their companions.
    let mirrored = mirror.path().join("ABC_01_M").join("ses-01");
    assert!(mirrored.join("anat/T2/FETUS_T2_AX_1.nii.gz").exists());
    assert!(mirrored.join("dwi/sub_dwi_b500_1000_00001.nii.gz").exists());
    assert!(mirrored.join("dwi/sub_dwi_b500_1000_00001.json").exists());
    assert!(mirrored.join("fmri/rest_bold_1.nii.gz").exists());

    // Derived outputs follow the outputs/<kind>/ convention.
    let outputs = tables.path().join("outputs");
    assert_eq!(enriched.output_csv, outputs.join("csv/skeleton_enriched.csv"));
    assert!(enriched.output_csv.exists());
    let exclusion_log = enriched.exclusion_log.as_ref().unwrap();
    assert_eq!(*exclusion_log, outputs.join("log/skeleton_excluded_scans.log"));
    let log_text = fs::read_to_string(exclusion_log).unwrap();
    assert_eq!(log_text.lines().count(), 7);
    assert!(log_text.contains("subject directory not found"));
    let report_path = enriched.report_path.as_ref().unwrap();
    let report_text = fs::read_to_string(report_path).unwrap();
    assert!(report_text.contains("XYZ-02-F"));
    assert!(report_text.contains("Bound files:            3"));
}

#[test]
fn organize_fails_fast_on_missing_tree() {
    let missing = TempDir::new().unwrap().path().join("absent");
    assert!(organize(&missing, OPTIONS).is_err());
}

#[test]
fn enrich_fails_fast_on_missing_key_map() {
    let bids = TempDir::new().unwrap();
    let tables = TempDir::new().unwrap();
    seed_acquisition_tree(bids.path());
    let (skeleton, _) = seed_tables(tables.path());

    let result = enrich(EnrichParams {
        skeleton: &skeleton,
        key_map: &tables.path().join("absent_map.csv"),
        source_root: bids.path(),
        mirror_root: bids.path(),
    });
    assert!(result.is_err());
}

#[test]
fn enrich_into_source_tree_leaves_files_in_place() {
    let bids = TempDir::new().unwrap();
    let tables = TempDir::new().unwrap();
    seed_acquisition_tree(bids.path());
    let (skeleton, key_map) = seed_tables(tables.path());
    organize(bids.path(), OPTIONS).unwrap();

    let enriched = enrich(EnrichParams {
        skeleton: &skeleton,
        key_map: &key_map,
        source_root: bids.path(),
        mirror_root: bids.path(),
    })
    .unwrap();

    assert_eq!(enriched.report.total_bound(), 3);
    let dwi = bids.path().join("ABC_01_M/ses-01/dwi");
    assert!(dwi.join("sub_dwi_b500_1000_00001.nii.gz").exists());
}
