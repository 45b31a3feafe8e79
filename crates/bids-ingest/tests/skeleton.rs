//! Integration tests for skeleton table reading and writing.

use std::fs;

use tempfile::TempDir;

use bids_ingest::{IngestError, read_skeleton, write_table};

#[test]
fn reads_table_with_export_preamble() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skeleton.csv");
    fs::write(
        &path,
        "image,3\nsrc_subject_id,interview_age,sex\nABC-01-M,32,M\nXYZ-02-F,29,F\n",
    )
    .unwrap();

    let table = read_skeleton(&path).unwrap();
    assert_eq!(
        table.headers,
        vec!["src_subject_id", "interview_age", "sex"]
    );
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.value(0, "src_subject_id"), Some("ABC-01-M"));
    assert_eq!(table.value(1, "sex"), Some("F"));
}

#[test]
fn reads_table_without_preamble() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skeleton.csv");
    fs::write(&path, "src_subject_id,site\nABC-01-M,site-a\n").unwrap();

    let table = read_skeleton(&path).unwrap();
    assert_eq!(table.rows.len(), 1);
}

#[test]
fn short_rows_are_padded_to_header_width() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skeleton.csv");
    fs::write(&path, "src_subject_id,site,extra\nABC-01-M,site-a\n").unwrap();

    let table = read_skeleton(&path).unwrap();
    assert_eq!(table.rows[0].len(), 3);
    assert_eq!(table.value(0, "extra"), Some(""));
}

#[test]
fn missing_subject_column_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skeleton.csv");
    fs::write(&path, "participant,site\nABC,site-a\n").unwrap();

    let error = read_skeleton(&path).unwrap_err();
    assert!(matches!(error, IngestError::HeaderNotFound { .. }));
}

#[test]
fn missing_file_fails_before_parsing() {
    let dir = TempDir::new().unwrap();
    let error = read_skeleton(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(error, IngestError::FileNotFound { .. }));
}

#[test]
fn write_round_trips_through_read() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("skeleton.csv");
    fs::write(&source, "src_subject_id,site\nABC-01-M,site-a\n").unwrap();
    let table = read_skeleton(&source).unwrap();

    let dest = dir.path().join("outputs").join("csv").join("out.csv");
    write_table(&dest, &table).unwrap();

    let round = read_skeleton(&dest).unwrap();
    assert_eq!(round.headers, table.headers);
    assert_eq!(round.rows, table.rows);
}
