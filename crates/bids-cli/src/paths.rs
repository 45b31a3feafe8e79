//! Output path conventions for derived tables and logs.
//!
//! Derived outputs land under `outputs/<kind>/` next to the input table,
//! named `<stem><suffix>.<extension>`.

use std::path::{Path, PathBuf};

/// Directory for outputs of a given kind, relative to the input file.
#[must_use]
pub fn output_dir(input: &Path, kind: &str) -> PathBuf {
    let parent = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    parent.join("outputs").join(kind)
}

/// Standardized output path for a derived file.
#[must_use]
pub fn output_path(input: &Path, suffix: &str, kind: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("output");
    output_dir(input, kind).join(format!("{stem}{suffix}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enriched_table_lands_under_outputs_csv() {
        let path = output_path(Path::new("/data/skeleton.csv"), "_enriched", "csv", "csv");
        assert_eq!(
            path,
            PathBuf::from("/data/outputs/csv/skeleton_enriched.csv")
        );
    }

    #[test]
    fn logs_land_under_outputs_log() {
        let path = output_path(
            Path::new("/data/skeleton.csv"),
            "_excluded_scans",
            "log",
            "log",
        );
        assert_eq!(
            path,
            PathBuf::from("/data/outputs/log/skeleton_excluded_scans.log")
        );
    }

    #[test]
    fn bare_filename_defaults_to_current_directory() {
        let path = output_path(Path::new("skeleton.csv"), "_enriched", "csv", "csv");
        assert_eq!(path, PathBuf::from("./outputs/csv/skeleton_enriched.csv"));
    }
}
