//! Error types for tabular ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing the tabular inputs.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input table not found.
    #[error("table not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV content.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// No row carrying the required column was found.
    #[error("no header row carrying '{column}' found in {path}")]
    HeaderNotFound { column: String, path: PathBuf },

    /// Required column missing from a header row.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Failed to write an output table.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = IngestError::HeaderNotFound {
            column: "src_subject_id".to_string(),
            path: PathBuf::from("/data/skeleton.csv"),
        };
        assert_eq!(
            err.to_string(),
            "no header row carrying 'src_subject_id' found in /data/skeleton.csv"
        );
    }
}
