//! The metadata skeleton table: reading, column access, writing.
//!
//! The table keeps every cell as a string so that columns the pipeline
//! never touches pass through to the output unmodified.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Column holding the subject identifier in the skeleton table.
pub const SUBJECT_COLUMN: &str = "src_subject_id";

/// A tabular dataset with an open column set.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl MetadataTable {
    /// Index of a column by case-insensitive name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
    }

    /// Index of `name`, appending an empty column when absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Cell value by row index and column name.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Overwrite a cell by row and column index.
    pub fn set_value(&mut self, row: usize, column: usize, value: String) {
        if let Some(cells) = self.rows.get_mut(row)
            && let Some(cell) = cells.get_mut(column)
        {
            *cell = value;
        }
    }

    /// Set the same value in every row, creating the column when needed.
    pub fn set_constant(&mut self, name: &str, value: &str) {
        let idx = self.ensure_column(name);
        for row in &mut self.rows {
            row[idx] = value.to_string();
        }
    }

    /// Keep only the rows whose index satisfies the predicate.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize) -> bool,
    {
        let mut index = 0usize;
        self.rows.retain(|_| {
            let kept = keep(index);
            index += 1;
            kept
        });
    }
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Read the skeleton table from `path`.
///
/// Export tools prepend format preambles before the real header, so the
/// header is taken to be the first row carrying the subject identifier
/// column; anything above it is discarded. Rows are padded or truncated to
/// the header width.
///
/// # Errors
///
/// Fails when the file is missing or unreadable, or when no row carries
/// the subject column.
pub fn read_skeleton(path: &Path) -> Result<MetadataTable> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }

    let header_index = raw_rows
        .iter()
        .position(|row| {
            row.iter()
                .any(|cell| cell.eq_ignore_ascii_case(SUBJECT_COLUMN))
        })
        .ok_or_else(|| IngestError::HeaderNotFound {
            column: SUBJECT_COLUMN.to_string(),
            path: path.to_path_buf(),
        })?;
    if header_index > 0 {
        debug!(
            path = %path.display(),
            skipped_rows = header_index,
            "skipped preamble rows before header"
        );
    }

    let headers = raw_rows[header_index].clone();
    let mut rows = Vec::with_capacity(raw_rows.len().saturating_sub(header_index + 1));
    for record in raw_rows.iter().skip(header_index + 1) {
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            row.push(record.get(idx).cloned().unwrap_or_default());
        }
        rows.push(row);
    }
    Ok(MetadataTable { headers, rows })
}

/// Write a table as CSV, creating parent directories on demand.
///
/// # Errors
///
/// Fails when the destination cannot be created or written.
pub fn write_table(path: &Path, table: &MetadataTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| IngestError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let mut writer =
        WriterBuilder::new()
            .from_path(path)
            .map_err(|error| IngestError::CsvParse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;
    writer
        .write_record(&table.headers)
        .map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|error| IngestError::CsvParse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;
    }
    writer.flush().map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> MetadataTable {
        MetadataTable {
            headers: vec!["src_subject_id".to_string(), "site".to_string()],
            rows: vec![
                vec!["ABC-01-M".to_string(), "site-a".to_string()],
                vec!["XYZ-02-F".to_string(), "site-b".to_string()],
            ],
        }
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let table = sample_table();
        assert_eq!(table.column_index("SRC_SUBJECT_ID"), Some(0));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn ensure_column_appends_once() {
        let mut table = sample_table();
        let idx = table.ensure_column("image_file");
        assert_eq!(idx, 2);
        assert_eq!(table.ensure_column("image_file"), 2);
        assert!(table.rows.iter().all(|row| row.len() == 3));
    }

    #[test]
    fn set_constant_fills_every_row() {
        let mut table = sample_table();
        table.set_constant("scan_object", "Live");
        assert_eq!(table.value(0, "scan_object"), Some("Live"));
        assert_eq!(table.value(1, "scan_object"), Some("Live"));
    }

    #[test]
    fn retain_rows_drops_by_index() {
        let mut table = sample_table();
        table.retain_rows(|idx| idx == 0);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.value(0, "src_subject_id"), Some("ABC-01-M"));
    }
}
