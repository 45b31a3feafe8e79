//! Sidecar-key to CSV-column mapping.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{IngestError, Result};

const JSON_NAME_COLUMN: &str = "json_name";
const CSV_NAME_COLUMN: &str = "csv_name";

/// Mapping from sidecar key name to tabular column name.
///
/// Static for one run. Many-to-one mappings are not supported: a key
/// appearing twice keeps its last column assignment.
#[derive(Debug, Clone, Default)]
pub struct JsonKeyMap {
    entries: BTreeMap<String, String>,
}

impl JsonKeyMap {
    /// Column bound to a sidecar key, if mapped.
    #[must_use]
    pub fn column_for(&self, json_key: &str) -> Option<&str> {
        self.entries.get(json_key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, column)| (key.as_str(), column.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load a two-column (`json_name`, `csv_name`) mapping table.
///
/// # Errors
///
/// Fails when the file is missing or unreadable, or when either required
/// column is absent from the header.
pub fn load_key_map(path: &Path) -> Result<JsonKeyMap> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader =
        ReaderBuilder::new()
            .from_path(path)
            .map_err(|error| IngestError::CsvParse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

    let headers = reader
        .headers()
        .map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?
        .clone();
    let column_index = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| IngestError::MissingColumn {
                column: name.to_string(),
                path: path.to_path_buf(),
            })
    };
    let json_idx = column_index(JSON_NAME_COLUMN)?;
    let csv_idx = column_index(CSV_NAME_COLUMN)?;

    let mut entries = BTreeMap::new();
    for record in reader.records() {
        let record = record.map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        let json_name = record.get(json_idx).unwrap_or("").trim();
        let csv_name = record.get(csv_idx).unwrap_or("").trim();
        if json_name.is_empty() || csv_name.is_empty() {
            continue;
        }
        // Later duplicates overwrite earlier entries.
        entries.insert(json_name.to_string(), csv_name.to_string());
    }
    debug!(path = %path.display(), entries = entries.len(), "loaded key map");
    Ok(JsonKeyMap { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_map(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_mappings() {
        let file = write_map("json_name,csv_name\nEchoTime,echo_time\nFlipAngle,flip_angle\n");
        let map = load_key_map(file.path()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.column_for("EchoTime"), Some("echo_time"));
        assert_eq!(map.column_for("Unmapped"), None);
    }

    #[test]
    fn later_duplicate_key_wins() {
        let file = write_map("json_name,csv_name\nEchoTime,first\nEchoTime,second\n");
        let map = load_key_map(file.path()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.column_for("EchoTime"), Some("second"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let file = write_map("json_name,other\nEchoTime,echo_time\n");
        let error = load_key_map(file.path()).unwrap_err();
        assert!(matches!(error, IngestError::MissingColumn { .. }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let error = load_key_map(Path::new("/nonexistent/map.csv")).unwrap_err();
        assert!(matches!(error, IngestError::FileNotFound { .. }));
    }
}
