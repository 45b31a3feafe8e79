//! Exclusion log for rows dropped from the final dataset.

use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

/// One dropped row: subject, scan type, description, and the reason it
/// could not be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedScan {
    pub subject: String,
    pub scan_type: String,
    pub description: String,
    pub reason: String,
}

impl ExcludedScan {
    /// The log line written for this exclusion.
    #[must_use]
    pub fn log_line(&self) -> String {
        format!(
            "Scan excluded - subject: {}, scan_type: {}, description: {}, reason: {}",
            self.subject, self.scan_type, self.description, self.reason
        )
    }
}

/// Write the exclusion log, one line per dropped row, creating parent
/// directories on demand.
///
/// # Errors
///
/// Propagates I/O failures; the caller records them without aborting.
pub fn write_exclusion_log(path: &Path, entries: &[ExcludedScan]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut content = String::new();
    for entry in entries {
        content.push_str(&entry.log_line());
        content.push('\n');
    }
    fs::write(path, content)?;
    info!(path = %path.display(), entries = entries.len(), "wrote exclusion log");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_line_carries_all_four_fields() {
        let entry = ExcludedScan {
            subject: "XYZ-02-F".to_string(),
            scan_type: "MR diffusion".to_string(),
            description: "dwi b500_1000".to_string(),
            reason: "subject directory not found".to_string(),
        };
        let line = entry.log_line();
        assert!(line.contains("XYZ-02-F"));
        assert!(line.contains("MR diffusion"));
        assert!(line.contains("dwi b500_1000"));
        assert!(line.contains("subject directory not found"));
    }
}
