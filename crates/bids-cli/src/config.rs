//! Run configuration file (TOML).
//!
//! CLI arguments always override file values; the file only supplies
//! defaults for paths and processing toggles.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = "curate.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tables: TablesConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Acquisition tree the converter deposits into.
    pub bids_dir: Option<PathBuf>,
    /// Destination tree for mirrored files.
    pub mirror_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TablesConfig {
    /// Metadata skeleton CSV.
    pub skeleton: Option<PathBuf>,
    /// Sidecar key-map CSV.
    pub key_map: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProcessingConfig {
    /// Gzip `.nii` outputs after classification.
    pub compress_nifti: bool,
    /// Probe and invoke the external converter before classification.
    pub run_converter: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            compress_nifti: true,
            run_converter: true,
        }
    }
}

/// Load the run configuration.
///
/// An explicitly given path must exist; the default path is optional and
/// silently falls back to defaults when absent.
///
/// # Errors
///
/// Fails when an explicit config file is missing or either file is not
/// valid TOML.
pub fn load_run_config(explicit: Option<&Path>) -> Result<RunConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok(RunConfig::default());
            }
            default
        }
    };
    let text = fs::read_to_string(&path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let config: RunConfig =
        toml::from_str(&text).with_context(|| format!("parse config file {}", path.display()))?;
    debug!(path = %path.display(), "loaded run configuration");
    Ok(config)
}
