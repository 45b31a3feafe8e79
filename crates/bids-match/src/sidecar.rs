//! Structured-sidecar merge into the tabular dataset.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use bids_ingest::{JsonKeyMap, MetadataTable};

use crate::candidates::IMAGE_EXTENSION;

/// Path of the JSON sidecar co-located with an image file: same base
/// name, sidecar extension. `None` when the path does not carry the
/// image extension.
#[must_use]
pub fn sidecar_path(image_path: &Path) -> Option<PathBuf> {
    swap_image_extension(image_path, ".json")
}

/// Companion gradient-direction and gradient-strength files of a
/// diffusion image.
#[must_use]
pub fn companion_paths(image_path: &Path) -> Vec<PathBuf> {
    [".bvec", ".bval"]
        .iter()
        .filter_map(|ext| swap_image_extension(image_path, ext))
        .collect()
}

fn swap_image_extension(image_path: &Path, new_extension: &str) -> Option<PathBuf> {
    let name = image_path.file_name()?.to_str()?;
    let stem = name.strip_suffix(IMAGE_EXTENSION)?;
    Some(image_path.with_file_name(format!("{stem}{new_extension}")))
}

/// Copy mapped sidecar fields into one bound row.
///
/// Unmapped keys are ignored; list values flatten to a single compact
/// JSON string. A missing or malformed sidecar leaves the mapped columns
/// unset and is never fatal for the row, which keeps its bound path.
pub fn merge_sidecar(
    table: &mut MetadataTable,
    row: usize,
    image_path: &Path,
    key_map: &JsonKeyMap,
) {
    let Some(json_path) = sidecar_path(image_path) else {
        warn!(image = %image_path.display(), "bound file does not carry the image extension");
        return;
    };
    if !json_path.is_file() {
        info!(sidecar = %json_path.display(), "no sidecar found; mapped columns left unset");
        return;
    }
    let text = match fs::read_to_string(&json_path) {
        Ok(text) => text,
        Err(source) => {
            warn!(sidecar = %json_path.display(), error = %source, "could not read sidecar");
            return;
        }
    };
    let document: Value = match serde_json::from_str(&text) {
        Ok(document) => document,
        Err(source) => {
            warn!(sidecar = %json_path.display(), error = %source, "malformed sidecar");
            return;
        }
    };
    let Some(object) = document.as_object() else {
        warn!(sidecar = %json_path.display(), "sidecar is not a JSON object");
        return;
    };

    for (json_key, column) in key_map.iter() {
        let Some(value) = object.get(json_key) else {
            continue;
        };
        let idx = table.ensure_column(column);
        table.set_value(row, idx, flatten_value(value));
    }
}

/// Render a sidecar value as a single cell string. Lists and nested
/// documents use compact JSON.
fn flatten_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}
