//! Taxonomy expansion: one skeleton row becomes five scan rows.

use tracing::info;

use bids_ingest::MetadataTable;
use bids_model::SCAN_TAXONOMY;

/// Column overridden with the taxonomy scan type.
pub const SCAN_TYPE_COLUMN: &str = "scan_type";
/// Column overridden with the taxonomy image description.
pub const IMAGE_DESCRIPTION_COLUMN: &str = "image_description";

/// Expand each skeleton row into one row per taxonomy entry.
///
/// Every output row is a full copy of the input columns with `scan_type`
/// and `image_description` overridden. No row is dropped here; whether a
/// matching file exists is the matcher's decision. Output row count is
/// exactly five times the input count, taxonomy entries grouped per
/// source row.
#[must_use]
pub fn expand_for_scan_types(table: &MetadataTable) -> MetadataTable {
    let mut expanded = MetadataTable {
        headers: table.headers.clone(),
        rows: Vec::with_capacity(table.rows.len() * SCAN_TAXONOMY.len()),
    };
    let scan_type_idx = expanded.ensure_column(SCAN_TYPE_COLUMN);
    let description_idx = expanded.ensure_column(IMAGE_DESCRIPTION_COLUMN);
    let width = expanded.headers.len();

    for row in &table.rows {
        for entry in &SCAN_TAXONOMY {
            let mut scan_row = row.clone();
            scan_row.resize(width, String::new());
            scan_row[scan_type_idx] = entry.class.scan_type().to_string();
            scan_row[description_idx] = entry.image_description.to_string();
            expanded.rows.push(scan_row);
        }
    }

    info!(
        input_rows = table.rows.len(),
        output_rows = expanded.rows.len(),
        "expanded skeleton for scan taxonomy"
    );
    expanded
}
