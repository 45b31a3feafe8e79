pub mod candidates;
pub mod expand;
pub mod matcher;
pub mod sidecar;

pub use candidates::{DescriptionFilter, IMAGE_EXTENSION, Plane};
pub use expand::{IMAGE_DESCRIPTION_COLUMN, SCAN_TYPE_COLUMN, expand_for_scan_types};
pub use matcher::{MatchContext, RowScan, match_row};
pub use sidecar::{companion_paths, merge_sidecar, sidecar_path};
