pub mod error;
pub mod keymap;
pub mod table;

pub use error::{IngestError, Result};
pub use keymap::{JsonKeyMap, load_key_map};
pub use table::{MetadataTable, SUBJECT_COLUMN, read_skeleton, write_table};
