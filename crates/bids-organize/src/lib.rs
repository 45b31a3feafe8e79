pub mod classify;
pub mod compress;
pub mod convert;
pub mod quarantine;
pub mod rules;

pub use classify::{
    ClassificationIndex, MoveFailure, RAW_SCAN_DIR, SubjectClassification, TreeClassification,
    check_structure, classify_subject, classify_tree, prepare_layout, subject_dirs,
};
pub use compress::{CompressOutcome, compress_nifti_tree, remove_leftover_dti};
pub use convert::{CONVERTER_BIN, ConvertOutcome, convert_unprocessed, converter_available};
pub use quarantine::{
    QuarantineOutcome, RenameOutcome, SMALL_DWI_THRESHOLD, group_key, normalize_names,
    quarantine_small_dwi,
};
pub use rules::{CLASSIFICATION_RULES, ClassificationRule, classify_filename};
