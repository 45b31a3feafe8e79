use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("empty subject identifier")]
    EmptySubjectId,
    #[error("unknown scan type: {0}")]
    UnknownScanType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
