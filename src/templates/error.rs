use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Invalid template name: {0:?}")]
    InvalidName(String),

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template {0} is reserved and cannot be deleted")]
    Reserved(String),
}
