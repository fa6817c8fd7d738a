use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("No font available for family '{0}'")]
    FontUnavailable(String),

    #[error("Failed to parse font file: {0}")]
    InvalidFont(String),
}
