use std::path::PathBuf;
use thiserror::Error;

use crate::watermark::SynthesisError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Cannot decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid output directory {0:?}: {1}")]
    InvalidOutputDir(PathBuf, String),

    #[error("Output directory is the source directory of {0:?}")]
    SourceDestCollision(PathBuf),

    #[error("Encode error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Watermark error: {0}")]
    Watermark(#[from] SynthesisError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
