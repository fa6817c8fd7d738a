pub mod jpeg;
pub mod png;

use image::RgbaImage;

use super::ExportError;
use super::types::OutputFormat;

/// Encodes a finished composite in the requested format.
pub fn encode(
    image: &RgbaImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, ExportError> {
    match format {
        OutputFormat::Png => png::encode(image),
        OutputFormat::Jpeg => jpeg::encode(image, jpeg_quality),
    }
}
