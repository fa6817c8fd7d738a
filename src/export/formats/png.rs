use image::{ExtendedColorType, ImageEncoder, RgbaImage, codecs::png::PngEncoder};

use crate::export::ExportError;

/// Encode as PNG, alpha preserved
pub fn encode(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut output = Vec::new();
    let encoder = PngEncoder::new(&mut output);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(output)
}
