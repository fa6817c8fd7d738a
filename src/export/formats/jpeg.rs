use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage, codecs::jpeg::JpegEncoder};
use tracing::debug;

use crate::export::ExportError;

/// Composite over an opaque white canvas. JPEG has no alpha channel, so
/// transparent regions must come out white rather than black.
pub fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        let a = p[3] as u32;
        let mix = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([mix(p[0]), mix(p[1]), mix(p[2])])
    })
}

/// Encode as JPEG at `quality` (clamped to 1..=100)
pub fn encode(image: &RgbaImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    let quality = quality.clamp(1, 100);
    let rgb_image = flatten_on_white(image);

    let mut output = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut output, quality);
    encoder.write_image(
        &rgb_image,
        rgb_image.width(),
        rgb_image.height(),
        ExtendedColorType::Rgb8,
    )?;
    debug!("JPEG encoded at quality {}: {} bytes", quality, output.len());
    Ok(output)
}
