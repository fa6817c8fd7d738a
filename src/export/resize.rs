use image::{DynamicImage, RgbaImage, imageops::FilterType};
use tracing::debug;

use super::types::ExportConfig;

/// Resize the decoded source to the export canvas size. The target comes
/// straight from the resize rule, so this may upscale.
pub fn resize_for_export(img: &DynamicImage, export: &ExportConfig) -> RgbaImage {
    let (orig_width, orig_height) = (img.width(), img.height());
    let (width, height) = export.target_size(orig_width, orig_height);

    // Only resize if dimensions are different
    if (width, height) != (orig_width, orig_height) {
        debug!(
            "Resizing {}x{} -> {}x{} ({})",
            orig_width,
            orig_height,
            width,
            height,
            export.resize_mode.id()
        );
        img.resize_exact(width, height, FilterType::Lanczos3).to_rgba8()
    } else {
        img.to_rgba8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ResizeMode;
    use image::Rgba;

    #[test]
    fn test_percent_resize() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 80, Rgba([9, 9, 9, 255])));
        let export = ExportConfig {
            resize_mode: ResizeMode::Percent,
            resize_value: 50,
            ..Default::default()
        };
        assert_eq!(resize_for_export(&img, &export).dimensions(), (50, 40));
    }

    #[test]
    fn test_no_resize_keeps_pixels() {
        let mut source = RgbaImage::new(3, 2);
        source.put_pixel(1, 1, Rgba([1, 2, 3, 4]));
        let img = DynamicImage::ImageRgba8(source.clone());
        assert_eq!(resize_for_export(&img, &ExportConfig::default()), source);
    }
}
