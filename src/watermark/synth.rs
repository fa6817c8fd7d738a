use image::{RgbaImage, imageops, imageops::FilterType};
use tracing::{debug, warn};

use super::font::FontResolver;
use super::rotate::rotate_element;
use super::text::render_text;
use super::types::{
    ImageStyle, MAX_IMAGE_SCALE, MIN_IMAGE_SCALE, TextStyle, WatermarkDescriptor, WatermarkKind,
};
use super::SynthesisError;

/// Builds the unrotated watermark element for a canvas of the given size.
///
/// `Ok(None)` means there is nothing to draw (blank text, no watermark image
/// configured); that is not a failure. The element is sized by its own
/// content; the reference size only matters for auto-sized text.
pub fn try_synthesize(
    descriptor: &WatermarkDescriptor,
    reference_width: u32,
    reference_height: u32,
    fonts: &FontResolver,
) -> Result<Option<RgbaImage>, SynthesisError> {
    let element = match descriptor.kind {
        WatermarkKind::Text => {
            let text = descriptor.text.content.trim();
            if text.is_empty() {
                return Ok(None);
            }
            let style = &descriptor.text;
            let font = fonts.resolve(&style.font_family, style.bold, style.italic)?;
            let pixel_size = style.effective_pixel_size(reference_width, reference_height);
            if pixel_size == style.pixel_size {
                render_text(text, style, &font)
            } else {
                let sized = TextStyle {
                    pixel_size,
                    ..style.clone()
                };
                render_text(text, &sized, &font)
            }
        }
        WatermarkKind::Image => synthesize_image(&descriptor.image)?,
    };

    if let Some(element) = &element {
        debug!(
            kind = descriptor.kind.as_str(),
            width = element.width(),
            height = element.height(),
            reference_width,
            reference_height,
            "Synthesized watermark element"
        );
    }

    Ok(element)
}

/// Like [`try_synthesize`], but any failure is logged and treated as "no
/// watermark". This is what the live preview wants.
pub fn synthesize(
    descriptor: &WatermarkDescriptor,
    reference_width: u32,
    reference_height: u32,
    fonts: &FontResolver,
) -> Option<RgbaImage> {
    match try_synthesize(descriptor, reference_width, reference_height, fonts) {
        Ok(element) => element,
        Err(e) => {
            warn!("Failed to synthesize watermark: {}", e);
            None
        }
    }
}

/// Synthesizes and applies the descriptor's rotation.
pub fn try_synthesize_rotated(
    descriptor: &WatermarkDescriptor,
    reference_width: u32,
    reference_height: u32,
    fonts: &FontResolver,
) -> Result<Option<RgbaImage>, SynthesisError> {
    Ok(
        try_synthesize(descriptor, reference_width, reference_height, fonts)?
            .map(|element| rotate_element(&element, descriptor.rotation_degrees)),
    )
}

pub fn synthesize_rotated(
    descriptor: &WatermarkDescriptor,
    reference_width: u32,
    reference_height: u32,
    fonts: &FontResolver,
) -> Option<RgbaImage> {
    synthesize(descriptor, reference_width, reference_height, fonts)
        .map(|element| rotate_element(&element, descriptor.rotation_degrees))
}

fn synthesize_image(style: &ImageStyle) -> Result<Option<RgbaImage>, SynthesisError> {
    let path = &style.source_path;
    if path.as_os_str().is_empty() {
        return Ok(None);
    }
    if !path.exists() {
        debug!("Watermark image {:?} does not exist, skipping", path);
        return Ok(None);
    }

    let source = image::open(path)?.to_rgba8();
    let (width, height) = source.dimensions();
    let scale = style.scale_percent.clamp(MIN_IMAGE_SCALE, MAX_IMAGE_SCALE) as u64;
    let new_width = ((width as u64 * scale / 100) as u32).max(1);
    let new_height = ((height as u64 * scale / 100) as u32).max(1);

    let mut scaled = if (new_width, new_height) == (width, height) {
        source
    } else {
        imageops::resize(&source, new_width, new_height, FilterType::Lanczos3)
    };

    let opacity = style.opacity.min(100) as u32;
    if opacity < 100 {
        for px in scaled.pixels_mut() {
            px[3] = ((px[3] as u32 * opacity + 50) / 100) as u8;
        }
    }

    Ok(Some(scaled))
}
