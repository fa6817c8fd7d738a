use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::ExportError;
use super::formats;
use super::resize::resize_for_export;
use super::types::ExportConfig;
use crate::metadata::descriptor_for_source;
use crate::watermark::{
    FontResolver, Placement, WatermarkDescriptor, overlay, resolve_top_left, try_synthesize_rotated,
};

/// One encoded export, ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// `false` when there was nothing to draw and the base went out verbatim
    pub watermarked: bool,
}

fn normalize_dir(dir: &Path) -> PathBuf {
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    dir.canonicalize()
        .or_else(|_| std::path::absolute(dir))
        .unwrap_or_else(|_| dir.to_path_buf())
}

/// Directory the source file lives in
pub fn source_dir(source: &Path) -> PathBuf {
    normalize_dir(source.parent().unwrap_or(Path::new(".")))
}

/// Refuses sources whose own directory is the output directory when the
/// export config asks for that protection.
pub fn check_destination(source: &Path, export: &ExportConfig) -> Result<(), ExportError> {
    if export.prevent_export_to_source_dir
        && source_dir(source) == normalize_dir(&export.output_dir)
    {
        return Err(ExportError::SourceDestCollision(source.to_path_buf()));
    }
    Ok(())
}

/// Source-over composite of `element` onto `base` at the position the
/// placement resolves to. Returns the top-left used.
pub fn compose(base: &mut RgbaImage, element: &RgbaImage, placement: Placement) -> (i32, i32) {
    let (x, y) = resolve_top_left(
        placement,
        element.width(),
        element.height(),
        base.width(),
        base.height(),
    );
    overlay(base, element, x as i64, y as i64);
    (x, y)
}

/// Builds the full-resolution composite for `source` without encoding it.
pub fn render_composite(
    source: &Path,
    descriptor: &WatermarkDescriptor,
    export: &ExportConfig,
    fonts: &FontResolver,
) -> Result<(RgbaImage, bool), ExportError> {
    check_destination(source, export)?;

    let decoded = image::open(source).map_err(|e| ExportError::Decode {
        path: source.to_path_buf(),
        source: e,
    })?;
    let mut base = resize_for_export(&decoded, export);
    let (width, height) = base.dimensions();

    // The element is synthesized for the canvas it lands on, after resizing
    let descriptor = descriptor_for_source(descriptor, source);
    let Some(element) = try_synthesize_rotated(&descriptor, width, height, fonts)? else {
        debug!("No watermark for {:?}, exporting base unchanged", source);
        return Ok((base, false));
    };

    let (x, y) = compose(&mut base, &element, descriptor.placement);
    debug!(
        "Composited {}x{} element at ({}, {}) on {}x{} canvas for {:?}",
        element.width(),
        element.height(),
        x,
        y,
        width,
        height,
        source
    );
    Ok((base, true))
}

/// Decode, resize, watermark and encode one source image.
pub fn render(
    source: &Path,
    descriptor: &WatermarkDescriptor,
    export: &ExportConfig,
    fonts: &FontResolver,
) -> Result<RenderedImage, ExportError> {
    let (composite, watermarked) = render_composite(source, descriptor, export, fonts)?;
    let bytes = formats::encode(&composite, export.format, export.jpeg_quality)?;

    Ok(RenderedImage {
        bytes,
        width: composite.width(),
        height: composite.height(),
        watermarked,
    })
}
