use ab_glyph::{Font, OutlinedGlyph, PxScale, ScaleFont, point};
use image::{GrayImage, Rgba, RgbaImage};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};

use super::blend::blend_over;
use super::font::ResolvedFont;
use super::types::{MAX_SHADOW_OFFSET, TextStyle};

/// Transparent border kept around the glyph box on every side.
pub const TEXT_PADDING: u32 = 4;

/// Horizontal shear applied per pixel of height for synthetic italics.
const ITALIC_SKEW: f32 = 0.2;

struct PlacedGlyph {
    outline: OutlinedGlyph,
    baseline: f32,
}

/// Axis-aligned box in layout space, after any italic shear.
#[derive(Clone, Copy)]
struct LayoutBounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

fn opacity_alpha(opacity: u8) -> u8 {
    (255.0 * opacity.min(100) as f32 / 100.0).round() as u8
}

fn bold_radius(pixel_size: u32) -> u32 {
    ((pixel_size as f32 / 40.0).round() as u32).max(1)
}

fn stroke_radius(width: u32) -> u32 {
    width.max(1).div_ceil(2)
}

fn layout(text: &str, font: &ResolvedFont, pixel_size: u32) -> Vec<PlacedGlyph> {
    let scale = PxScale::from(pixel_size as f32);
    let scaled = font.font.as_scaled(scale);
    let line_height = scaled.ascent() - scaled.descent() + scaled.line_gap();

    let mut placed = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let baseline = scaled.ascent() + line_no as f32 * line_height;
        let mut caret = 0.0;
        let mut previous = None;

        for c in line.chars().filter(|c| !c.is_control()) {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outline) = font.font.outline_glyph(glyph) {
                placed.push(PlacedGlyph { outline, baseline });
            }
        }
    }
    placed
}

fn measure(glyphs: &[PlacedGlyph], skew: f32) -> Option<LayoutBounds> {
    glyphs
        .iter()
        .map(|g| {
            let b = g.outline.px_bounds();
            // Pixels above the baseline lean right, descenders lean left
            LayoutBounds {
                min_x: b.min.x - (b.max.y - g.baseline).max(0.0) * skew,
                min_y: b.min.y,
                max_x: b.max.x + (g.baseline - b.min.y).max(0.0) * skew,
                max_y: b.max.y,
            }
        })
        .reduce(|a, b| LayoutBounds {
            min_x: a.min_x.min(b.min_x),
            min_y: a.min_y.min(b.min_y),
            max_x: a.max_x.max(b.max_x),
            max_y: a.max_y.max(b.max_y),
        })
}

/// Rasterizes the glyph coverage of every placed glyph into one mask whose
/// origin sits `margin` pixels above and left of the tight box.
fn rasterize_coverage(
    glyphs: &[PlacedGlyph],
    bounds: LayoutBounds,
    margin: u32,
    skew: f32,
) -> GrayImage {
    let origin_x = bounds.min_x.floor() - margin as f32;
    let origin_y = bounds.min_y.floor() - margin as f32;
    let width = (bounds.max_x.ceil() - bounds.min_x.floor()) as u32 + 2 * margin;
    let height = (bounds.max_y.ceil() - bounds.min_y.floor()) as u32 + 2 * margin;

    let mut mask = GrayImage::new(width.max(1), height.max(1));

    for glyph in glyphs {
        let b = glyph.outline.px_bounds();
        glyph.outline.draw(|x, y, coverage| {
            let py = b.min.y + y as f32;
            let shift = (glyph.baseline - (py + 0.5)) * skew;
            let fx = b.min.x + x as f32 + shift - origin_x;
            let iy = (py - origin_y).round() as i64;
            if iy < 0 || iy >= mask.height() as i64 {
                return;
            }

            let x0 = fx.floor();
            let frac = fx - x0;
            for (ix, weight) in [(x0 as i64, 1.0 - frac), (x0 as i64 + 1, frac)] {
                if weight <= 0.0 || ix < 0 || ix >= mask.width() as i64 {
                    continue;
                }
                let px = mask.get_pixel_mut(ix as u32, iy as u32);
                let value = px[0] as f32 + coverage * weight * 255.0;
                px[0] = value.round().min(255.0) as u8;
            }
        });
    }

    mask
}

/// Source-over paints `color` through `mask` onto `canvas` at `(ox, oy)`.
fn paint_mask(canvas: &mut RgbaImage, mask: &GrayImage, ox: u32, oy: u32, color: Rgba<u8>) {
    if color[3] == 0 {
        return;
    }
    for (x, y, coverage) in mask.enumerate_pixels() {
        let coverage = coverage[0];
        if coverage == 0 {
            continue;
        }
        let (cx, cy) = (x + ox, y + oy);
        if cx >= canvas.width() || cy >= canvas.height() {
            continue;
        }
        let alpha = (color[3] as u32 * coverage as u32 + 127) / 255;
        let src = Rgba([color[0], color[1], color[2], alpha as u8]);
        blend_over(canvas.get_pixel_mut(cx, cy), src);
    }
}

/// The band a pen of the stroke width would cover, centered on the outline.
fn stroke_band(mask: &GrayImage, radius: u32) -> GrayImage {
    let disk = Mask::disk(radius.min(u8::MAX as u32) as u8);
    let outer = grayscale_dilate(mask, &disk);
    let inner = grayscale_erode(mask, &disk);

    let mut band = outer;
    for (px, inside) in band.pixels_mut().zip(inner.pixels()) {
        px[0] = px[0].min(255 - inside[0]);
    }
    band
}

/// Renders `text` back to front: shadow, outline, fill. Returns `None` when
/// the font produced no drawable glyphs.
pub(crate) fn render_text(text: &str, style: &TextStyle, font: &ResolvedFont) -> Option<RgbaImage> {
    let skew = if font.synthetic_italic { ITALIC_SKEW } else { 0.0 };
    let glyphs = layout(text, font, style.pixel_size.max(1));
    let bounds = measure(&glyphs, skew)?;

    let bold = if font.synthetic_bold {
        bold_radius(style.pixel_size)
    } else {
        0
    };
    let stroke = if style.outline_enabled {
        stroke_radius(style.outline_width_px)
    } else {
        0
    };

    let mut mask = rasterize_coverage(&glyphs, bounds, TEXT_PADDING + bold + stroke, skew);
    if bold > 0 {
        mask = grayscale_dilate(&mask, &Mask::disk(bold.min(u8::MAX as u32) as u8));
    }

    let (dx, dy) = if style.shadow_enabled {
        let (dx, dy) = style.shadow_offset;
        (
            dx.clamp(-MAX_SHADOW_OFFSET, MAX_SHADOW_OFFSET),
            dy.clamp(-MAX_SHADOW_OFFSET, MAX_SHADOW_OFFSET),
        )
    } else {
        (0, 0)
    };
    let (ox, oy) = ((-dx).max(0) as u32, (-dy).max(0) as u32);
    let mut canvas = RgbaImage::new(
        mask.width() + dx.unsigned_abs(),
        mask.height() + dy.unsigned_abs(),
    );

    if style.shadow_enabled {
        let sx = (ox as i32 + dx) as u32;
        let sy = (oy as i32 + dy) as u32;
        paint_mask(&mut canvas, &mask, sx, sy, style.shadow_color.to_pixel());
    }

    if style.outline_enabled {
        let band = stroke_band(&mask, stroke);
        paint_mask(&mut canvas, &band, ox, oy, style.outline_color.with_alpha(255));
    }

    let fill = style.fill_color.with_alpha(opacity_alpha(style.fill_opacity));
    paint_mask(&mut canvas, &mask, ox, oy, fill);

    Some(canvas)
}
