use crate::geometry::{clamp, pixel_to_ratio, ratio_to_pixel, to_pixel};

use super::types::{Anchor, Placement};

/// Distance kept between an anchored element and the image edges.
pub const ANCHOR_MARGIN: f64 = 12.0;

/// Unclamped anchor position in base-image pixels.
pub fn anchor_top_left(
    anchor: Anchor,
    element_width: u32,
    element_height: u32,
    base_width: u32,
    base_height: u32,
) -> (f64, f64) {
    let (w, h) = (element_width as f64, element_height as f64);
    let (bw, bh) = (base_width as f64, base_height as f64);

    let left = ANCHOR_MARGIN;
    let center_x = (bw - w) / 2.0;
    let right = bw - w - ANCHOR_MARGIN;
    let top = ANCHOR_MARGIN;
    let center_y = (bh - h) / 2.0;
    let bottom = bh - h - ANCHOR_MARGIN;

    match anchor {
        Anchor::TopLeft => (left, top),
        Anchor::TopCenter => (center_x, top),
        Anchor::TopRight => (right, top),
        Anchor::MiddleLeft => (left, center_y),
        Anchor::Center => (center_x, center_y),
        Anchor::MiddleRight => (right, center_y),
        Anchor::BottomLeft => (left, bottom),
        Anchor::BottomCenter => (center_x, bottom),
        Anchor::BottomRight => (right, bottom),
    }
}

/// Top-left pixel of the element on the base image. The element is kept
/// inside the canvas on both axes; truncation to integers happens last.
pub fn resolve_top_left(
    placement: Placement,
    element_width: u32,
    element_height: u32,
    base_width: u32,
    base_height: u32,
) -> (i32, i32) {
    let (x, y) = match placement {
        Placement::Anchor(anchor) => {
            anchor_top_left(anchor, element_width, element_height, base_width, base_height)
        }
        Placement::Custom { x_ratio, y_ratio } => (
            ratio_to_pixel(x_ratio, base_width),
            ratio_to_pixel(y_ratio, base_height),
        ),
    };

    let max_x = (base_width as f64 - element_width as f64).max(0.0);
    let max_y = (base_height as f64 - element_height as f64).max(0.0);
    (to_pixel(clamp(x, 0.0, max_x)), to_pixel(clamp(y, 0.0, max_y)))
}

/// Freezes the anchor's current pixel position into ratios, so a drag that
/// starts from an anchor begins exactly where the element is drawn.
pub fn anchor_to_custom(
    anchor: Anchor,
    element_width: u32,
    element_height: u32,
    base_width: u32,
    base_height: u32,
) -> Placement {
    let (x_ratio, y_ratio) =
        anchor_ratios(anchor, element_width, element_height, base_width, base_height);
    Placement::custom(x_ratio, y_ratio)
}

fn anchor_ratios(
    anchor: Anchor,
    element_width: u32,
    element_height: u32,
    base_width: u32,
    base_height: u32,
) -> (f64, f64) {
    let (x, y) = resolve_top_left(
        Placement::Anchor(anchor),
        element_width,
        element_height,
        base_width,
        base_height,
    );
    (
        pixel_to_ratio(x as f64, base_width),
        pixel_to_ratio(y as f64, base_height),
    )
}

/// Moves a placement by a delta given in base-image pixels. Anchored
/// placements are converted first.
pub fn apply_drag(
    placement: Placement,
    dx: f64,
    dy: f64,
    element_width: u32,
    element_height: u32,
    base_width: u32,
    base_height: u32,
) -> Placement {
    let (x_ratio, y_ratio) = match placement {
        Placement::Custom { x_ratio, y_ratio } => (x_ratio, y_ratio),
        Placement::Anchor(anchor) => {
            anchor_ratios(anchor, element_width, element_height, base_width, base_height)
        }
    };

    let max_x = (base_width as f64 - element_width as f64).max(0.0);
    let max_y = (base_height as f64 - element_height as f64).max(0.0);
    let x = clamp(ratio_to_pixel(x_ratio, base_width) + dx, 0.0, max_x);
    let y = clamp(ratio_to_pixel(y_ratio, base_height) + dy, 0.0, max_y);

    Placement::custom(pixel_to_ratio(x, base_width), pixel_to_ratio(y, base_height))
}
