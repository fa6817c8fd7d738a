use image::{Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

use crate::geometry::rotated_bounds;

fn premultiply(image: &mut RgbaImage) {
    for px in image.pixels_mut() {
        let a = px[3] as u32;
        for c in 0..3 {
            px[c] = ((px[c] as u32 * a + 127) / 255) as u8;
        }
    }
}

fn unpremultiply(image: &mut RgbaImage) {
    for px in image.pixels_mut() {
        let a = px[3] as u32;
        if a == 0 {
            *px = Rgba([0, 0, 0, 0]);
            continue;
        }
        for c in 0..3 {
            px[c] = ((px[c] as u32 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Rotates the element clockwise by `degrees`, growing the canvas so the
/// rotated content is fully contained. Multiples of 90 degrees are exact.
pub fn rotate_element(element: &RgbaImage, degrees: i32) -> RgbaImage {
    match degrees.rem_euclid(360) {
        0 => return element.clone(),
        90 => return imageops::rotate90(element),
        180 => return imageops::rotate180(element),
        270 => return imageops::rotate270(element),
        _ => {}
    }

    let (width, height) = element.dimensions();
    let (new_w, new_h) = rotated_bounds(width, height, degrees as f64);

    // A transparent ring lets bilinear sampling fade the outermost pixels
    // instead of cutting them off. Interpolation runs in premultiplied space
    // so transparent neighbours do not darken the edges.
    let mut padded = RgbaImage::new(width + 2, height + 2);
    imageops::replace(&mut padded, element, 1, 1);
    premultiply(&mut padded);

    // Pixel centers sit on integer coordinates, so the true middle of an
    // n-pixel axis is (n - 1) / 2. Both canvases pivot on that point.
    let src_center = (width as f32 / 2.0 + 0.5, height as f32 / 2.0 + 0.5);
    let dst_center = ((new_w as f32 - 1.0) / 2.0, (new_h as f32 - 1.0) / 2.0);
    let projection = Projection::translate(dst_center.0, dst_center.1)
        * Projection::rotate((degrees as f32).to_radians())
        * Projection::translate(-src_center.0, -src_center.1);

    let mut rotated = RgbaImage::new(new_w, new_h);
    warp_into(
        &padded,
        &projection,
        Interpolation::Bilinear,
        Rgba([0, 0, 0, 0]),
        &mut rotated,
    );
    unpremultiply(&mut rotated);
    rotated
}
