use image::{Rgba, RgbaImage};

/// Source-over with rounding, so repeated renders of one descriptor agree
/// to the last bit. An opaque destination stays opaque.
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f32 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().min(255.0) as u8;
}

/// Blends `top` onto `bottom` with its top-left at `(x, y)`. Parts that fall
/// outside `bottom` are clipped.
pub fn overlay(bottom: &mut RgbaImage, top: &RgbaImage, x: i64, y: i64) {
    let (bw, bh) = (bottom.width() as i64, bottom.height() as i64);
    for (tx, ty, px) in top.enumerate_pixels() {
        let (cx, cy) = (x + tx as i64, y + ty as i64);
        if cx < 0 || cy < 0 || cx >= bw || cy >= bh {
            continue;
        }
        blend_over(bottom.get_pixel_mut(cx as u32, cy as u32), *px);
    }
}
