//! Small numeric helpers shared by the position resolver, the preview
//! transform and the rotation code.

/// Values this close below an integer are treated as that integer when
/// truncating to pixels, so `x / w * w` lands back on `x`.
pub const PIXEL_EPSILON: f64 = 1e-6;

pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(v))
}

/// Converts a ratio of a base dimension into pixels (floating point).
pub fn ratio_to_pixel(ratio: f64, base: u32) -> f64 {
    ratio * base as f64
}

/// Converts a pixel position into a ratio of the base dimension. A zero-sized
/// base yields 0 rather than NaN.
pub fn pixel_to_ratio(pixel: f64, base: u32) -> f64 {
    if base == 0 { 0.0 } else { pixel / base as f64 }
}

/// Truncates a floating-point coordinate to an integer pixel.
pub fn to_pixel(v: f64) -> i32 {
    (v + PIXEL_EPSILON).floor() as i32
}

/// Axis-aligned size of a `width` x `height` rectangle rotated by `degrees`.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let w = width as f64;
    let h = height as f64;
    let new_w = (w * cos + h * sin - PIXEL_EPSILON).ceil().max(1.0);
    let new_h = (w * sin + h * cos - PIXEL_EPSILON).ceil().max(1.0);
    (new_w as u32, new_h as u32)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}
