use image::{RgbaImage, imageops, imageops::FilterType};

use super::blend::overlay;
use crate::geometry::Rect;

/// Smallest scale factor allowed, so inverse mapping never divides by zero.
pub const MIN_SCALE: f64 = 1e-4;

/// Maps between base-image pixels and a viewport that shows the whole base
/// image scaled to fit and centered. Used only for drawing and for reading
/// pointer input; nothing in here is ever persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTransform {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    scaled_width: u32,
    scaled_height: u32,
    viewport_width: u32,
    viewport_height: u32,
}

impl PreviewTransform {
    pub fn new(viewport_width: u32, viewport_height: u32, base_width: u32, base_height: u32) -> Self {
        let scale = if base_width == 0 || base_height == 0 {
            1.0
        } else {
            (viewport_width as f64 / base_width as f64)
                .min(viewport_height as f64 / base_height as f64)
        }
        .max(MIN_SCALE);

        let scaled_width = (base_width as f64 * scale) as u32;
        let scaled_height = (base_height as f64 * scale) as u32;

        Self {
            scale,
            offset_x: ((viewport_width as f64 - scaled_width as f64) / 2.0).floor(),
            offset_y: ((viewport_height as f64 - scaled_height as f64) / 2.0).floor(),
            scaled_width,
            scaled_height,
            viewport_width,
            viewport_height,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    pub fn scaled_size(&self) -> (u32, u32) {
        (self.scaled_width, self.scaled_height)
    }

    /// Base-image pixel to viewport pixel.
    pub fn to_preview(&self, x: f64, y: f64) -> (f64, f64) {
        (self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }

    /// Viewport pixel to base-image pixel.
    pub fn to_base_point(&self, px: f64, py: f64) -> (f64, f64) {
        ((px - self.offset_x) / self.scale, (py - self.offset_y) / self.scale)
    }

    /// Pointer movement in the viewport to movement in base-image pixels.
    pub fn to_base_delta(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx / self.scale, dy / self.scale)
    }

    /// Where a placed element lands in the viewport.
    pub fn element_rect(&self, top_left: (i32, i32), width: u32, height: u32) -> Rect {
        let (x, y) = self.to_preview(top_left.0 as f64, top_left.1 as f64);
        Rect::new(
            x.floor(),
            y.floor(),
            (width as f64 * self.scale).floor(),
            (height as f64 * self.scale).floor(),
        )
    }

    pub fn hit_test(&self, px: f64, py: f64, top_left: (i32, i32), width: u32, height: u32) -> bool {
        self.element_rect(top_left, width, height).contains(px, py)
    }

    /// Draws the scaled base image centered in the viewport and the element,
    /// scaled by the same factor, at its placed position.
    pub fn render_frame(
        &self,
        base: &RgbaImage,
        element: Option<(&RgbaImage, (i32, i32))>,
    ) -> RgbaImage {
        let mut frame = RgbaImage::new(self.viewport_width.max(1), self.viewport_height.max(1));

        let scaled_base = imageops::resize(
            base,
            self.scaled_width.max(1),
            self.scaled_height.max(1),
            FilterType::Triangle,
        );
        imageops::overlay(
            &mut frame,
            &scaled_base,
            self.offset_x as i64,
            self.offset_y as i64,
        );

        if let Some((element, top_left)) = element {
            let rect = self.element_rect(top_left, element.width(), element.height());
            let scaled_element = imageops::resize(
                element,
                (rect.width as u32).max(1),
                (rect.height as u32).max(1),
                FilterType::Triangle,
            );
            overlay(&mut frame, &scaled_element, rect.x as i64, rect.y as i64);
        }

        frame
    }
}
