use crate::color::{Rgb, Rgba8};
use std::path::PathBuf;

pub const MIN_ROTATION: i32 = -180;
pub const MAX_ROTATION: i32 = 180;
pub const MIN_IMAGE_SCALE: u32 = 1;
pub const MAX_IMAGE_SCALE: u32 = 1000;
pub const MAX_SHADOW_OFFSET: i32 = 1000;
/// Smallest font size auto sizing will pick, in pixels.
pub const MIN_AUTO_PIXEL_SIZE: u32 = 12;
/// Replaced by the source photo's capture date when text is rendered.
pub const DATE_PLACEHOLDER: &str = "{date}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkKind {
    Text,
    Image,
}

impl WatermarkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatermarkKind::Text => "text",
            WatermarkKind::Image => "image",
        }
    }
}

/// One of the nine compass positions on the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::Center,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "tl",
            Anchor::TopCenter => "tc",
            Anchor::TopRight => "tr",
            Anchor::MiddleLeft => "cl",
            Anchor::Center => "cc",
            Anchor::MiddleRight => "cr",
            Anchor::BottomLeft => "bl",
            Anchor::BottomCenter => "bc",
            Anchor::BottomRight => "br",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Anchor::ALL.into_iter().find(|a| a.id() == id)
    }
}

/// Where the watermark goes. Custom ratios are fractions of the base image's
/// own width and height and locate the element's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Anchor(Anchor),
    Custom { x_ratio: f64, y_ratio: f64 },
}

impl Placement {
    pub fn custom(x_ratio: f64, y_ratio: f64) -> Self {
        Placement::Custom {
            x_ratio: x_ratio.clamp(0.0, 1.0),
            y_ratio: y_ratio.clamp(0.0, 1.0),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Placement::Custom { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub content: String,
    pub font_family: String,
    pub pixel_size: u32,
    /// When above zero, overrides `pixel_size` with this fraction of the
    /// canvas's shorter side.
    pub auto_size_ratio: f64,
    pub bold: bool,
    pub italic: bool,
    pub fill_color: Rgb,
    /// 0..=100
    pub fill_opacity: u8,
    pub outline_enabled: bool,
    pub outline_width_px: u32,
    pub outline_color: Rgb,
    pub shadow_enabled: bool,
    pub shadow_offset: (i32, i32),
    pub shadow_color: Rgba8,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content: "@TingLans".to_string(),
            font_family: "DejaVu Sans".to_string(),
            pixel_size: 128,
            auto_size_ratio: 0.0,
            bold: false,
            italic: false,
            fill_color: Rgb::WHITE,
            fill_opacity: 70,
            outline_enabled: true,
            outline_width_px: 2,
            outline_color: Rgb::BLACK,
            shadow_enabled: true,
            shadow_offset: (2, 2),
            shadow_color: Rgba8::new(0, 0, 0, 128),
        }
    }
}

impl TextStyle {
    /// Pixel size to render at on a canvas of the given size.
    pub fn effective_pixel_size(&self, canvas_width: u32, canvas_height: u32) -> u32 {
        if self.auto_size_ratio > 0.0 {
            let side = canvas_width.min(canvas_height) as f64;
            ((side * self.auto_size_ratio) as u32).max(MIN_AUTO_PIXEL_SIZE)
        } else {
            self.pixel_size.max(1)
        }
    }

    pub fn uses_date(&self) -> bool {
        self.content.contains(DATE_PLACEHOLDER)
    }
}

/// Keeps an auto-size ratio within `0.0..=1.0`; anything not finite turns
/// auto sizing off.
pub fn clamp_auto_size_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageStyle {
    pub source_path: PathBuf,
    /// 1..=1000, relative to the source's pixel size.
    pub scale_percent: u32,
    /// 0..=100
    pub opacity: u8,
}

impl Default for ImageStyle {
    fn default() -> Self {
        Self {
            source_path: PathBuf::new(),
            scale_percent: 40,
            opacity: 70,
        }
    }
}

/// Snapshot of every watermark parameter. Both the text and image settings
/// are kept so switching `kind` back and forth loses nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkDescriptor {
    pub kind: WatermarkKind,
    pub text: TextStyle,
    pub image: ImageStyle,
    pub rotation_degrees: i32,
    pub placement: Placement,
}

impl Default for WatermarkDescriptor {
    fn default() -> Self {
        Self {
            kind: WatermarkKind::Text,
            text: TextStyle::default(),
            image: ImageStyle::default(),
            rotation_degrees: 0,
            placement: Placement::Anchor(Anchor::BottomRight),
        }
    }
}

/// A single validated edit, as produced by a settings control.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorField {
    Kind(WatermarkKind),
    Text(String),
    FontFamily(String),
    PixelSize(u32),
    AutoSizeRatio(f64),
    Bold(bool),
    Italic(bool),
    FillColor(Rgb),
    FillOpacity(u8),
    OutlineEnabled(bool),
    OutlineWidth(u32),
    OutlineColor(Rgb),
    ShadowEnabled(bool),
    ShadowOffset(i32, i32),
    ShadowColor(Rgba8),
    ImagePath(PathBuf),
    ImageScalePercent(u32),
    ImageOpacity(u8),
    Rotation(i32),
    Placement(Placement),
}

impl WatermarkDescriptor {
    /// Applies one edit, clamping numeric values into their legal ranges.
    pub fn apply(&mut self, field: DescriptorField) {
        match field {
            DescriptorField::Kind(kind) => self.kind = kind,
            DescriptorField::Text(text) => self.text.content = text,
            DescriptorField::FontFamily(family) => self.text.font_family = family,
            DescriptorField::PixelSize(px) => self.text.pixel_size = px.max(1),
            DescriptorField::AutoSizeRatio(r) => {
                self.text.auto_size_ratio = clamp_auto_size_ratio(r)
            }
            DescriptorField::Bold(b) => self.text.bold = b,
            DescriptorField::Italic(i) => self.text.italic = i,
            DescriptorField::FillColor(c) => self.text.fill_color = c,
            DescriptorField::FillOpacity(o) => self.text.fill_opacity = o.min(100),
            DescriptorField::OutlineEnabled(e) => self.text.outline_enabled = e,
            DescriptorField::OutlineWidth(w) => self.text.outline_width_px = w.max(1),
            DescriptorField::OutlineColor(c) => self.text.outline_color = c,
            DescriptorField::ShadowEnabled(e) => self.text.shadow_enabled = e,
            DescriptorField::ShadowOffset(dx, dy) => {
                self.text.shadow_offset = (
                    dx.clamp(-MAX_SHADOW_OFFSET, MAX_SHADOW_OFFSET),
                    dy.clamp(-MAX_SHADOW_OFFSET, MAX_SHADOW_OFFSET),
                )
            }
            DescriptorField::ShadowColor(c) => self.text.shadow_color = c,
            DescriptorField::ImagePath(p) => self.image.source_path = p,
            DescriptorField::ImageScalePercent(s) => {
                self.image.scale_percent = s.clamp(MIN_IMAGE_SCALE, MAX_IMAGE_SCALE)
            }
            DescriptorField::ImageOpacity(o) => self.image.opacity = o.min(100),
            DescriptorField::Rotation(deg) => {
                self.rotation_degrees = deg.clamp(MIN_ROTATION, MAX_ROTATION)
            }
            DescriptorField::Placement(p) => {
                self.placement = match p {
                    Placement::Custom { x_ratio, y_ratio } => Placement::custom(x_ratio, y_ratio),
                    anchor => anchor,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_ids_round_trip() {
        for anchor in Anchor::ALL {
            assert_eq!(Anchor::from_id(anchor.id()), Some(anchor));
        }
        assert_eq!(Anchor::from_id("custom"), None);
    }

    #[test]
    fn test_apply_clamps_ranges() {
        let mut d = WatermarkDescriptor::default();
        d.apply(DescriptorField::Rotation(720));
        assert_eq!(d.rotation_degrees, 180);
        d.apply(DescriptorField::Rotation(-200));
        assert_eq!(d.rotation_degrees, -180);
        d.apply(DescriptorField::FillOpacity(150));
        assert_eq!(d.text.fill_opacity, 100);
        d.apply(DescriptorField::ImageScalePercent(0));
        assert_eq!(d.image.scale_percent, 1);
        d.apply(DescriptorField::ImageScalePercent(5000));
        assert_eq!(d.image.scale_percent, 1000);
        d.apply(DescriptorField::PixelSize(0));
        assert_eq!(d.text.pixel_size, 1);
        d.apply(DescriptorField::OutlineWidth(0));
        assert_eq!(d.text.outline_width_px, 1);
        d.apply(DescriptorField::ShadowOffset(i32::MIN, i32::MAX));
        assert_eq!(d.text.shadow_offset, (-1000, 1000));
        d.apply(DescriptorField::AutoSizeRatio(3.0));
        assert_eq!(d.text.auto_size_ratio, 1.0);
        d.apply(DescriptorField::AutoSizeRatio(f64::NAN));
        assert_eq!(d.text.auto_size_ratio, 0.0);
        d.apply(DescriptorField::Placement(Placement::Custom {
            x_ratio: 1.5,
            y_ratio: -0.2,
        }));
        assert_eq!(d.placement, Placement::custom(1.0, 0.0));
    }

    #[test]
    fn test_auto_size_follows_shorter_side() {
        let mut style = TextStyle::default();
        assert_eq!(style.effective_pixel_size(4000, 3000), 128);

        style.auto_size_ratio = 0.05;
        assert_eq!(style.effective_pixel_size(4000, 3000), 150);
        assert_eq!(style.effective_pixel_size(3000, 4000), 150);
        // Small canvases never go below the floor
        assert_eq!(style.effective_pixel_size(100, 80), MIN_AUTO_PIXEL_SIZE);
    }

    #[test]
    fn test_switching_kind_keeps_both_styles() {
        let mut d = WatermarkDescriptor::default();
        d.apply(DescriptorField::Text("hello".into()));
        d.apply(DescriptorField::Kind(WatermarkKind::Image));
        d.apply(DescriptorField::ImagePath("logo.png".into()));
        d.apply(DescriptorField::Kind(WatermarkKind::Text));
        assert_eq!(d.text.content, "hello");
        assert_eq!(d.image.source_path, PathBuf::from("logo.png"));
    }
}
