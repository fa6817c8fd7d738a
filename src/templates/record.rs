use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

use crate::color::{Rgb, Rgba8};
use crate::export::{ExportConfig, NamingRule, OutputFormat, ResizeMode};
use crate::watermark::{
    Anchor, ImageStyle, MAX_IMAGE_SCALE, MAX_ROTATION, MAX_SHADOW_OFFSET, MIN_IMAGE_SCALE,
    MIN_ROTATION, Placement, TextStyle, WatermarkDescriptor, WatermarkKind, clamp_auto_size_ratio,
};

/// Ratio written for anchored placements, and assumed when a template has none.
pub const DEFAULT_POS_RATIO: f64 = 0.75;

const CUSTOM_ANCHOR: &str = "custom";

/// Everything a template captures: the watermark and how to export it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub descriptor: WatermarkDescriptor,
    pub export: ExportConfig,
}

/// On-disk template layout. Field names are part of the file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRecord {
    pub watermark_type: String,
    pub text: String,
    pub font_family: String,
    pub font_px: i64,
    /// Fraction of the shorter image side used as font size; 0 disables it
    pub auto_size_ratio: f64,
    pub bold: bool,
    pub italic: bool,
    pub text_color: String,
    pub opacity: i64,
    pub outline: bool,
    pub outline_px: i64,
    pub outline_color: String,
    pub shadow: bool,
    pub shadow_dx: i64,
    pub shadow_dy: i64,
    pub shadow_color: String,
    pub image_path: String,
    pub image_scale_percent: i64,
    pub image_opacity: i64,
    pub rotation_deg: i64,
    pub anchor: String,
    pub pos_ratio_x: f64,
    pub pos_ratio_y: f64,
    pub export: ExportRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportRecord {
    pub output_dir: String,
    pub prevent_export_to_source: bool,
    pub out_format: String,
    pub jpeg_quality: i64,
    pub resize_mode: String,
    pub resize_value: i64,
    pub name_rule: String,
    pub name_value: String,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        SettingsRecord::from(&Settings::default())
    }
}

impl Default for ExportRecord {
    fn default() -> Self {
        ExportRecord::from(&ExportConfig::default())
    }
}

fn parse_or<T>(field: &str, value: &str, fallback: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().unwrap_or_else(|e| {
        warn!("Template field {}: {}, using default", field, e);
        fallback
    })
}

fn known_or<T>(field: &str, value: &str, parsed: Option<T>, fallback: T) -> T {
    parsed.unwrap_or_else(|| {
        warn!("Template field {} has unknown value {:?}, using default", field, value);
        fallback
    })
}

fn clamp_u8(v: i64, hi: u8) -> u8 {
    v.clamp(0, hi as i64) as u8
}

fn clamp_u32(v: i64, lo: u32, hi: u32) -> u32 {
    v.clamp(lo as i64, hi as i64) as u32
}

fn clamp_i32(v: i64, lo: i32, hi: i32) -> i32 {
    v.clamp(lo as i64, hi as i64) as i32
}

impl From<&Settings> for SettingsRecord {
    fn from(settings: &Settings) -> Self {
        let d = &settings.descriptor;
        let (anchor, pos_ratio_x, pos_ratio_y) = match d.placement {
            Placement::Anchor(a) => (a.id().to_string(), DEFAULT_POS_RATIO, DEFAULT_POS_RATIO),
            Placement::Custom { x_ratio, y_ratio } => (CUSTOM_ANCHOR.to_string(), x_ratio, y_ratio),
        };

        Self {
            watermark_type: d.kind.as_str().to_string(),
            text: d.text.content.clone(),
            font_family: d.text.font_family.clone(),
            font_px: d.text.pixel_size as i64,
            auto_size_ratio: d.text.auto_size_ratio,
            bold: d.text.bold,
            italic: d.text.italic,
            text_color: d.text.fill_color.to_string(),
            opacity: d.text.fill_opacity as i64,
            outline: d.text.outline_enabled,
            outline_px: d.text.outline_width_px as i64,
            outline_color: d.text.outline_color.to_string(),
            shadow: d.text.shadow_enabled,
            shadow_dx: d.text.shadow_offset.0 as i64,
            shadow_dy: d.text.shadow_offset.1 as i64,
            shadow_color: d.text.shadow_color.to_string(),
            image_path: d.image.source_path.to_string_lossy().into_owned(),
            image_scale_percent: d.image.scale_percent as i64,
            image_opacity: d.image.opacity as i64,
            rotation_deg: d.rotation_degrees as i64,
            anchor,
            pos_ratio_x,
            pos_ratio_y,
            export: ExportRecord::from(&settings.export),
        }
    }
}

impl From<&ExportConfig> for ExportRecord {
    fn from(export: &ExportConfig) -> Self {
        Self {
            output_dir: export.output_dir.to_string_lossy().into_owned(),
            prevent_export_to_source: export.prevent_export_to_source_dir,
            out_format: export.format.id().to_string(),
            jpeg_quality: export.jpeg_quality as i64,
            resize_mode: export.resize_mode.id().to_string(),
            resize_value: export.resize_value as i64,
            name_rule: export.naming_rule.id().to_string(),
            name_value: export.naming_value.clone(),
        }
    }
}

impl From<&SettingsRecord> for Settings {
    /// Out-of-range numbers are clamped and unknown names fall back to the
    /// built-in defaults, so any well-formed JSON yields usable settings.
    fn from(r: &SettingsRecord) -> Self {
        let text_defaults = TextStyle::default();
        let descriptor_defaults = WatermarkDescriptor::default();

        let kind = match r.watermark_type.to_ascii_lowercase().as_str() {
            "image" => WatermarkKind::Image,
            "text" => WatermarkKind::Text,
            other => known_or("watermark_type", other, None, descriptor_defaults.kind),
        };

        let placement = if r.anchor == CUSTOM_ANCHOR {
            Placement::custom(r.pos_ratio_x, r.pos_ratio_y)
        } else {
            Placement::Anchor(known_or(
                "anchor",
                &r.anchor,
                Anchor::from_id(&r.anchor),
                Anchor::BottomRight,
            ))
        };

        let text = TextStyle {
            content: r.text.clone(),
            font_family: r.font_family.clone(),
            pixel_size: clamp_u32(r.font_px, 1, u16::MAX as u32),
            auto_size_ratio: clamp_auto_size_ratio(r.auto_size_ratio),
            bold: r.bold,
            italic: r.italic,
            fill_color: parse_or::<Rgb>("text_color", &r.text_color, text_defaults.fill_color),
            fill_opacity: clamp_u8(r.opacity, 100),
            outline_enabled: r.outline,
            outline_width_px: clamp_u32(r.outline_px, 1, 255),
            outline_color: parse_or::<Rgb>(
                "outline_color",
                &r.outline_color,
                text_defaults.outline_color,
            ),
            shadow_enabled: r.shadow,
            shadow_offset: (
                clamp_i32(r.shadow_dx, -MAX_SHADOW_OFFSET, MAX_SHADOW_OFFSET),
                clamp_i32(r.shadow_dy, -MAX_SHADOW_OFFSET, MAX_SHADOW_OFFSET),
            ),
            shadow_color: parse_or::<Rgba8>(
                "shadow_color",
                &r.shadow_color,
                text_defaults.shadow_color,
            ),
        };

        let image = ImageStyle {
            source_path: PathBuf::from(&r.image_path),
            scale_percent: clamp_u32(r.image_scale_percent, MIN_IMAGE_SCALE, MAX_IMAGE_SCALE),
            opacity: clamp_u8(r.image_opacity, 100),
        };

        Settings {
            descriptor: WatermarkDescriptor {
                kind,
                text,
                image,
                rotation_degrees: clamp_i32(r.rotation_deg, MIN_ROTATION, MAX_ROTATION),
                placement,
            },
            export: ExportConfig::from(&r.export),
        }
    }
}

impl From<&ExportRecord> for ExportConfig {
    fn from(r: &ExportRecord) -> Self {
        let defaults = ExportConfig::default();
        ExportConfig {
            output_dir: PathBuf::from(&r.output_dir),
            prevent_export_to_source_dir: r.prevent_export_to_source,
            format: known_or(
                "out_format",
                &r.out_format,
                OutputFormat::from_id(&r.out_format),
                defaults.format,
            ),
            jpeg_quality: clamp_u8(r.jpeg_quality, 100),
            resize_mode: known_or(
                "resize_mode",
                &r.resize_mode,
                ResizeMode::from_id(&r.resize_mode),
                defaults.resize_mode,
            ),
            resize_value: clamp_u32(r.resize_value, 1, u32::MAX),
            naming_rule: known_or(
                "name_rule",
                &r.name_rule,
                NamingRule::from_id(&r.name_rule),
                defaults.naming_rule,
            ),
            naming_value: r.name_value.clone(),
        }
    }
}
