use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Name used in persisted templates.
    pub fn id(&self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_uppercase().as_str() {
            "PNG" => Some(OutputFormat::Png),
            "JPEG" | "JPG" => Some(OutputFormat::Jpeg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    None,
    Width,
    Height,
    Percent,
}

impl ResizeMode {
    pub fn id(&self) -> &'static str {
        match self {
            ResizeMode::None => "none",
            ResizeMode::Width => "width",
            ResizeMode::Height => "height",
            ResizeMode::Percent => "percent",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "none" => Some(ResizeMode::None),
            "width" => Some(ResizeMode::Width),
            "height" => Some(ResizeMode::Height),
            "percent" => Some(ResizeMode::Percent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingRule {
    Keep,
    Prefix,
    Suffix,
}

impl NamingRule {
    pub fn id(&self) -> &'static str {
        match self {
            NamingRule::Keep => "keep",
            NamingRule::Prefix => "prefix",
            NamingRule::Suffix => "suffix",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "keep" => Some(NamingRule::Keep),
            "prefix" => Some(NamingRule::Prefix),
            "suffix" => Some(NamingRule::Suffix),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub prevent_export_to_source_dir: bool,
    pub format: OutputFormat,
    /// 0..=100
    pub jpeg_quality: u8,
    pub resize_mode: ResizeMode,
    pub resize_value: u32,
    pub naming_rule: NamingRule,
    pub naming_value: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::new(),
            prevent_export_to_source_dir: true,
            format: OutputFormat::Png,
            jpeg_quality: 90,
            resize_mode: ResizeMode::None,
            resize_value: 100,
            naming_rule: NamingRule::Suffix,
            naming_value: "_watermarked".to_string(),
        }
    }
}

impl ExportConfig {
    /// Canvas size for a source of `width` x `height`. Never below 1px;
    /// width and height modes keep the aspect ratio.
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        let value = self.resize_value.max(1) as u64;
        let (w, h) = (width.max(1) as u64, height.max(1) as u64);

        let (nw, nh) = match self.resize_mode {
            ResizeMode::None => return (width, height),
            ResizeMode::Width => (value, h * value / w),
            ResizeMode::Height => (w * value / h, value),
            ResizeMode::Percent => (w * value / 100, h * value / 100),
        };

        (
            nw.clamp(1, u32::MAX as u64) as u32,
            nh.clamp(1, u32::MAX as u64) as u32,
        )
    }

    /// Output file name for `source`: the naming rule applied to the stem,
    /// with the extension of the output format.
    pub fn output_file_name(&self, source: &Path) -> String {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let name = match self.naming_rule {
            NamingRule::Keep => stem,
            NamingRule::Prefix => format!("{}{}", self.naming_value, stem),
            NamingRule::Suffix => format!("{}{}", stem, self.naming_value),
        };

        format!("{}.{}", name, self.format.extension())
    }
}
