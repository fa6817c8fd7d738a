use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod color;
pub mod engine;
pub mod export;
pub mod geometry;
pub mod images;
pub mod metadata;
pub mod startup_checks;
pub mod templates;
pub mod watermark;

pub use engine::Engine;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub templates: TemplateConfig,
    pub fonts: FontConfig,
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FontConfig {
    /// Searched recursively for .ttf and .otf files, in order
    pub directories: Vec<PathBuf>,
    pub default_family: String,
}

/// Viewport used when rendering a preview frame without explicit size
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Photomark".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("templates"),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            directories: vec![
                PathBuf::from("static"),
                PathBuf::from("/usr/share/fonts"),
                PathBuf::from("/usr/local/share/fonts"),
            ],
            default_family: "DejaVu Sans".to_string(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 640,
        }
    }
}

impl FontConfig {
    pub fn resolver(&self) -> watermark::FontResolver {
        watermark::FontResolver::new(&self.directories, &self.default_family)
    }
}
