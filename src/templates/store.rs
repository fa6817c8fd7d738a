use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::TemplateError;
use super::record::{Settings, SettingsRecord};
use crate::export::write_atomically;

pub const DEFAULT_TEMPLATE: &str = "default";
pub const SESSION_TEMPLATE: &str = "last_session";

const TEMPLATE_EXTENSION: &str = "json";

/// Where the startup settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupSource {
    LastSession,
    Default,
    Bootstrapped,
}

/// Named templates stored as one JSON file each in a directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    directory: PathBuf,
}

pub fn validate_name(name: &str) -> Result<(), TemplateError> {
    let invalid = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(|c| c.is_control());
    if invalid {
        Err(TemplateError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

impl TemplateStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, TemplateError> {
        validate_name(name)?;
        Ok(self
            .directory
            .join(format!("{}.{}", name, TEMPLATE_EXTENSION)))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Template names, sorted. A missing directory has no templates.
    pub fn list(&self) -> Result<Vec<String>, TemplateError> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.directory)? {
            let path = entry?.path();
            let is_template = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION));
            if !path.is_file() || !is_template {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_name(stem).is_ok()
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn load(&self, name: &str) -> Result<Settings, TemplateError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        let record: SettingsRecord = serde_json::from_str(&content)?;
        debug!("Loaded template {} from {:?}", name, path);
        Ok(Settings::from(&record))
    }

    pub fn save(&self, name: &str, settings: &Settings) -> Result<(), TemplateError> {
        let path = self.path_for(name)?;
        std::fs::create_dir_all(&self.directory)?;
        let json = serde_json::to_string_pretty(&SettingsRecord::from(settings))?;
        write_atomically(&path, json.as_bytes())?;
        debug!("Saved template {} to {:?}", name, path);
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<(), TemplateError> {
        let path = self.path_for(name)?;
        if name == SESSION_TEMPLATE {
            return Err(TemplateError::Reserved(name.to_string()));
        }
        if !path.is_file() {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        std::fs::remove_file(&path)?;
        info!("Deleted template {}", name);
        Ok(())
    }

    pub fn set_default(&self, settings: &Settings) -> Result<(), TemplateError> {
        self.save(DEFAULT_TEMPLATE, settings)
    }

    pub fn save_session(&self, settings: &Settings) -> Result<(), TemplateError> {
        self.save(SESSION_TEMPLATE, settings)
    }

    /// `last_session` if present, else `default` (copied into
    /// `last_session`), else both are written from the built-in defaults.
    /// A template that fails to parse is skipped with a warning.
    pub fn load_startup(&self) -> Result<(Settings, StartupSource), TemplateError> {
        if self.exists(SESSION_TEMPLATE) {
            match self.load(SESSION_TEMPLATE) {
                Ok(settings) => {
                    info!("Restored last session settings");
                    return Ok((settings, StartupSource::LastSession));
                }
                Err(e) => warn!("Ignoring unreadable {} template: {}", SESSION_TEMPLATE, e),
            }
        }

        if self.exists(DEFAULT_TEMPLATE) {
            match self.load(DEFAULT_TEMPLATE) {
                Ok(settings) => {
                    self.save_session(&settings)?;
                    info!("Started from the default template");
                    return Ok((settings, StartupSource::Default));
                }
                Err(e) => warn!("Ignoring unreadable {} template: {}", DEFAULT_TEMPLATE, e),
            }
        }

        let settings = Settings::default();
        self.set_default(&settings)?;
        self.save_session(&settings)?;
        info!("Bootstrapped templates in {:?}", self.directory);
        Ok((settings, StartupSource::Bootstrapped))
    }
}
