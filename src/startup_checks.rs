use crate::Config;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::watermark::FontResolver;

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create templates directory: {0}")]
    TemplatesDirectoryCreationFailed(#[from] std::io::Error),

    #[error("Templates path is not a directory: {0}")]
    TemplatesPathNotDirectory(String),

    #[error("No usable font for default family: {0}")]
    NoUsableFont(String),
}

impl StartupCheckError {
    /// Template persistence cannot work without its directory; a missing
    /// font only disables text watermarks.
    pub fn is_critical(&self) -> bool {
        !matches!(self, StartupCheckError::NoUsableFont(_))
    }
}

pub fn perform_startup_checks(
    config: &Config,
    fonts: &FontResolver,
) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    // Check templates directory
    let templates_dir = Path::new(&config.templates.directory);
    if templates_dir.exists() && !templates_dir.is_dir() {
        error!("Templates path is not a directory: {:?}", templates_dir);
        errors.push(StartupCheckError::TemplatesPathNotDirectory(
            templates_dir.display().to_string(),
        ));
    } else if !templates_dir.exists() {
        info!(
            "Templates directory does not exist, creating: {:?}",
            templates_dir
        );
        if let Err(e) = std::fs::create_dir_all(templates_dir) {
            error!("Failed to create templates directory: {}", e);
            errors.push(StartupCheckError::TemplatesDirectoryCreationFailed(e));
        } else {
            info!("Templates directory created successfully");
        }
    } else {
        info!("Templates directory exists: {:?}", templates_dir);
    }

    // Check font directories
    for dir in &config.fonts.directories {
        if dir.exists() {
            info!("Font directory exists: {:?}", dir);
        } else {
            warn!("Font directory does not exist: {:?}", dir);
        }
    }

    let family = fonts.default_family();
    match fonts.resolve(family, false, false) {
        Ok(font) => info!("Default font {:?} found: {:?}", family, font.path),
        Err(e) => {
            warn!("Default font {:?} unavailable: {}", family, e);
            warn!("Text watermarks will not render until a font is installed");
            errors.push(StartupCheckError::NoUsableFont(family.to_string()));
        }
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_templates_directory() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.templates.directory = temp.path().join("nested").join("templates");
        config.fonts.directories = vec![temp.path().join("no-fonts")];
        let fonts = config.fonts.resolver();

        let result = perform_startup_checks(&config, &fonts);
        assert!(config.templates.directory.is_dir());

        // Only the font check can fail here, and it is not critical
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], StartupCheckError::NoUsableFont(_)));
        assert!(!errors[0].is_critical());
    }

    #[test]
    fn test_templates_path_that_is_a_file_is_critical() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("templates");
        std::fs::write(&file, b"oops").unwrap();

        let mut config = Config::default();
        config.templates.directory = file;
        let fonts = config.fonts.resolver();

        let errors = perform_startup_checks(&config, &fonts).unwrap_err();
        assert!(errors.iter().any(|e| e.is_critical()));
    }
}
