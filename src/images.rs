use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file type")]
    Unsupported,

    #[error("Already imported")]
    Duplicate,

    #[error("Cannot read image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Path does not exist")]
    Missing,

    #[error("No image at index {0}")]
    NoSuchEntry(usize),
}

/// An imported source image. Pixels are decoded on demand; only the size is
/// read at import time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ImageEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: Vec<(PathBuf, ImportError)>,
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
        .unwrap_or(false)
}

/// Ordered list of imported images. Grows on import, shrinks only through
/// `remove` and `clear`.
#[derive(Debug, Default)]
pub struct ImageList {
    entries: Vec<ImageEntry>,
}

impl ImageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }

    /// Imports files and folders. Folders contribute their direct children
    /// only, in file name order.
    pub fn import_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                for entry in WalkDir::new(path)
                    .min_depth(1)
                    .max_depth(1)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                {
                    // Unsupported files inside a folder are not worth reporting
                    if entry.file_type().is_file() && is_supported(entry.path()) {
                        self.import_file(entry.path(), &mut summary);
                    }
                }
            } else {
                self.import_file(path, &mut summary);
            }
        }

        info!(
            "Imported {} image(s), skipped {}",
            summary.added,
            summary.skipped.len()
        );
        summary
    }

    fn import_file(&mut self, path: &Path, summary: &mut ImportSummary) {
        match self.inspect(path) {
            Ok(entry) => {
                debug!("Imported {:?} ({}x{})", path, entry.width, entry.height);
                self.entries.push(entry);
                summary.added += 1;
            }
            Err(e) => {
                debug!("Skipping {:?}: {}", path, e);
                summary.skipped.push((path.to_path_buf(), e));
            }
        }
    }

    fn inspect(&self, path: &Path) -> Result<ImageEntry, ImportError> {
        if !path.exists() {
            return Err(ImportError::Missing);
        }
        if !is_supported(path) {
            return Err(ImportError::Unsupported);
        }
        if self.contains(path) {
            return Err(ImportError::Duplicate);
        }
        let (width, height) = image::image_dimensions(path)?;
        Ok(ImageEntry {
            path: path.to_path_buf(),
            width,
            height,
        })
    }

    pub fn remove(&mut self, index: usize) -> Option<ImageEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
