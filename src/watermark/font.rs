use ab_glyph::FontVec;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::SynthesisError;

/// A loaded face plus whatever styling it lacks and has to be faked.
#[derive(Clone)]
pub struct ResolvedFont {
    pub font: Arc<FontVec>,
    pub path: PathBuf,
    pub synthetic_bold: bool,
    pub synthetic_italic: bool,
}

/// Finds font files by family name in a set of directories.
pub struct FontResolver {
    index: HashMap<String, PathBuf>,
    default_family: String,
    loaded: RwLock<HashMap<PathBuf, Arc<FontVec>>>,
}

/// Lowercased alphanumerics only: "DejaVu Sans" and "DejaVuSans" both map
/// to "dejavusans".
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
        .unwrap_or(false)
}

impl FontResolver {
    pub fn new(directories: &[PathBuf], default_family: &str) -> Self {
        let mut index = HashMap::new();

        for dir in directories {
            if !dir.exists() {
                debug!("Font directory {:?} does not exist, skipping", dir);
                continue;
            }
            for entry in WalkDir::new(dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !entry.file_type().is_file() || !is_font_file(path) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    index
                        .entry(normalize(stem))
                        .or_insert_with(|| path.to_path_buf());
                }
            }
        }

        debug!("Indexed {} font files", index.len());

        Self {
            index,
            default_family: default_family.to_string(),
            loaded: RwLock::new(HashMap::new()),
        }
    }

    pub fn font_count(&self) -> usize {
        self.index.len()
    }

    pub fn default_family(&self) -> &str {
        &self.default_family
    }

    /// Resolves `family` with the requested style, falling back to the default
    /// family when the name is unknown. `family` may also be a font file path.
    pub fn resolve(
        &self,
        family: &str,
        bold: bool,
        italic: bool,
    ) -> Result<ResolvedFont, SynthesisError> {
        let direct = Path::new(family);
        if is_font_file(direct) && direct.is_file() {
            return self.load(direct, bold, italic);
        }

        if let Some((path, synthetic_bold, synthetic_italic)) =
            self.lookup(&normalize(family), bold, italic)
        {
            return self.load(&path, synthetic_bold, synthetic_italic);
        }

        if normalize(family) != normalize(&self.default_family)
            && let Some((path, synthetic_bold, synthetic_italic)) =
                self.lookup(&normalize(&self.default_family), bold, italic)
        {
            warn!(
                "Font family '{}' not found, using '{}'",
                family, self.default_family
            );
            return self.load(&path, synthetic_bold, synthetic_italic);
        }

        Err(SynthesisError::FontUnavailable(family.to_string()))
    }

    fn find(&self, key: &str, suffixes: &[&str]) -> Option<PathBuf> {
        suffixes
            .iter()
            .find_map(|suffix| self.index.get(&format!("{}{}", key, suffix)))
            .cloned()
    }

    /// Returns the best matching file and which styles still need faking.
    fn lookup(&self, key: &str, bold: bool, italic: bool) -> Option<(PathBuf, bool, bool)> {
        const REGULAR: &[&str] = &["", "regular", "book"];
        const BOLD: &[&str] = &["bold"];
        const ITALIC: &[&str] = &["italic", "oblique"];
        const BOLD_ITALIC: &[&str] = &["bolditalic", "boldoblique"];

        if bold && italic {
            if let Some(p) = self.find(key, BOLD_ITALIC) {
                return Some((p, false, false));
            }
            if let Some(p) = self.find(key, BOLD) {
                return Some((p, false, true));
            }
            if let Some(p) = self.find(key, ITALIC) {
                return Some((p, true, false));
            }
        } else if bold {
            if let Some(p) = self.find(key, BOLD) {
                return Some((p, false, false));
            }
        } else if italic && let Some(p) = self.find(key, ITALIC) {
            return Some((p, false, false));
        }

        self.find(key, REGULAR).map(|p| (p, bold, italic))
    }

    fn load(
        &self,
        path: &Path,
        synthetic_bold: bool,
        synthetic_italic: bool,
    ) -> Result<ResolvedFont, SynthesisError> {
        let cached = self
            .loaded
            .read()
            .ok()
            .and_then(|cache| cache.get(path).cloned());

        let font = match cached {
            Some(font) => font,
            None => {
                let data = std::fs::read(path)?;
                let font = Arc::new(FontVec::try_from_vec(data).map_err(|_| {
                    SynthesisError::InvalidFont(path.display().to_string())
                })?);
                if let Ok(mut cache) = self.loaded.write() {
                    cache.insert(path.to_path_buf(), font.clone());
                }
                debug!("Loaded font {:?}", path);
                font
            }
        };

        Ok(ResolvedFont {
            font,
            path: path.to_path_buf(),
            synthetic_bold,
            synthetic_italic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"not really a font").unwrap();
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("DejaVu Sans"), "dejavusans");
        assert_eq!(normalize("DejaVuSans-Bold"), "dejavusansbold");
        assert_eq!(normalize("Noto_Sans CJK"), "notosanscjk");
    }

    #[test]
    fn test_lookup_prefers_real_styles() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Example.ttf");
        touch(temp_dir.path(), "Example-Bold.ttf");
        touch(temp_dir.path(), "Example-Oblique.ttf");
        touch(temp_dir.path(), "README.txt");

        let resolver = FontResolver::new(&[temp_dir.path().to_path_buf()], "Example");
        assert_eq!(resolver.font_count(), 3);

        let (path, fake_bold, fake_italic) = resolver.lookup("example", true, false).unwrap();
        assert!(path.ends_with("Example-Bold.ttf"));
        assert!(!fake_bold && !fake_italic);

        let (path, fake_bold, fake_italic) = resolver.lookup("example", false, true).unwrap();
        assert!(path.ends_with("Example-Oblique.ttf"));
        assert!(!fake_bold && !fake_italic);

        // No bold-oblique face: bold face plus synthetic italic
        let (path, fake_bold, fake_italic) = resolver.lookup("example", true, true).unwrap();
        assert!(path.ends_with("Example-Bold.ttf"));
        assert!(!fake_bold && fake_italic);
    }

    #[test]
    fn test_lookup_falls_back_to_synthetic_styles() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Plain-Regular.otf");

        let resolver = FontResolver::new(&[temp_dir.path().to_path_buf()], "Plain");
        let (path, fake_bold, fake_italic) = resolver.lookup("plain", true, true).unwrap();
        assert!(path.ends_with("Plain-Regular.otf"));
        assert!(fake_bold && fake_italic);
        assert!(resolver.lookup("missing", false, false).is_none());
    }

    #[test]
    fn test_resolve_reports_unavailable_family() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = FontResolver::new(&[temp_dir.path().to_path_buf()], "Nothing");
        let result = resolver.resolve("Nothing", false, false);
        assert!(matches!(result, Err(SynthesisError::FontUnavailable(_))));
    }

    #[test]
    fn test_resolve_rejects_corrupt_font() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Broken.ttf");
        let resolver = FontResolver::new(&[temp_dir.path().to_path_buf()], "Broken");
        let result = resolver.resolve("Broken", false, false);
        assert!(matches!(result, Err(SynthesisError::InvalidFont(_))));
    }
}
