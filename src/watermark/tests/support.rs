use crate::watermark::FontResolver;
use std::path::PathBuf;

pub const TEST_FAMILY: &str = "DejaVu Sans";

fn candidate_dirs() -> Vec<PathBuf> {
    [
        "static",
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

/// A resolver that can render DejaVu Sans, or `None` when the font is not
/// installed and the calling test should be skipped.
pub fn test_fonts() -> Option<FontResolver> {
    let resolver = FontResolver::new(&candidate_dirs(), TEST_FAMILY);
    match resolver.resolve(TEST_FAMILY, false, false) {
        Ok(_) => Some(resolver),
        Err(_) => {
            eprintln!("DejaVu Sans not found, skipping font-dependent test");
            None
        }
    }
}
