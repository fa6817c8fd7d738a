use chrono::{DateTime, Local, NaiveDate};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, trace};

use crate::watermark::{DATE_PLACEHOLDER, WatermarkDescriptor, WatermarkKind};

/// Tags tried in order of preference.
const CAPTURE_DATE_TAGS: [rexif::ExifTag; 3] = [
    rexif::ExifTag::DateTimeOriginal,
    rexif::ExifTag::DateTimeDigitized,
    rexif::ExifTag::DateTime,
];

/// Date part of an EXIF timestamp such as `2005:07:30 07:22:46`. Dashes and
/// slashes are accepted as separators too.
pub fn parse_exif_date(value: &str) -> Option<NaiveDate> {
    let date = value.trim().trim_matches('"').split_whitespace().next()?;
    let normalized = date.replace(['-', '/'], ":");
    NaiveDate::parse_from_str(&normalized, "%Y:%m:%d").ok()
}

/// Capture date recorded in the file's EXIF block, if any.
pub fn capture_date(path: &Path) -> Option<NaiveDate> {
    let exif = match rexif::parse_file(path) {
        Ok(exif) => exif,
        Err(e) => {
            trace!("No EXIF data for {}: {}", path.display(), e);
            return None;
        }
    };

    for tag in &CAPTURE_DATE_TAGS {
        if let Some(entry) = exif.entries.iter().find(|e| e.tag == *tag)
            && let Some(date) = parse_exif_date(&entry.value_more_readable)
        {
            debug!("Found capture date in {:?}: {}", tag, date);
            return Some(date);
        }
    }
    None
}

/// Local date the file was last modified.
pub fn modified_date(path: &Path) -> Option<NaiveDate> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(modified).date_naive())
}

/// `YYYY-MM-DD` text for a photo: its EXIF capture date, or the file's
/// modification date when the photo carries none.
pub fn date_text(path: &Path) -> Option<String> {
    let date = capture_date(path).or_else(|| {
        debug!("No capture date in {:?}, using modification time", path);
        modified_date(path)
    })?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// The descriptor to render for `source`, with the date placeholder filled
/// in. Borrows when there is nothing to substitute.
pub fn descriptor_for_source<'a>(
    descriptor: &'a WatermarkDescriptor,
    source: &Path,
) -> Cow<'a, WatermarkDescriptor> {
    if descriptor.kind != WatermarkKind::Text || !descriptor.text.uses_date() {
        return Cow::Borrowed(descriptor);
    }

    let date = date_text(source).unwrap_or_default();
    let mut resolved = descriptor.clone();
    resolved.text.content = resolved.text.content.replace(DATE_PLACEHOLDER, &date);
    Cow::Owned(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    /// Minimal little-endian TIFF block with a single IFD0 DateTime entry.
    fn exif_app1(timestamp: &str) -> Vec<u8> {
        let mut value = timestamp.as_bytes().to_vec();
        value.push(0);

        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II");
        tiff.extend_from_slice(&42u16.to_le_bytes());
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x0132u16.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes());
        tiff.extend_from_slice(&(value.len() as u32).to_le_bytes());
        tiff.extend_from_slice(&26u32.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&value);

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&tiff);

        let mut segment = vec![0xFF, 0xE1];
        segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        segment.extend_from_slice(&payload);
        segment
    }

    fn write_jpeg_with_exif(path: &Path, timestamp: &str) {
        let mut jpeg = Vec::new();
        RgbImage::from_pixel(16, 16, Rgb([90, 90, 90]))
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();
        // APP1 goes straight after the SOI marker
        let mut bytes = jpeg[..2].to_vec();
        bytes.extend_from_slice(&exif_app1(timestamp));
        bytes.extend_from_slice(&jpeg[2..]);
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_parse_exif_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2005, 7, 30);
        assert_eq!(parse_exif_date("2005:07:30 07:22:46"), expected);
        assert_eq!(parse_exif_date("2005-07-30"), expected);
        assert_eq!(parse_exif_date(" 2005/07/30 00:00:00 "), expected);
        assert_eq!(parse_exif_date("\"2005:07:30 07:22:46\""), expected);
        assert_eq!(parse_exif_date("0000:00:00 00:00:00"), None);
        assert_eq!(parse_exif_date(""), None);
    }

    #[test]
    fn test_exif_date_wins_over_modification_time() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("photo.jpg");
        write_jpeg_with_exif(&path, "2021:07:04 10:11:12");

        assert_eq!(capture_date(&path), NaiveDate::from_ymd_opt(2021, 7, 4));
        assert_eq!(date_text(&path).as_deref(), Some("2021-07-04"));
    }

    #[test]
    fn test_modification_time_fallback() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plain.png");
        RgbImage::new(4, 4).save(&path).unwrap();

        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(stamp)
            .unwrap();

        let expected = DateTime::<Local>::from(stamp).format("%Y-%m-%d").to_string();
        assert_eq!(capture_date(&path), None);
        assert_eq!(date_text(&path), Some(expected));
    }

    #[test]
    fn test_placeholder_substitution() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("photo.jpg");
        write_jpeg_with_exif(&path, "2019:12:31 23:59:59");

        let mut d = WatermarkDescriptor::default();
        d.text.content = "Shot {date}".to_string();
        let resolved = descriptor_for_source(&d, &path);
        assert_eq!(resolved.text.content, "Shot 2019-12-31");

        // Nothing to fill in, nothing cloned
        d.text.content = "@studio".to_string();
        assert!(matches!(descriptor_for_source(&d, &path), Cow::Borrowed(_)));

        // Image watermarks ignore the placeholder
        d.text.content = "{date}".to_string();
        d.kind = WatermarkKind::Image;
        assert!(matches!(descriptor_for_source(&d, &path), Cow::Borrowed(_)));
    }

    #[test]
    fn test_missing_file_leaves_placeholder_empty() {
        let mut d = WatermarkDescriptor::default();
        d.text.content = "{date}".to_string();
        let resolved = descriptor_for_source(&d, Path::new("/no/such/photo.jpg"));
        assert_eq!(resolved.text.content, "");
    }
}
