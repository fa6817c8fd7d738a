use crate::export::OutputFormat;
use crate::templates::{
    DEFAULT_TEMPLATE, SESSION_TEMPLATE, Settings, StartupSource, TemplateError, TemplateStore,
};
use crate::watermark::{
    Anchor, FontResolver, Placement, WatermarkKind, synthesize_rotated, try_synthesize_rotated,
};
use image::{Rgba, RgbaImage};
use std::path::PathBuf;
use tempfile::TempDir;

fn store() -> (TemplateStore, TempDir) {
    let temp = TempDir::new().unwrap();
    (TemplateStore::new(temp.path().join("templates")), temp)
}

fn settings_with_text(text: &str) -> Settings {
    let mut settings = Settings::default();
    settings.descriptor.text.content = text.to_string();
    settings
}

#[test]
fn test_save_load_list_delete() {
    let (store, _temp) = store();
    assert!(store.list().unwrap().is_empty());

    let mut settings = settings_with_text("Studio");
    settings.export.format = OutputFormat::Jpeg;
    store.save("portraits", &settings).unwrap();
    store.save("archive", &Settings::default()).unwrap();

    assert_eq!(store.list().unwrap(), vec!["archive", "portraits"]);
    assert_eq!(store.load("portraits").unwrap(), settings);

    store.delete("portraits").unwrap();
    assert_eq!(store.list().unwrap(), vec!["archive"]);
    assert!(matches!(
        store.load("portraits"),
        Err(TemplateError::NotFound(_))
    ));
    assert!(matches!(
        store.delete("portraits"),
        Err(TemplateError::NotFound(_))
    ));
}

#[test]
fn test_saved_file_uses_documented_field_names() {
    let (store, _temp) = store();
    store.save("fields", &Settings::default()).unwrap();

    let raw = std::fs::read_to_string(store.directory().join("fields.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for key in [
        "watermark_type",
        "font_px",
        "auto_size_ratio",
        "text_color",
        "shadow_dx",
        "rotation_deg",
        "anchor",
        "pos_ratio_x",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["export"]["out_format"], "PNG");
    assert_eq!(json["export"]["name_rule"], "suffix");
    assert_eq!(json["anchor"], "br");
}

#[test]
fn test_invalid_and_reserved_names() {
    let (store, _temp) = store();
    for name in ["", "  ", "../escape", "a/b", "a\\b", ".hidden"] {
        assert!(
            matches!(
                store.save(name, &Settings::default()),
                Err(TemplateError::InvalidName(_))
            ),
            "{:?} should be rejected",
            name
        );
    }

    store.save_session(&Settings::default()).unwrap();
    assert!(matches!(
        store.delete(SESSION_TEMPLATE),
        Err(TemplateError::Reserved(_))
    ));

    store.set_default(&Settings::default()).unwrap();
    store.delete(DEFAULT_TEMPLATE).unwrap();
}

#[test]
fn test_startup_bootstraps_both_templates() {
    let (store, _temp) = store();
    let (settings, source) = store.load_startup().unwrap();

    assert_eq!(source, StartupSource::Bootstrapped);
    assert_eq!(settings, Settings::default());
    assert_eq!(store.list().unwrap(), vec![DEFAULT_TEMPLATE, SESSION_TEMPLATE]);
}

#[test]
fn test_startup_copies_default_into_session() {
    let (store, _temp) = store();
    let settings = settings_with_text("From default");
    store.set_default(&settings).unwrap();

    let (loaded, source) = store.load_startup().unwrap();
    assert_eq!(source, StartupSource::Default);
    assert_eq!(loaded, settings);
    assert_eq!(store.load(SESSION_TEMPLATE).unwrap(), settings);
}

#[test]
fn test_startup_prefers_last_session() {
    let (store, _temp) = store();
    store.set_default(&settings_with_text("default")).unwrap();
    store.save_session(&settings_with_text("session")).unwrap();

    let (loaded, source) = store.load_startup().unwrap();
    assert_eq!(source, StartupSource::LastSession);
    assert_eq!(loaded.descriptor.text.content, "session");
}

#[test]
fn test_corrupt_session_falls_back_to_default() {
    let (store, _temp) = store();
    store.set_default(&settings_with_text("default")).unwrap();
    std::fs::write(
        store.directory().join(format!("{}.json", SESSION_TEMPLATE)),
        b"{ not json",
    )
    .unwrap();

    let (loaded, source) = store.load_startup().unwrap();
    assert_eq!(source, StartupSource::Default);
    assert_eq!(loaded.descriptor.text.content, "default");
}

#[test]
fn test_image_watermark_round_trip_resynthesizes_identically() {
    let (store, temp) = store();
    let logo = temp.path().join("logo.png");
    RgbaImage::from_fn(37, 21, |x, y| Rgba([(x * 7) as u8, (y * 11) as u8, 90, 200]))
        .save(&logo)
        .unwrap();

    let mut settings = Settings::default();
    settings.descriptor.kind = WatermarkKind::Image;
    settings.descriptor.image.source_path = logo;
    settings.descriptor.image.scale_percent = 150;
    settings.descriptor.image.opacity = 55;
    settings.descriptor.rotation_degrees = -30;
    settings.descriptor.placement = Placement::custom(0.3, 0.6);
    store.save("logo", &settings).unwrap();

    let loaded = store.load("logo").unwrap();
    assert_eq!(loaded, settings);

    let fonts = FontResolver::new(&[], "DejaVu Sans");
    let before = try_synthesize_rotated(&settings.descriptor, 400, 300, &fonts)
        .unwrap()
        .unwrap();
    let after = try_synthesize_rotated(&loaded.descriptor, 400, 300, &fonts)
        .unwrap()
        .unwrap();
    assert_eq!(before.dimensions(), after.dimensions());
    assert_eq!(before, after);
}

#[test]
fn test_text_watermark_round_trip_resynthesizes_identically() {
    let fonts = FontResolver::new(&[PathBuf::from("/usr/share/fonts")], "DejaVu Sans");
    if fonts.resolve("DejaVu Sans", false, false).is_err() {
        eprintln!("DejaVu Sans not found, skipping font-dependent test");
        return;
    }

    let (store, _temp) = store();
    let mut settings = settings_with_text("© 2024 Studio");
    settings.descriptor.text.pixel_size = 40;
    settings.descriptor.text.italic = true;
    settings.descriptor.rotation_degrees = 45;
    settings.descriptor.placement = Placement::Anchor(Anchor::Center);
    store.save("text", &settings).unwrap();
    let loaded = store.load("text").unwrap();

    let before = synthesize_rotated(&settings.descriptor, 640, 480, &fonts).unwrap();
    let after = synthesize_rotated(&loaded.descriptor, 640, 480, &fonts).unwrap();
    assert_eq!(before, after);
}
