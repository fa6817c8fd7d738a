use crate::export::{
    BatchReport, ExportConfig, ExportError, ExportEvent, ExportObserver, export_batch,
    write_atomically,
};
use crate::watermark::{FontResolver, WatermarkDescriptor};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Default)]
struct Recorder {
    events: Vec<ExportEvent>,
    progress: Vec<(usize, usize)>,
    cancel_after: Option<usize>,
}

impl ExportObserver for Recorder {
    fn on_event(&mut self, event: &ExportEvent) {
        self.events.push(event.clone());
    }

    fn on_progress(&mut self, done: usize, total: usize) {
        self.progress.push((done, total));
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_after
            .map(|n| self.events.len() >= n)
            .unwrap_or(false)
    }
}

fn no_fonts() -> FontResolver {
    FontResolver::new(&[], "DejaVu Sans")
}

/// Blank text keeps these tests independent of installed fonts
fn blank_descriptor() -> WatermarkDescriptor {
    let mut d = WatermarkDescriptor::default();
    d.text.content = String::new();
    d
}

fn make_sources(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).unwrap();
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            RgbaImage::from_pixel(10, 10, Rgba([5, 6, 7, 255]))
                .save(&path)
                .unwrap();
            path
        })
        .collect()
}

fn files_in(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn run(sources: &[PathBuf], export: &ExportConfig, observer: &mut Recorder) -> BatchReport {
    export_batch(sources, &blank_descriptor(), export, &no_fonts(), observer).unwrap()
}

#[test]
fn test_batch_writes_named_outputs() {
    let temp = TempDir::new().unwrap();
    let sources = make_sources(&temp.path().join("in"), &["a.png", "b.png"]);
    let out = temp.path().join("out");
    let export = ExportConfig {
        output_dir: out.clone(),
        ..Default::default()
    };

    let mut observer = Recorder::default();
    let report = run(&sources, &export, &mut observer);

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 2);
    assert!(report.skipped.is_empty());
    assert!(!report.cancelled);
    assert_eq!(
        files_in(&out),
        vec!["a_watermarked.png", "b_watermarked.png"]
    );
    assert_eq!(observer.progress, vec![(1, 2), (2, 2)]);
    assert!(matches!(
        &observer.events[0],
        ExportEvent::Succeeded { output, .. } if output == &out.join("a_watermarked.png")
    ));
}

#[test]
fn test_batch_continues_past_failures() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let mut sources = make_sources(&input, &["good1.png", "good2.png"]);
    let broken = input.join("broken.png");
    std::fs::write(&broken, b"\x89PNG but not really").unwrap();
    sources.insert(1, broken.clone());

    let out = temp.path().join("out");
    let export = ExportConfig {
        output_dir: out.clone(),
        ..Default::default()
    };
    let mut observer = Recorder::default();
    let report = run(&sources, &export, &mut observer);

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, broken);
    assert!(!report.skipped[0].1.is_empty());
    // No partial or temporary file for the broken source
    assert_eq!(
        files_in(&out),
        vec!["good1_watermarked.png", "good2_watermarked.png"]
    );
}

#[test]
fn test_collision_aborts_before_any_write() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let mut sources = make_sources(&temp.path().join("other"), &["first.png"]);
    sources.extend(make_sources(&input, &["second.png"]));
    let before = files_in(&input);

    let export = ExportConfig {
        output_dir: input.clone(),
        ..Default::default()
    };
    let result = export_batch(
        &sources,
        &blank_descriptor(),
        &export,
        &no_fonts(),
        &mut Recorder::default(),
    );

    assert!(matches!(result, Err(ExportError::SourceDestCollision(p)) if p == sources[1]));
    assert_eq!(files_in(&input), before);
    assert!(files_in(&temp.path().join("other")).len() == 1);
}

#[test]
fn test_cancel_takes_effect_between_files() {
    let temp = TempDir::new().unwrap();
    let sources = make_sources(&temp.path().join("in"), &["1.png", "2.png", "3.png"]);
    let out = temp.path().join("out");
    let export = ExportConfig {
        output_dir: out.clone(),
        ..Default::default()
    };

    let mut observer = Recorder {
        cancel_after: Some(1),
        ..Default::default()
    };
    let report = run(&sources, &export, &mut observer);

    assert!(report.cancelled);
    assert_eq!(report.succeeded, 1);
    assert_eq!(files_in(&out), vec!["1_watermarked.png"]);
}

#[test]
fn test_invalid_output_dir() {
    let temp = TempDir::new().unwrap();
    let sources = make_sources(&temp.path().join("in"), &["x.png"]);

    let empty = ExportConfig::default();
    let result = export_batch(
        &sources,
        &blank_descriptor(),
        &empty,
        &no_fonts(),
        &mut Recorder::default(),
    );
    assert!(matches!(result, Err(ExportError::InvalidOutputDir(..))));

    let file = temp.path().join("a_file");
    std::fs::write(&file, b"x").unwrap();
    let not_a_dir = ExportConfig {
        output_dir: file,
        ..Default::default()
    };
    let result = export_batch(
        &sources,
        &blank_descriptor(),
        &not_a_dir,
        &no_fonts(),
        &mut Recorder::default(),
    );
    assert!(matches!(result, Err(ExportError::InvalidOutputDir(..))));
}

#[test]
fn test_write_atomically_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("out.bin");
    std::fs::write(&target, b"old contents").unwrap();

    write_atomically(&target, b"new").unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"new");
    assert_eq!(files_in(temp.path()), vec!["out.bin"]);
}
