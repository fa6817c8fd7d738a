use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::compositor::{check_destination, render};
use super::error::ExportError;
use super::types::ExportConfig;
use crate::watermark::{FontResolver, WatermarkDescriptor};

/// Which entries of the import list an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    Current,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    Succeeded { source: PathBuf, output: PathBuf },
    Skipped { source: PathBuf, reason: String },
}

/// Receives per-file outcomes while a batch runs, and is polled between
/// files so a cancel takes effect at file granularity.
pub trait ExportObserver {
    fn on_event(&mut self, _event: &ExportEvent) {}

    fn on_progress(&mut self, _done: usize, _total: usize) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Observer that only logs
pub struct LoggingObserver;

impl ExportObserver for LoggingObserver {
    fn on_event(&mut self, event: &ExportEvent) {
        match event {
            ExportEvent::Succeeded { source, output } => {
                info!("Exported {:?} -> {:?}", source, output)
            }
            ExportEvent::Skipped { source, reason } => warn!("Skipped {:?}: {}", source, reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: Vec<(PathBuf, String)>,
    pub cancelled: bool,
}

/// Checks the output directory and creates it when missing. Nothing about
/// any source is touched here.
pub fn prepare_output_dir(dir: &Path) -> Result<(), ExportError> {
    if dir.as_os_str().is_empty() {
        return Err(ExportError::InvalidOutputDir(
            dir.to_path_buf(),
            "no output directory set".to_string(),
        ));
    }
    if dir.exists() && !dir.is_dir() {
        return Err(ExportError::InvalidOutputDir(
            dir.to_path_buf(),
            "not a directory".to_string(),
        ));
    }

    std::fs::create_dir_all(dir)
        .map_err(|e| ExportError::InvalidOutputDir(dir.to_path_buf(), e.to_string()))?;

    // Check writability with a temp file that is removed on drop
    NamedTempFile::new_in(dir)
        .map_err(|e| ExportError::InvalidOutputDir(dir.to_path_buf(), e.to_string()))?;

    Ok(())
}

/// Writes `bytes` next to `target` and renames it into place, so a failed
/// write never leaves a truncated file behind.
pub fn write_atomically(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Exports every source independently. Per-file failures are reported and
/// skipped; only an unusable output directory or a source/destination
/// collision stops the batch, and both are detected before any write.
pub fn export_batch(
    sources: &[PathBuf],
    descriptor: &WatermarkDescriptor,
    export: &ExportConfig,
    fonts: &FontResolver,
    observer: &mut dyn ExportObserver,
) -> Result<BatchReport, ExportError> {
    for source in sources {
        check_destination(source, export)?;
    }
    prepare_output_dir(&export.output_dir)?;

    let total = sources.len();
    let mut report = BatchReport {
        total,
        ..Default::default()
    };
    info!("Exporting {} image(s) to {:?}", total, export.output_dir);

    for (index, source) in sources.iter().enumerate() {
        if observer.is_cancelled() {
            info!("Export cancelled after {} of {} file(s)", index, total);
            report.cancelled = true;
            break;
        }

        let output = export.output_dir.join(export.output_file_name(source));
        let outcome = render(source, descriptor, export, fonts)
            .and_then(|rendered| {
                write_atomically(&output, &rendered.bytes).map_err(ExportError::from)
            });

        let event = match outcome {
            Ok(()) => {
                report.succeeded += 1;
                ExportEvent::Succeeded {
                    source: source.clone(),
                    output,
                }
            }
            Err(e) => {
                let reason = e.to_string();
                debug!("Export of {:?} failed: {}", source, reason);
                report.skipped.push((source.clone(), reason.clone()));
                ExportEvent::Skipped {
                    source: source.clone(),
                    reason,
                }
            }
        };
        observer.on_event(&event);
        observer.on_progress(index + 1, total);
    }

    info!(
        "Export finished: {}/{} succeeded, {} skipped",
        report.succeeded,
        report.total,
        report.skipped.len()
    );
    Ok(report)
}
