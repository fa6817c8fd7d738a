use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::export::{BatchReport, ExportConfig, ExportError, ExportObserver, ExportScope, export_batch};
use crate::images::{ImageEntry, ImageList, ImportError, ImportSummary};
use crate::metadata::descriptor_for_source;
use crate::templates::Settings;
use crate::watermark::{
    Anchor, DescriptorField, FontResolver, Placement, PreviewTransform, WatermarkDescriptor,
    anchor_to_custom, apply_drag, resolve_top_left, synthesize_rotated,
};

/// The decoded image currently shown, with the watermark element built for it.
struct Current {
    index: usize,
    base: RgbaImage,
    element: Option<RgbaImage>,
}

/// Session state owned by the control thread: the settings being edited, the
/// import list, the selection and the preview viewport.
///
/// The element cached here is always synthesized in base-image space for the
/// selected image; the preview only ever scales it.
pub struct Engine {
    settings: Settings,
    images: ImageList,
    current: Option<Current>,
    viewport: Option<(u32, u32)>,
    fonts: FontResolver,
    dragging: bool,
}

impl Engine {
    pub fn new(settings: Settings, fonts: FontResolver) -> Self {
        Self {
            settings,
            images: ImageList::new(),
            current: None,
            viewport: None,
            fonts,
            dragging: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn descriptor(&self) -> &WatermarkDescriptor {
        &self.settings.descriptor
    }

    pub fn export_config(&self) -> &ExportConfig {
        &self.settings.export
    }

    pub fn fonts(&self) -> &FontResolver {
        &self.fonts
    }

    pub fn images(&self) -> &ImageList {
        &self.images
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.current.as_ref().map(|c| c.index)
    }

    pub fn selected_entry(&self) -> Option<&ImageEntry> {
        self.selected_index().and_then(|i| self.images.get(i))
    }

    pub fn base_image(&self) -> Option<&RgbaImage> {
        self.current.as_ref().map(|c| &c.base)
    }

    /// Adds files and folders to the import list. The first image becomes
    /// the selection when nothing was selected yet.
    pub fn import_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> ImportSummary {
        let mut summary = self.images.import_paths(paths);

        if self.current.is_none() && !self.images.is_empty() {
            // An entry that cannot be decoded in full is dropped here
            while !self.images.is_empty() {
                match self.select(0) {
                    Ok(()) => break,
                    Err(e) => {
                        if let Some(entry) = self.images.remove(0) {
                            summary.added = summary.added.saturating_sub(1);
                            summary.skipped.push((entry.path, e));
                        }
                    }
                }
            }
        }
        summary
    }

    pub fn select(&mut self, index: usize) -> Result<(), ImportError> {
        let entry = self
            .images
            .get(index)
            .ok_or(ImportError::NoSuchEntry(index))?;
        let base = image::open(&entry.path)?.to_rgba8();
        debug!("Selected {:?} ({}x{})", entry.path, base.width(), base.height());

        self.dragging = false;
        self.current = Some(Current {
            index,
            base,
            element: None,
        });
        self.refresh_element();
        Ok(())
    }

    /// Removes an entry and keeps the selection on a valid neighbour.
    pub fn remove(&mut self, index: usize) -> Option<ImageEntry> {
        let removed = self.images.remove(index)?;

        match self.selected_index() {
            Some(selected) if selected == index => {
                self.current = None;
                if !self.images.is_empty() {
                    let next = index.min(self.images.len() - 1);
                    if let Err(e) = self.select(next) {
                        debug!("Could not select image {}: {}", next, e);
                    }
                }
            }
            Some(selected) if selected > index => {
                if let Some(current) = self.current.as_mut() {
                    current.index = selected - 1;
                }
            }
            _ => {}
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.current = None;
        self.dragging = false;
    }

    fn refresh_element(&mut self) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        let Some(entry) = self.images.get(current.index) else {
            return;
        };
        let descriptor = descriptor_for_source(&self.settings.descriptor, &entry.path);
        let (width, height) = current.base.dimensions();
        current.element = synthesize_rotated(&descriptor, width, height, &self.fonts);
    }

    pub fn select_anchor(&mut self, anchor: Anchor) {
        self.dragging = false;
        self.settings.descriptor.placement = Placement::Anchor(anchor);
    }

    /// Starts a drag. An anchored placement is frozen into ratios at the
    /// exact pixel the element is drawn at, so the first move does not jump.
    pub fn begin_drag(&mut self) -> bool {
        let Some((element_width, element_height, base_width, base_height)) = self.drag_geometry()
        else {
            return false;
        };

        if let Placement::Anchor(anchor) = self.settings.descriptor.placement {
            self.settings.descriptor.placement = anchor_to_custom(
                anchor,
                element_width,
                element_height,
                base_width,
                base_height,
            );
            debug!(
                "Anchor {} handed off to {:?}",
                anchor.id(),
                self.settings.descriptor.placement
            );
        }
        self.dragging = true;
        true
    }

    /// Moves the watermark by a pointer delta measured in viewport pixels.
    /// Ignored when there is no image, watermark or viewport.
    pub fn drag_delta(&mut self, preview_dx: f64, preview_dy: f64) -> Option<Placement> {
        let transform = self.preview_transform()?;
        let (element_width, element_height, base_width, base_height) = self.drag_geometry()?;
        if !self.dragging && !self.begin_drag() {
            return None;
        }

        let (dx, dy) = transform.to_base_delta(preview_dx, preview_dy);
        let placement = apply_drag(
            self.settings.descriptor.placement,
            dx,
            dy,
            element_width,
            element_height,
            base_width,
            base_height,
        );
        self.settings.descriptor.placement = placement;
        Some(placement)
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn drag_geometry(&self) -> Option<(u32, u32, u32, u32)> {
        let current = self.current.as_ref()?;
        let element = current.element.as_ref()?;
        Some((
            element.width(),
            element.height(),
            current.base.width(),
            current.base.height(),
        ))
    }

    /// Applies an arbitrary edit to the descriptor and rebuilds the element.
    /// Placements are re-clamped; other fields are the caller's
    /// responsibility (see [`Engine::apply_field`] for validated edits).
    pub fn update_descriptor<F>(&mut self, patch: F) -> Option<&RgbaImage>
    where
        F: FnOnce(&mut WatermarkDescriptor),
    {
        patch(&mut self.settings.descriptor);
        let placement = self.settings.descriptor.placement;
        self.settings
            .descriptor
            .apply(DescriptorField::Placement(placement));
        self.refresh_element();
        self.current_preview_element()
    }

    /// One validated field edit, then the element is rebuilt.
    pub fn apply_field(&mut self, field: DescriptorField) -> Option<&RgbaImage> {
        self.settings.descriptor.apply(field);
        self.refresh_element();
        self.current_preview_element()
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.dragging = false;
        self.refresh_element();
    }

    pub fn set_export_config(&mut self, export: ExportConfig) {
        self.settings.export = export;
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Some((width.max(1), height.max(1)));
    }

    /// The rotated watermark element in base-image pixels, if there is one.
    pub fn current_preview_element(&self) -> Option<&RgbaImage> {
        self.current.as_ref()?.element.as_ref()
    }

    /// Top-left of the current element on a base of the given size.
    pub fn current_placement_pixels(&self, base_width: u32, base_height: u32) -> Option<(i32, i32)> {
        let element = self.current_preview_element()?;
        Some(resolve_top_left(
            self.settings.descriptor.placement,
            element.width(),
            element.height(),
            base_width,
            base_height,
        ))
    }

    pub fn preview_transform(&self) -> Option<PreviewTransform> {
        let (viewport_width, viewport_height) = self.viewport?;
        let base = &self.current.as_ref()?.base;
        Some(PreviewTransform::new(
            viewport_width,
            viewport_height,
            base.width(),
            base.height(),
        ))
    }

    /// The whole preview frame: scaled base plus the watermark drawn through
    /// the same transform.
    pub fn render_preview(&self) -> Option<RgbaImage> {
        let transform = self.preview_transform()?;
        let current = self.current.as_ref()?;
        let placed = current.element.as_ref().map(|element| {
            let top_left = resolve_top_left(
                self.settings.descriptor.placement,
                element.width(),
                element.height(),
                current.base.width(),
                current.base.height(),
            );
            (element, top_left)
        });
        Some(transform.render_frame(&current.base, placed))
    }

    /// Whether a viewport point lies on the drawn watermark.
    pub fn hit_test(&self, px: f64, py: f64) -> bool {
        let (Some(transform), Some(current)) = (self.preview_transform(), self.current.as_ref())
        else {
            return false;
        };
        let Some(element) = current.element.as_ref() else {
            return false;
        };
        let top_left = resolve_top_left(
            self.settings.descriptor.placement,
            element.width(),
            element.height(),
            current.base.width(),
            current.base.height(),
        );
        transform.hit_test(px, py, top_left, element.width(), element.height())
    }

    /// Exports the selection or the whole list. The list is snapshotted
    /// before the first file is processed.
    pub fn export(
        &self,
        scope: ExportScope,
        observer: &mut dyn ExportObserver,
    ) -> Result<BatchReport, ExportError> {
        let sources: Vec<PathBuf> = match scope {
            ExportScope::Current => self
                .selected_entry()
                .map(|e| vec![e.path.clone()])
                .unwrap_or_default(),
            ExportScope::All => self.images.entries().iter().map(|e| e.path.clone()).collect(),
        };
        info!("Export requested for {} image(s) ({:?})", sources.len(), scope);

        export_batch(
            &sources,
            &self.settings.descriptor,
            &self.settings.export,
            &self.fonts,
            observer,
        )
    }
}
