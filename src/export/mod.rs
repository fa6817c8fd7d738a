// Export module - resize, composite, encode and batch writing
mod batch;
mod compositor;
mod error;
pub mod formats;
mod resize;
mod types;

// Re-export public items
pub use batch::{
    BatchReport, ExportEvent, ExportObserver, ExportScope, LoggingObserver, export_batch,
    prepare_output_dir, write_atomically,
};
pub use compositor::{
    RenderedImage, check_destination, compose, render, render_composite, source_dir,
};
pub use error::ExportError;
pub use resize::resize_for_export;
pub use types::{ExportConfig, NamingRule, OutputFormat, ResizeMode};
