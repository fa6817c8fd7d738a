// Templates module - named settings snapshots persisted as JSON
mod error;
mod record;
mod store;

// Re-export public items
pub use error::TemplateError;
pub use record::{DEFAULT_POS_RATIO, ExportRecord, Settings, SettingsRecord};
pub use store::{
    DEFAULT_TEMPLATE, SESSION_TEMPLATE, StartupSource, TemplateStore, validate_name,
};
