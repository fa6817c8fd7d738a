// Watermark module - descriptor, synthesis, placement and preview mapping
mod blend;
mod error;
mod font;
mod position;
mod preview;
mod rotate;
mod synth;
mod text;
mod types;

// Re-export public items
pub use blend::{blend_over, overlay};
pub use error::SynthesisError;
pub use font::{FontResolver, ResolvedFont};
pub use position::{ANCHOR_MARGIN, anchor_to_custom, anchor_top_left, apply_drag, resolve_top_left};
pub use preview::{MIN_SCALE, PreviewTransform};
pub use rotate::rotate_element;
pub use synth::{synthesize, synthesize_rotated, try_synthesize, try_synthesize_rotated};
pub use text::TEXT_PADDING;
pub use types::*;
