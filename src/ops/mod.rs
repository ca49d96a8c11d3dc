//! Editing operations over the document model. Every operation is a pure
//! function `(document, selection, params) -> document`: the input is never
//! mutated and the output shares no nested collections with it, so two
//! document states can never alias each other's strip lists.
//!
//! Bulk semantics: operations taking a selection apply to *all* selected
//! zones at once. Unknown ids in a selection are skipped silently.

pub mod layout;
pub mod strips;

pub use layout::{LayoutPreset, change_resolution, generate_layout, set_orientation};
pub use strips::{
    StripUpdate, add_strip, fill_remaining, move_strip, remove_strip, unique_colors, update_strip,
};
