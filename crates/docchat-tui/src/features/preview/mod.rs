//! Preview pane feature slice.

mod render;
mod state;

pub use render::{PREVIEW_TITLE, preview_counter, preview_image_area, render_preview};
pub use state::PreviewPane;
