//! Question input feature slice.

mod render;
mod text_buffer;

pub use render::{INPUT_HEIGHT, INPUT_PLACEHOLDER, render_input};
pub use text_buffer::TextBuffer;
