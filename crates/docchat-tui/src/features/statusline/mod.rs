//! Status line feature slice.
//!
//! Shows key hints when idle, request progress while loading, and transient
//! guidance hints (e.g. a question submitted before a session exists).

mod render;
mod state;

pub use render::render_status_line;
pub use state::{HINT_DURATION, StatusLine};
