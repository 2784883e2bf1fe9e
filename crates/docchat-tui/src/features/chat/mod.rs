//! Chat pane feature slice: conversation rendering and scrolling.

mod render;
mod state;

pub use render::{
    EMPTY_PLACEHOLDER, PROCESSING_PLACEHOLDER, SPINNER_FRAMES, SPINNER_SPEED_DIVISOR, THINKING,
    build_chat_lines, chat_inner_area, render_chat,
};
pub use state::{ChatState, ScrollState};
