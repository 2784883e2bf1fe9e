//! Feature slices for the TUI (state/render per slice).

pub mod chat;
pub mod input;
pub mod preview;
pub mod statusline;
