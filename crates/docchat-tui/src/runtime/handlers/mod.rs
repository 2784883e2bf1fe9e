//! Effect handlers.
//!
//! Each handler is an async function that performs I/O and returns the
//! `UiEvent` carrying its result. Handlers never touch state; the runtime
//! spawns them and routes the returned event through the inbox.

mod backend;
mod file_picker;
mod preview;
mod selection;

pub use backend::{ask, upload};
pub use file_picker::file_discovery;
pub use preview::decode_preview;
pub use selection::load_selection;
