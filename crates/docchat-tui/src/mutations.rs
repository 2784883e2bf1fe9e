//! State changes requested by overlays.
//!
//! Overlay key handlers only see `&TuiState`; anything they want changed
//! outside their own state is returned as a mutation and applied by the
//! reducer.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateMutation {
    /// Files confirmed in the picker, relative to the discovery root.
    ChooseFiles(Vec<PathBuf>),
    NextPreview,
    PreviousPreview,
    Unzoom,
}
