//! Modal overlays.
//!
//! An overlay temporarily takes over keyboard input. Each one owns its
//! state, key handler and render function, and talks back to the reducer
//! through [`OverlayUpdate`].
//!
//! - `file_picker.rs`: document picker (Ctrl+O)
//! - `image_preview.rs`: zoomed preview plus Kitty graphics output
//! - `alert.rs`: notices such as rejected selections
//! - `render_utils.rs`: shared rendering helpers

pub mod alert;
pub mod file_picker;
pub mod image_preview;
pub mod render_utils;

use std::path::PathBuf;

pub use alert::AlertState;
use crossterm::event::KeyEvent;
pub use file_picker::{FilePickerState, discover_files};
pub use image_preview::ImagePreviewState;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::effects::UiEffect;
use crate::mutations::StateMutation;
use crate::state::TuiState;

/// Requests to open a new overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayRequest {
    FilePicker,
    ImagePreview,
    Alert { title: String, message: String },
}

#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
    Open(OverlayRequest),
}

/// Result of an overlay key handler.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub mutations: Vec<StateMutation>,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            mutations: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    pub fn open(request: OverlayRequest) -> Self {
        Self::new(OverlayTransition::Open(request))
    }

    #[must_use]
    pub fn with_mutations(mut self, mutations: Vec<StateMutation>) -> Self {
        self.mutations = mutations;
        self
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

#[derive(Debug)]
pub enum Overlay {
    FilePicker(FilePickerState),
    ImagePreview(ImagePreviewState),
    Alert(AlertState),
}

impl Overlay {
    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, tui: &TuiState) {
        match self {
            Overlay::FilePicker(p) => p.render(frame, area, input_y),
            Overlay::ImagePreview(p) => p.render(frame, area, tui),
            Overlay::Alert(a) => a.render(frame, area, input_y),
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::FilePicker(p) => p.handle_key(tui, key),
            Overlay::ImagePreview(p) => p.handle_key(tui, key),
            Overlay::Alert(a) => a.handle_key(key),
        }
    }

    pub fn as_file_picker_mut(&mut self) -> Option<&mut FilePickerState> {
        match self {
            Overlay::FilePicker(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_image_preview(&self) -> bool {
        matches!(self, Overlay::ImagePreview(_))
    }
}

/// Convenience helpers for `Option<Overlay>`.
pub trait OverlayExt {
    fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, tui: &TuiState);

    /// Hands discovery results to an open file picker; dropped otherwise.
    fn files_discovered(&mut self, files: Vec<PathBuf>);
}

impl OverlayExt for Option<Overlay> {
    fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, tui: &TuiState) {
        if let Some(overlay) = self {
            overlay.render(frame, area, input_y, tui);
        }
    }

    fn files_discovered(&mut self, files: Vec<PathBuf>) {
        if let Some(picker) = self.as_mut().and_then(Overlay::as_file_picker_mut) {
            picker.set_files(files);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TaskId;

    #[test]
    fn test_files_discovered_fills_open_picker() {
        let (picker, _) = FilePickerState::open(TaskId(1));
        let mut overlay = Some(Overlay::FilePicker(picker));

        overlay.files_discovered(vec![PathBuf::from("a.png")]);

        let picker = overlay
            .as_mut()
            .and_then(Overlay::as_file_picker_mut)
            .unwrap();
        assert!(!picker.loading);
        assert_eq!(picker.files, vec![PathBuf::from("a.png")]);
    }

    #[test]
    fn test_files_discovered_without_picker_is_ignored() {
        let mut overlay = Some(Overlay::Alert(AlertState::new("t", "m")));
        overlay.files_discovered(vec![PathBuf::from("a.png")]);
        assert!(matches!(overlay, Some(Overlay::Alert(_))));

        let mut none: Option<Overlay> = None;
        none.files_discovered(Vec::new());
        assert!(none.is_none());
    }
}
