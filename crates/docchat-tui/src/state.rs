//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── controller: Controller  (attachments, session, conversation, preview cursor)
//! │   ├── input: TextBuffer       (question being typed)
//! │   ├── chat: ChatState         (scroll)
//! │   ├── preview: PreviewPane    (decoded image for the current preview handle)
//! │   ├── status_line: StatusLine (transient hints)
//! │   ├── task_seq / tasks        (async task lifecycle)
//! └── overlay: Option<Overlay>    (modal overlays)
//! ```
//!
//! Overlay handlers get `&mut Overlay` and `&TuiState` at the same time,
//! which is why the overlay lives beside `TuiState` rather than inside it.

use std::path::PathBuf;

use docchat_core::config::Config;
use docchat_core::core::{Controller, PreviewLedger};

use crate::chat::ChatState;
use crate::common::{TaskSeq, Tasks};
use crate::input::TextBuffer;
use crate::overlays::Overlay;
use crate::preview::PreviewPane;
use crate::statusline::StatusLine;

/// Combined application state for the TUI.
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(config: Config, root: PathBuf) -> Self {
        Self {
            tui: TuiState::new(config, root),
            overlay: None,
        }
    }
}

/// Non-overlay UI state.
pub struct TuiState {
    pub config: Config,
    /// Directory the file picker lists.
    pub root: PathBuf,
    pub controller: Controller,
    pub input: TextBuffer,
    pub chat: ChatState,
    pub preview: PreviewPane,
    pub status_line: StatusLine,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub spinner_frame: usize,
    /// Terminal size at the last frame.
    pub viewport: (u16, u16),
    pub should_quit: bool,
}

impl TuiState {
    pub fn new(config: Config, root: PathBuf) -> Self {
        Self {
            config,
            root,
            controller: Controller::with_ledger(PreviewLedger::new()),
            input: TextBuffer::default(),
            chat: ChatState::default(),
            preview: PreviewPane::default(),
            status_line: StatusLine::default(),
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            spinner_frame: 0,
            viewport: (0, 0),
            should_quit: false,
        }
    }

    /// Typing is accepted only while a question could be sent.
    pub fn input_enabled(&self) -> bool {
        self.controller.can_ask()
    }
}
