//! Events consumed by the reducer.
//!
//! Terminal input, frame/tick pacing, and every async result (delivered
//! through the runtime inbox) arrive as a `UiEvent`.

use std::path::PathBuf;

use docchat_core::backend::{AskResponse, UploadResponse};
use docchat_core::core::{AskTicket, PreviewId, RequestFailure, UploadTicket};
use docchat_core::files::RawFile;

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

/// Decoded preview ready for the Kitty graphics protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KittyImageData {
    pub base64_png: String,
    /// Source dimensions in pixels (before downscaling).
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub enum UiEvent {
    Tick,
    Frame {
        width: u16,
        height: u16,
    },
    Terminal(crossterm::event::Event),

    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },

    /// Paths chosen by the user were inspected.
    SelectionLoaded(Result<Vec<RawFile>, String>),
    UploadFinished {
        ticket: UploadTicket,
        result: Result<UploadResponse, RequestFailure>,
    },
    AskFinished {
        ticket: AskTicket,
        result: Result<AskResponse, RequestFailure>,
    },
    PreviewDecoded {
        id: PreviewId,
        result: Result<KittyImageData, String>,
    },
    FilesDiscovered(Vec<PathBuf>),
}
