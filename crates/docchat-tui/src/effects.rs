//! Side effects requested by the reducer.
//!
//! The reducer never performs I/O. It returns `UiEffect`s and the runtime
//! executes them, feeding results back as `UiEvent`s.

use std::path::PathBuf;

use docchat_core::core::{AskRequest, PreviewId, UploadRequest};
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

#[derive(Debug)]
pub enum UiEffect {
    Quit,

    /// Inspect chosen paths (metadata + content sniffing) off the UI thread.
    LoadSelection {
        task: TaskId,
        paths: Vec<PathBuf>,
    },
    Upload {
        task: TaskId,
        request: UploadRequest,
    },
    Ask {
        task: TaskId,
        request: AskRequest,
    },
    DecodePreview {
        task: TaskId,
        id: PreviewId,
        path: PathBuf,
        max_edge: u32,
    },
    /// Remove terminal graphics belonging to released preview handles.
    ReleasePreviews {
        ids: Vec<PreviewId>,
    },
    DiscoverFiles {
        task: TaskId,
    },
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },
}
