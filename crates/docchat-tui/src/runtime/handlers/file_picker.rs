use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::events::UiEvent;
use crate::overlays::discover_files;

/// Walks `root` for attachable documents off the UI thread.
pub async fn file_discovery(root: PathBuf, cancel: Option<CancellationToken>) -> UiEvent {
    let cancel = cancel.unwrap_or_default();
    let files = tokio::task::spawn_blocking(move || discover_files(&root, &cancel))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "file discovery task failed");
            Vec::new()
        });
    UiEvent::FilesDiscovered(files)
}
