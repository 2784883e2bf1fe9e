use std::path::PathBuf;

use docchat_core::core::PreviewId;

use crate::events::UiEvent;
use crate::runtime::image_ops::decode_image_preview;

/// Decodes the image behind preview handle `id`.
pub async fn decode_preview(id: PreviewId, path: PathBuf, max_edge: u32) -> UiEvent {
    let result = tokio::task::spawn_blocking(move || decode_image_preview(&path, max_edge))
        .await
        .unwrap_or_else(|e| Err(format!("Task failed: {e}")));
    UiEvent::PreviewDecoded { id, result }
}
