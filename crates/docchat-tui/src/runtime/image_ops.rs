//! Image decoding and terminal geometry helpers for the preview pane and
//! the zoom overlay.

use std::path::Path;

use base64::Engine;
use docchat_core::files::decode_image_to_png;
use ratatui::layout::Rect;

use crate::events::KittyImageData;
use crate::overlays::image_preview::overlay_inner_area;

/// Decodes an image into a base64 PNG sized for the zoom overlay.
///
/// The long edge is capped by `max_edge` and by the overlay's pixel size,
/// whichever is smaller.
pub(crate) fn decode_image_preview(path: &Path, max_edge: u32) -> Result<KittyImageData, String> {
    let decoded = decode_image_to_png(path, preview_target_edge(max_edge))
        .map_err(|err| err.to_string())?;

    Ok(KittyImageData {
        base64_png: base64::engine::general_purpose::STANDARD.encode(decoded.png_bytes),
        width: decoded.source_width,
        height: decoded.source_height,
    })
}

/// Cell size in pixels, or `(0, 0)` when the terminal does not report it.
pub(crate) fn cell_size() -> (u16, u16) {
    match crossterm::terminal::window_size() {
        Ok(ws) if ws.columns > 0 && ws.rows > 0 => (ws.width / ws.columns, ws.height / ws.rows),
        _ => (0, 0),
    }
}

fn preview_target_edge(max_edge: u32) -> u32 {
    let max_edge = max_edge.max(1);
    let Ok(ws) = crossterm::terminal::window_size() else {
        return max_edge;
    };
    if ws.width == 0 || ws.height == 0 || ws.columns == 0 || ws.rows == 0 {
        return max_edge;
    }

    let cell_w = u32::from((ws.width / ws.columns).max(1));
    let cell_h = u32::from((ws.height / ws.rows).max(1));
    let inner = overlay_inner_area(Rect::new(0, 0, ws.columns, ws.rows));

    let inner_w = u32::from(inner.width).saturating_mul(cell_w);
    let inner_h = u32::from(inner.height).saturating_mul(cell_h);

    inner_w.max(inner_h).clamp(1, max_edge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_missing_file_reports_error() {
        let result = decode_image_preview(Path::new("/definitely/not/here.png"), 256);
        assert!(result.is_err());
    }

    #[test]
    fn test_target_edge_never_exceeds_configured_max() {
        assert!(preview_target_edge(64) <= 64);
        assert!(preview_target_edge(0) >= 1);
    }
}
