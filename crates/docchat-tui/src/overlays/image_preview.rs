//! Zoomed image preview and Kitty graphics output.
//!
//! The zoom overlay shows the current preview handle enlarged. Pixels are
//! never drawn through ratatui: the runtime places the image after each draw
//! with the Kitty graphics protocol (`a=T`, cursor positioning), wrapped in a
//! DCS passthrough when running inside tmux. Each preview handle maps to its
//! own Kitty image id so released handles can be deleted individually.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::fmt::Write as _;
use std::io::Write;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::{QueueableCommand, cursor};
use docchat_core::core::PreviewId;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::OverlayUpdate;
use super::render_utils::centered_rect;
use crate::mutations::StateMutation;
use crate::preview::preview_counter;
use crate::state::TuiState;

/// Maximum base64 bytes per Kitty graphics chunk.
const CHUNK_SIZE: usize = 4096;

const ZOOM_PERCENT_X: u16 = 90;
const ZOOM_PERCENT_Y: u16 = 85;

/// The zoom overlay carries no data of its own; it always shows the
/// controller's current preview.
#[derive(Debug, Default)]
pub struct ImagePreviewState;

impl ImagePreviewState {
    pub fn handle_key(&mut self, _tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => {
                OverlayUpdate::close().with_mutations(vec![StateMutation::Unzoom])
            }
            KeyCode::Char('f') if ctrl => {
                OverlayUpdate::close().with_mutations(vec![StateMutation::Unzoom])
            }
            KeyCode::Left | KeyCode::Char('h') => {
                OverlayUpdate::stay().with_mutations(vec![StateMutation::PreviousPreview])
            }
            KeyCode::Right | KeyCode::Char('l') => {
                OverlayUpdate::stay().with_mutations(vec![StateMutation::NextPreview])
            }
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, tui: &TuiState) {
        let popup_area = centered_rect(ZOOM_PERCENT_X, ZOOM_PERCENT_Y, area);
        frame.render_widget(Clear, popup_area);

        let mut title = String::from(" ");
        if let Some(counter) = preview_counter(tui) {
            title.push_str(&counter);
            title.push_str(" · ");
        }
        if let Some(handle) = tui.controller.current_preview() {
            title.push_str(handle.attachment().name());
            title.push(' ');
        }
        if let Some(image) = tui.preview.image() {
            let _ = write!(title, "({}x{}) ", image.width, image.height);
        }

        let hints = if preview_counter(tui).is_some() {
            " ←/→ browse · Esc/q to close "
        } else {
            " Esc/q to close "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title_bottom(hints);

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let is_image = tui
            .controller
            .current_preview()
            .is_some_and(|handle| handle.attachment().is_image());
        if !is_image {
            let text = Paragraph::new(Line::from("No inline preview for PDFs."))
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(text, inner);
        } else if let Some(error) = tui.preview.error() {
            let text = Paragraph::new(error).style(Style::default().fg(Color::Red));
            frame.render_widget(text, inner);
        } else if tui.preview.image().is_some() {
            // Placed after draw by the runtime.
            frame.render_widget(Clear, inner);
        } else {
            let loading =
                Paragraph::new(Line::from("Loading…")).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(loading, inner);
        }
    }
}

/// Inner content area of the zoom overlay for a given terminal area.
pub fn overlay_inner_area(terminal_area: Rect) -> Rect {
    let popup = centered_rect(ZOOM_PERCENT_X, ZOOM_PERCENT_Y, terminal_area);
    Rect {
        x: popup.x + 1,
        y: popup.y + 1,
        width: popup.width.saturating_sub(2),
        height: popup.height.saturating_sub(2),
    }
}

/// Kitty image id for a preview handle. Never zero.
pub fn kitty_image_id(id: PreviewId) -> u32 {
    (id.value().saturating_sub(1) % u64::from(u32::MAX)) as u32 + 1
}

/// Cell rectangle an image occupies once fitted into `area`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u16,
    pub y: u16,
    pub cols: u16,
    pub rows: u16,
}

/// Fits an image into `area` keeping its aspect ratio, centered.
///
/// `image_dims` and `cell_size` are in pixels. Unknown sizes fill the area.
pub fn fit_placement(area: Rect, image_dims: (u32, u32), cell_size: (u16, u16)) -> Placement {
    let (img_w, img_h) = image_dims;
    let (cell_w, cell_h) = cell_size;

    if img_w == 0 || img_h == 0 || cell_w == 0 || cell_h == 0 || area.height == 0 {
        return Placement {
            x: area.x,
            y: area.y,
            cols: area.width,
            rows: area.height,
        };
    }

    let area_px_w = f64::from(area.width) * f64::from(cell_w);
    let area_px_h = f64::from(area.height) * f64::from(cell_h);
    let img_aspect = f64::from(img_w) / f64::from(img_h);
    let area_aspect = area_px_w / area_px_h;

    let (cols, rows) = if img_aspect > area_aspect {
        let cols = area.width;
        let rows =
            (f64::from(cols) * f64::from(cell_w) / (img_aspect * f64::from(cell_h))).round() as u16;
        (cols, rows.clamp(1, area.height))
    } else {
        let rows = area.height;
        let cols =
            (f64::from(rows) * f64::from(cell_h) * img_aspect / f64::from(cell_w)).round() as u16;
        (cols.clamp(1, area.width.max(1)), rows)
    };

    Placement {
        x: area.x + area.width.saturating_sub(cols) / 2,
        y: area.y + area.height.saturating_sub(rows) / 2,
        cols,
        rows,
    }
}

/// Builds the APC sequences that transmit and display `base64_png`.
fn transmit_sequences(image_id: u32, base64_png: &str, placement: Placement) -> Vec<Vec<u8>> {
    let data = base64_png.as_bytes();
    let Placement { cols, rows, .. } = placement;

    let chunks: Vec<&[u8]> = if data.is_empty() {
        vec![data]
    } else {
        data.chunks(CHUNK_SIZE).collect()
    };
    let last = chunks.len() - 1;

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let more = u8::from(i < last);
            let mut seq = if i == 0 {
                format!("\x1b_Ga=T,f=100,q=2,i={image_id},c={cols},r={rows},z=1,m={more};")
                    .into_bytes()
            } else {
                format!("\x1b_Gm={more};").into_bytes()
            };
            seq.extend_from_slice(chunk);
            seq.extend_from_slice(b"\x1b\\");
            seq
        })
        .collect()
}

/// Whether we are running inside tmux (cached on first check).
fn in_tmux() -> bool {
    use std::sync::OnceLock;
    static IN_TMUX: OnceLock<bool> = OnceLock::new();
    *IN_TMUX.get_or_init(|| std::env::var_os("TMUX").is_some())
}

/// Transmits and displays an image for preview `id`, fitted into `area`.
///
/// Sending again with the same id replaces the previous placement.
///
/// # Errors
/// Returns an error if writing to stdout fails.
pub fn send_kitty_image(
    id: PreviewId,
    base64_png: &str,
    area: Rect,
    image_dims: (u32, u32),
    cell_size: (u16, u16),
) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    let tmux = in_tmux();
    let placement = fit_placement(area, image_dims, cell_size);

    // Restore the cursor even if sending fails.
    stdout.queue(cursor::SavePosition)?;
    let send_result = (|| -> std::io::Result<()> {
        stdout.queue(cursor::MoveTo(placement.x, placement.y))?;
        stdout.flush()?;
        for seq in transmit_sequences(kitty_image_id(id), base64_png, placement) {
            write_passthrough(&mut stdout, &seq, tmux)?;
        }
        Ok(())
    })();

    let restore_result = stdout
        .queue(cursor::RestorePosition)
        .and_then(std::io::Write::flush);

    send_result.and(restore_result)
}

/// Deletes the Kitty image belonging to preview `id`.
///
/// # Errors
/// Returns an error if writing to stdout fails.
pub fn delete_kitty_image(id: PreviewId) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    let seq = format!("\x1b_Ga=d,d=I,i={},q=2\x1b\\", kitty_image_id(id));
    write_passthrough(&mut stdout, seq.as_bytes(), in_tmux())?;
    stdout.flush()
}

/// Writes a Kitty APC sequence, wrapped as `ESC P tmux ; ... ESC \` with
/// every inner ESC doubled when `tmux` is set.
fn write_passthrough(out: &mut impl Write, payload: &[u8], tmux: bool) -> std::io::Result<()> {
    if !tmux {
        return out.write_all(payload);
    }
    let mut wrapped = Vec::with_capacity(payload.len() + 64);
    wrapped.extend_from_slice(b"\x1bPtmux;");
    for &byte in payload {
        if byte == 0x1b {
            wrapped.push(0x1b);
        }
        wrapped.push(byte);
    }
    wrapped.extend_from_slice(b"\x1b\\");
    out.write_all(&wrapped)
}
