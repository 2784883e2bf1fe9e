//! Pure view functions.
//!
//! Everything here takes `&AppState`, draws to a ratatui `Frame`, and never
//! mutates state. Image pixels are the one exception to "everything is drawn
//! here": the runtime places them after the draw, at [`kitty_target`].

use docchat_core::core::PreviewId;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::chat::render_chat;
use crate::input::{INPUT_HEIGHT, render_input};
use crate::overlays::OverlayExt;
use crate::overlays::image_preview::overlay_inner_area;
use crate::preview::{preview_image_area, render_preview};
use crate::state::AppState;
use crate::statusline::render_status_line;

pub const APP_TITLE: &str = "Doc.ChatAI";

const TITLE_HEIGHT: u16 = 1;
const STATUS_HEIGHT: u16 = 1;

/// Share of the body width given to the chat pane.
const CHAT_PERCENT: u16 = 60;

/// Screen regions of the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub title: Rect,
    pub chat: Rect,
    pub preview: Rect,
    pub input: Rect,
    pub status: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TITLE_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(INPUT_HEIGHT),
                Constraint::Length(STATUS_HEIGHT),
            ])
            .split(area);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(CHAT_PERCENT),
                Constraint::Percentage(100 - CHAT_PERCENT),
            ])
            .split(rows[1]);

        Self {
            title: rows[0],
            chat: body[0],
            preview: body[1],
            input: rows[2],
            status: rows[3],
        }
    }
}

pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;
    let layout = AppLayout::new(area);

    render_title(frame, layout.title);
    render_chat(state, frame, layout.chat);
    render_preview(state, frame, layout.preview);
    render_input(state, frame, layout.input, app.overlay.is_none());
    render_status_line(state, frame, layout.status);

    app.overlay.render(frame, area, layout.input.y, state);
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Line::from(Span::styled(
        APP_TITLE,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(title).alignment(Alignment::Center), area);
}

/// Where the current decoded image should be placed for a terminal of size
/// `area`, or `None` if no image is visible.
pub fn kitty_target(app: &AppState, area: Rect) -> Option<(PreviewId, Rect)> {
    let tui = &app.tui;
    let id = tui.preview.tracked()?;
    tui.preview.image()?;

    match &app.overlay {
        None => preview_image_area(tui, AppLayout::new(area).preview).map(|rect| (id, rect)),
        Some(overlay) if overlay.is_image_preview() => {
            let inner = overlay_inner_area(area);
            (inner.width > 0 && inner.height > 0).then_some((id, inner))
        }
        Some(_) => None,
    }
}
