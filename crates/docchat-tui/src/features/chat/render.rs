use docchat_core::core::Sender;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::text::wrap_text;
use crate::state::TuiState;

pub const EMPTY_PLACEHOLDER: &str = "Please attach document(s) to begin";
pub const PROCESSING_PLACEHOLDER: &str = "Processing document(s)...";
pub const THINKING: &str = "Thinking...";

/// Spinner frames shown next to "Thinking...".
pub const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Ticks per spinner frame.
pub const SPINNER_SPEED_DIVISOR: usize = 3;

/// Indent of message bodies under their sender label.
const BODY_INDENT: &str = "  ";

/// Builds every chat line for a pane `width` columns wide.
pub fn build_chat_lines(state: &TuiState, width: usize) -> Vec<Line<'static>> {
    let controller = &state.controller;
    let conversation = controller.conversation();
    let body_width = width.saturating_sub(BODY_INDENT.len()).max(1);
    let mut lines = Vec::new();

    if conversation.is_empty() {
        let text = if controller.attachments().is_empty() {
            EMPTY_PLACEHOLDER
        } else {
            PROCESSING_PLACEHOLDER
        };
        lines.push(Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::default());
    }

    for turn in conversation.turns() {
        let (label, color) = match turn.sender {
            Sender::User => ("You", Color::Cyan),
            Sender::Bot => ("DocChat", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));

        let body_style = if turn.sender == Sender::Bot && turn.text.starts_with("Error: ") {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        for wrapped in wrap_text(&turn.text, body_width) {
            lines.push(Line::from(vec![
                Span::raw(BODY_INDENT),
                Span::styled(wrapped, body_style),
            ]));
        }
        lines.push(Line::default());
    }

    if controller.is_loading() {
        let frame = (state.spinner_frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len();
        lines.push(Line::from(vec![
            Span::styled(SPINNER_FRAMES[frame], Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            Span::styled(THINKING, Style::default().fg(Color::Yellow)),
        ]));
    }

    lines
}

/// Inner area of the chat pane (inside its border).
pub fn chat_inner_area(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

pub fn render_chat(state: &TuiState, frame: &mut Frame, area: Rect) {
    let scrolled = !state.chat.scroll.is_following();
    let title = if scrolled { " Chat (scrolled) " } else { " Chat " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, Style::default().fg(Color::DarkGray)));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let lines = build_chat_lines(state, inner.width as usize);
    let height = inner.height as usize;
    let start = state.chat.scroll.first_visible(lines.len(), height);
    let visible: Vec<Line<'static>> = lines.into_iter().skip(start).take(height).collect();

    frame.render_widget(Paragraph::new(visible), inner);
}
