use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::common::truncate_with_ellipsis;
use crate::state::TuiState;

/// Input box height: one text row plus borders.
pub const INPUT_HEIGHT: u16 = 3;

pub const INPUT_PLACEHOLDER: &str = "Type your query here...";

/// Renders the question input with the attachment summary on the top border
/// and the backend URL on the bottom border.
pub fn render_input(state: &TuiState, frame: &mut ratatui::Frame, area: Rect, show_cursor: bool) {
    let enabled = state.input_enabled();
    let border_color = if enabled { Color::Cyan } else { Color::DarkGray };
    let dim = Style::default().fg(Color::DarkGray);

    let attachments = state.controller.attachments();
    let summary = match attachments.len() {
        0 => " no documents ".to_string(),
        1 => attachments
            .get(0)
            .map(|a| format!(" {} ", truncate_with_ellipsis(a.name(), 30)))
            .unwrap_or_default(),
        n => format!(" {n} images "),
    };

    let session = state.controller.session().map_or_else(
        || Span::styled(" no session ", dim),
        |s| {
            Span::styled(
                format!(" session {} ", truncate_with_ellipsis(s.as_str(), 12)),
                Style::default().fg(Color::Green),
            )
        },
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Line::from(Span::styled(summary, dim)))
        .title_top(Line::from(session).alignment(Alignment::Right))
        .title_bottom(
            Line::from(Span::styled(format!(" {} ", state.config.backend_url), dim))
                .alignment(Alignment::Right),
        );

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let prompt = Span::styled(
        "> ",
        Style::default()
            .fg(border_color)
            .add_modifier(Modifier::BOLD),
    );
    let text_width = inner.width.saturating_sub(2) as usize;

    if state.input.is_empty() {
        let placeholder = Span::styled(
            truncate_with_ellipsis(INPUT_PLACEHOLDER, text_width),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        );
        frame.render_widget(Paragraph::new(Line::from(vec![prompt, placeholder])), inner);
        if enabled && show_cursor {
            frame.set_cursor_position(Position::new(inner.x + 2, inner.y));
        }
        return;
    }

    let (visible, cursor_col) = visible_window(state.input.text(), state.input.cursor(), text_width);
    let style = if enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![prompt, Span::styled(visible, style)])),
        inner,
    );
    if enabled && show_cursor {
        frame.set_cursor_position(Position::new(inner.x + 2 + cursor_col as u16, inner.y));
    }
}

/// Slices `text` so the cursor (in chars) stays within `width` columns.
///
/// Returns the visible text and the cursor column inside it.
fn visible_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let width = width.max(1);

    let mut start = 0;
    let mut cursor_col: usize = chars[..cursor].iter().map(|c| c.width().unwrap_or(0)).sum();
    while cursor_col >= width && start < cursor {
        cursor_col -= chars[start].width().unwrap_or(0);
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for ch in &chars[start..] {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        visible.push(*ch);
        used += w;
    }
    (visible, cursor_col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_window_fits() {
        assert_eq!(visible_window("hello", 5, 10), ("hello".to_string(), 5));
    }

    #[test]
    fn test_visible_window_scrolls_to_cursor() {
        let (visible, col) = visible_window("abcdefghij", 10, 4);
        assert_eq!(visible, "hij");
        assert_eq!(col, 3);

        let (visible, col) = visible_window("abcdefghij", 2, 4);
        assert_eq!(visible, "abcd");
        assert_eq!(col, 2);
    }
}
