//! Shared rendering helpers for overlays.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::common::truncate_start_with_ellipsis;

/// Centers an overlay of the requested size above the input bar.
pub fn calculate_overlay_area(area: Rect, available_height: u16, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(available_height.saturating_sub(2));

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (available_height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Clears the background and draws the bordered, titled frame of an overlay.
pub fn render_overlay_container(frame: &mut Frame, area: Rect, title: &str, border_color: Color) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, area);
}

pub struct OverlayConfig<'a> {
    pub title: &'a str,
    pub border_color: Color,
    pub width: u16,
    pub height: u16,
    pub hints: &'a [InputHint<'a>],
}

pub struct OverlayLayout {
    pub popup: Rect,
    pub body: Rect,
    pub footer: Rect,
}

/// Draws a standard overlay (frame + hint footer) and returns its layout.
pub fn render_overlay(
    frame: &mut Frame,
    area: Rect,
    input_y: u16,
    config: &OverlayConfig<'_>,
) -> OverlayLayout {
    let popup = calculate_overlay_area(area, input_y, config.width, config.height);
    render_overlay_container(frame, popup, config.title, config.border_color);

    let inner = Block::default().borders(Borders::ALL).inner(popup);
    let footer_height = u16::from(!config.hints.is_empty()).min(inner.height);
    let body_height = inner.height.saturating_sub(footer_height);
    let body = Rect::new(inner.x, inner.y, inner.width, body_height);
    let footer = Rect::new(inner.x, inner.y + body_height, inner.width, footer_height);

    if footer_height > 0 {
        render_hints(frame, footer, config.hints, config.border_color);
    }

    OverlayLayout {
        popup,
        body,
        footer,
    }
}

/// One `key action` pair in an overlay footer.
pub struct InputHint<'a> {
    pub key: &'a str,
    pub action: &'a str,
}

impl<'a> InputHint<'a> {
    pub fn new(key: &'a str, action: &'a str) -> Self {
        Self { key, action }
    }
}

/// Renders hints centered on the single row `area`, separated by bullets.
pub fn render_hints(frame: &mut Frame, area: Rect, hints: &[InputHint], highlight_color: Color) {
    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(highlight_color)));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

/// Renders a prompt-style filter line: `> text█`, or the placeholder when empty.
pub fn render_filter_line(
    frame: &mut Frame,
    area: Rect,
    value: &str,
    placeholder: &str,
    accent: Color,
) {
    let max_width = area.width.saturating_sub(3) as usize;
    let mut spans = vec![Span::styled("> ", Style::default().fg(accent))];

    if value.is_empty() {
        spans.push(Span::styled("█", Style::default().fg(accent)));
        spans.push(Span::styled(
            truncate_start_with_ellipsis(placeholder, max_width),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(truncate_start_with_ellipsis(value, max_width)));
        spans.push(Span::styled("█", Style::default().fg(accent)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draws a horizontal rule `y_offset` rows into `area`.
pub fn render_separator(frame: &mut Frame, area: Rect, y_offset: u16) {
    if y_offset >= area.height {
        return;
    }
    let rule = "─".repeat(area.width as usize);
    frame.render_widget(
        Paragraph::new(Span::styled(rule, Style::default().fg(Color::DarkGray))),
        Rect::new(area.x, area.y + y_offset, area.width, 1),
    );
}

/// Returns a rectangle covering the given percentages of `r`, centered.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(rows[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_area_is_clamped_and_centered() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = calculate_overlay_area(area, 30, 50, 10);
        assert_eq!(popup, Rect::new(25, 10, 50, 10));

        let tiny = calculate_overlay_area(Rect::new(0, 0, 20, 10), 8, 50, 20);
        assert_eq!(tiny.width, 16);
        assert_eq!(tiny.height, 6);
    }

    #[test]
    fn test_centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let rect = centered_rect(90, 85, area);
        assert!(rect.x >= area.x && rect.right() <= area.right());
        assert!(rect.y >= area.y && rect.bottom() <= area.bottom());
    }
}
