//! Modal notice for rejected selections and failed file reads.

#![allow(clippy::cast_possible_truncation)]

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use super::OverlayUpdate;
use super::render_utils::{InputHint, OverlayConfig, render_overlay};
use crate::common::text::wrap_text;

const ALERT_WIDTH: u16 = 56;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertState {
    pub title: String,
    pub message: String,
}

impl AlertState {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q' | ' ') => OverlayUpdate::close(),
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16) {
        let text_width = ALERT_WIDTH.saturating_sub(4) as usize;
        let lines: Vec<Line> = wrap_text(&self.message, text_width)
            .into_iter()
            .map(Line::from)
            .collect();
        // Borders, blank line above the text, footer.
        let height = lines.len() as u16 + 4;

        let hints = [InputHint::new("Enter", "dismiss")];
        let layout = render_overlay(
            frame,
            area,
            input_y,
            &OverlayConfig {
                title: &self.title,
                border_color: Color::Yellow,
                width: ALERT_WIDTH,
                height,
                hints: &hints,
            },
        );

        let body = Rect {
            y: layout.body.y + 1.min(layout.body.height),
            height: layout.body.height.saturating_sub(1),
            ..layout.body
        };
        frame.render_widget(
            Paragraph::new(lines)
                .style(Style::default().fg(Color::White))
                .alignment(Alignment::Center),
            body,
        );
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    use super::*;
    use crate::overlays::OverlayTransition;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_alert_dismisses_on_enter_and_escape() {
        let mut alert = AlertState::new("Cannot attach", "Only one PDF at a time");
        assert!(matches!(
            alert.handle_key(key(KeyCode::Enter)).transition,
            OverlayTransition::Close
        ));
        assert!(matches!(
            alert.handle_key(key(KeyCode::Esc)).transition,
            OverlayTransition::Close
        ));
    }

    #[test]
    fn test_alert_ignores_other_keys() {
        let mut alert = AlertState::new("Cannot attach", "msg");
        let update = alert.handle_key(key(KeyCode::Char('x')));
        assert!(matches!(update.transition, OverlayTransition::Stay));
        assert!(update.mutations.is_empty());
    }
}
