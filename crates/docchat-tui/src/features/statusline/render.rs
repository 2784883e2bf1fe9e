use docchat_core::core::Activity;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::chat::{SPINNER_FRAMES, SPINNER_SPEED_DIVISOR};
use crate::common::{TaskKind, TaskMeta};
use crate::state::TuiState;

/// Files in the running upload, falling back to the attachment set until
/// the task has reported its start.
fn uploading_count(state: &TuiState) -> usize {
    match state.tasks.state(TaskKind::Upload).meta {
        TaskMeta::Upload { files } => files,
        TaskMeta::None => state.controller.attachments().len(),
    }
}

/// Renders the status line below the input.
pub fn render_status_line(state: &TuiState, frame: &mut Frame, area: Rect) {
    let spinner_idx = (state.spinner_frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len();
    let spinner = SPINNER_FRAMES[spinner_idx];
    let dim = Style::default().fg(Color::DarkGray);

    let spans: Vec<Span> = if let Some(hint) = state.status_line.hint() {
        vec![
            Span::styled("! ", Style::default().fg(Color::Yellow)),
            Span::styled(hint.to_string(), Style::default().fg(Color::Yellow)),
        ]
    } else {
        match state.controller.activity() {
            Activity::Uploading { .. } => vec![
                Span::styled(spinner, Style::default().fg(Color::Yellow)),
                Span::raw(" "),
                Span::styled(
                    format!("Uploading {} document(s)...", uploading_count(state)),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw("  "),
                Span::styled("Ctrl+O", dim),
                Span::raw(" replace"),
            ],
            Activity::Asking { .. } => vec![
                Span::styled(spinner, Style::default().fg(Color::Cyan)),
                Span::raw(" "),
                Span::styled("Waiting for answer...", Style::default().fg(Color::Cyan)),
            ],
            Activity::Idle if state.tasks.state(TaskKind::Selection).is_running() => vec![
                Span::styled(spinner, Style::default().fg(Color::Yellow)),
                Span::raw(" "),
                Span::styled("Reading files...", Style::default().fg(Color::Yellow)),
            ],
            Activity::Idle => vec![
                Span::styled("Ctrl+O", dim),
                Span::raw(" attach  "),
                Span::styled("Enter", dim),
                Span::raw(" ask  "),
                Span::styled("PgUp/PgDn", dim),
                Span::raw(" scroll  "),
                Span::styled("Ctrl+C", dim),
                Span::raw(" quit"),
            ],
        }
    };

    let status = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    frame.render_widget(status, area);
}
