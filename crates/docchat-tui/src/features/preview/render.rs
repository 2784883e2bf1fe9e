use std::fmt::Write as _;

use docchat_core::core::ContentKind;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::common::text::format_size;
use crate::common::truncate_start_with_ellipsis;
use crate::state::TuiState;

pub const PREVIEW_TITLE: &str = "File Preview";

/// Rows used by the file name and metadata lines.
const HEADER_HEIGHT: u16 = 2;

/// Row used by the counter and navigation hints.
const FOOTER_HEIGHT: u16 = 1;

struct PaneLayout {
    header: Rect,
    body: Rect,
    footer: Rect,
}

fn pane_layout(area: Rect) -> PaneLayout {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let header_h = HEADER_HEIGHT.min(inner.height);
    let footer_h = FOOTER_HEIGHT.min(inner.height.saturating_sub(header_h));
    let body_h = inner.height.saturating_sub(header_h + footer_h);
    let spacer = u16::from(body_h > 1);
    PaneLayout {
        header: Rect::new(inner.x, inner.y, inner.width, header_h),
        body: Rect::new(inner.x, inner.y + header_h + spacer, inner.width, body_h - spacer),
        footer: Rect::new(inner.x, inner.y + header_h + body_h, inner.width, footer_h),
    }
}

/// Cell area where the current image is placed, if one is ready to show.
pub fn preview_image_area(state: &TuiState, area: Rect) -> Option<Rect> {
    let handle = state.controller.current_preview()?;
    if !handle.attachment().is_image() || state.preview.tracked() != Some(handle.id()) {
        return None;
    }
    state.preview.image()?;
    let body = pane_layout(area).body;
    (body.width > 0 && body.height > 0).then_some(body)
}

/// `i / N` position of the current preview, shown only when browsing is possible.
pub fn preview_counter(state: &TuiState) -> Option<String> {
    let total = state.controller.attachments().len();
    (total > 1).then(|| format!("{} / {total}", state.controller.preview().cursor() + 1))
}

pub fn render_preview(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {PREVIEW_TITLE} "),
            Style::default().fg(Color::DarkGray),
        ));
    frame.render_widget(block, area);

    let layout = pane_layout(area);
    let dim = Style::default().fg(Color::DarkGray);

    let Some(handle) = state.controller.current_preview() else {
        let y = layout.body.y + layout.body.height / 2;
        let placeholder = Rect::new(layout.body.x, y, layout.body.width, layout.body.height.min(1));
        frame.render_widget(
            Paragraph::new(PREVIEW_TITLE)
                .style(dim)
                .alignment(Alignment::Center),
            placeholder,
        );
        return;
    };

    let attachment = handle.attachment();
    let width = layout.header.width as usize;

    let mut meta = format!("{} · {}", attachment.kind(), format_size(attachment.size()));
    if let Some(image) = state.preview.image() {
        let _ = write!(meta, " · {}x{}", image.width, image.height);
    }
    let header = vec![
        Line::from(Span::styled(
            truncate_start_with_ellipsis(attachment.name(), width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(meta, dim)),
    ];
    frame.render_widget(Paragraph::new(header), layout.header);

    match attachment.kind() {
        ContentKind::Image => {
            if let Some(error) = state.preview.error() {
                frame.render_widget(
                    Paragraph::new(error).style(Style::default().fg(Color::Red)),
                    layout.body,
                );
            } else if state.preview.image().is_some() {
                // Placed after draw by the runtime.
                frame.render_widget(Clear, layout.body);
            } else {
                frame.render_widget(Paragraph::new("Loading…").style(dim), layout.body);
            }
        }
        ContentKind::Pdf => {
            let lines = vec![
                Line::from(Span::styled("PDF document", Style::default().fg(Color::Magenta))),
                Line::from(Span::styled("No inline preview for PDFs.", dim)),
            ];
            frame.render_widget(Paragraph::new(lines), layout.body);
        }
    }

    render_footer(state, frame, layout.footer, attachment.is_image());
}

fn render_footer(state: &TuiState, frame: &mut Frame, area: Rect, is_image: bool) {
    if area.height == 0 {
        return;
    }
    let key = Style::default().fg(Color::Cyan);
    let dim = Style::default().fg(Color::DarkGray);

    let mut spans = Vec::new();
    if let Some(counter) = preview_counter(state) {
        spans.push(Span::styled("‹ ", key));
        spans.push(Span::raw(counter));
        spans.push(Span::styled(" ›", key));
        spans.push(Span::styled("  Alt+←/→", key));
        spans.push(Span::styled(" browse", dim));
    }
    if is_image {
        spans.push(Span::styled("  Ctrl+F", key));
        spans.push(Span::styled(" zoom", dim));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}
