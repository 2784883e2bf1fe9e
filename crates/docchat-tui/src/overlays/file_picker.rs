#![allow(clippy::cast_possible_truncation)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use docchat_core::files::is_supported_extension;
use ignore::WalkBuilder;
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use tokio_util::sync::CancellationToken;

use super::OverlayUpdate;
use crate::common::{TaskId, TaskKind};
use crate::effects::UiEffect;
use crate::mutations::StateMutation;
use crate::state::TuiState;

const MAX_VISIBLE_FILES: usize = 12;
const MAX_DEPTH: usize = 15;
const FILTER_PLACEHOLDER: &str = "type to filter";

#[derive(Debug, Clone)]
pub struct FileMatch {
    /// Index into `files`.
    pub file_idx: usize,
    /// `None` when no filter is applied.
    pub score: Option<i64>,
    /// Byte offsets of matched characters.
    pub match_indices: Vec<usize>,
}

/// Multi-select document picker.
///
/// Marks are kept in the order they were made; that order becomes the
/// attachment order.
#[derive(Debug)]
pub struct FilePickerState {
    pub files: Vec<PathBuf>,
    pub filtered: Vec<FileMatch>,
    pub filter: String,
    /// File indices, in marking order.
    pub marked: Vec<usize>,
    pub selected: usize,
    pub offset: usize,
    pub loading: bool,
}

impl FilePickerState {
    pub fn open(task: TaskId) -> (Self, Vec<UiEffect>) {
        (
            Self {
                files: Vec::new(),
                filtered: Vec::new(),
                filter: String::new(),
                marked: Vec::new(),
                selected: 0,
                offset: 0,
                loading: true,
            },
            vec![UiEffect::DiscoverFiles { task }],
        )
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16) {
        render_file_picker(frame, self, area, input_y);
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Esc => self.close(tui),
            KeyCode::Char('c') if ctrl => self.close(tui),
            KeyCode::Enter => {
                let chosen = self.chosen_files();
                if chosen.is_empty() {
                    return OverlayUpdate::stay();
                }
                self.close(tui)
                    .with_mutations(vec![StateMutation::ChooseFiles(chosen)])
            }
            KeyCode::Up => {
                self.select_prev();
                OverlayUpdate::stay()
            }
            KeyCode::Down => {
                self.select_next();
                OverlayUpdate::stay()
            }
            KeyCode::Char('p') if ctrl => {
                self.select_prev();
                OverlayUpdate::stay()
            }
            KeyCode::Char('n') if ctrl => {
                self.select_next();
                OverlayUpdate::stay()
            }
            KeyCode::Char(' ') | KeyCode::Tab => {
                self.toggle_mark();
                OverlayUpdate::stay()
            }
            KeyCode::Backspace => {
                if self.filter.pop().is_some() {
                    let filter = self.filter.clone();
                    self.apply_filter(&filter);
                }
                OverlayUpdate::stay()
            }
            KeyCode::Char(c) if !ctrl && !alt => {
                self.filter.push(c);
                let filter = self.filter.clone();
                self.apply_filter(&filter);
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    fn close(&self, tui: &TuiState) -> OverlayUpdate {
        let discovery = tui.tasks.state(TaskKind::FileDiscovery);
        if !discovery.is_running() {
            return OverlayUpdate::close();
        }
        OverlayUpdate::close().with_ui_effects(vec![UiEffect::CancelTask {
            kind: TaskKind::FileDiscovery,
            token: discovery.cancel.clone(),
        }])
    }

    fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            if self.selected < self.offset {
                self.offset = self.selected;
            }
        }
    }

    fn select_next(&mut self) {
        if self.selected < self.filtered.len().saturating_sub(1) {
            self.selected += 1;
            if self.selected >= self.offset + MAX_VISIBLE_FILES {
                self.offset = self.selected + 1 - MAX_VISIBLE_FILES;
            }
        }
    }

    fn toggle_mark(&mut self) {
        let Some(idx) = self.filtered.get(self.selected).map(|m| m.file_idx) else {
            return;
        };
        if let Some(pos) = self.marked.iter().position(|&m| m == idx) {
            self.marked.remove(pos);
        } else {
            self.marked.push(idx);
        }
        self.select_next();
    }

    pub fn is_marked(&self, file_idx: usize) -> bool {
        self.marked.contains(&file_idx)
    }

    pub fn selected_file(&self) -> Option<&PathBuf> {
        self.filtered
            .get(self.selected)
            .and_then(|m| self.files.get(m.file_idx))
    }

    /// Marked files in marking order, or the highlighted file if none are marked.
    pub fn chosen_files(&self) -> Vec<PathBuf> {
        if self.marked.is_empty() {
            return self.selected_file().cloned().into_iter().collect();
        }
        self.marked
            .iter()
            .filter_map(|&idx| self.files.get(idx).cloned())
            .collect()
    }

    pub fn apply_filter(&mut self, pattern: &str) {
        if pattern.is_empty() {
            self.filtered = unfiltered(self.files.len());
        } else {
            let mut matcher = Matcher::new(Config::DEFAULT);
            let pattern = Pattern::parse(pattern, CaseMatching::Ignore, Normalization::Smart);

            let mut matched: Vec<FileMatch> = self
                .files
                .iter()
                .enumerate()
                .filter_map(|(idx, path)| {
                    let path_str = path.to_string_lossy();
                    let mut buf = Vec::new();
                    let haystack = Utf32Str::new(&path_str, &mut buf);

                    pattern.score(haystack, &mut matcher).map(|score| {
                        let mut char_indices = Vec::new();
                        pattern.indices(haystack, &mut matcher, &mut char_indices);
                        FileMatch {
                            file_idx: idx,
                            score: Some(i64::from(score)),
                            match_indices: char_to_byte_indices(&path_str, &char_indices),
                        }
                    })
                })
                .collect();

            matched.sort_by_key(|m| std::cmp::Reverse(m.score.unwrap_or(i64::MIN)));
            self.filtered = matched;
        }

        self.selected = 0;
        self.offset = 0;
    }

    pub fn set_files(&mut self, files: Vec<PathBuf>) {
        self.files = files;
        self.loading = false;
        self.marked.clear();
        let filter = self.filter.clone();
        self.apply_filter(&filter);
    }
}

fn unfiltered(len: usize) -> Vec<FileMatch> {
    (0..len)
        .map(|idx| FileMatch {
            file_idx: idx,
            score: None,
            match_indices: Vec::new(),
        })
        .collect()
}

/// Lists attachable documents under `root`, honoring ignore files.
///
/// Paths are relative to `root` and sorted. Files whose extension is not a
/// supported document type are skipped.
pub fn discover_files(root: &Path, cancel: &CancellationToken) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(root)
        .standard_filters(true)
        .max_depth(Some(MAX_DEPTH))
        .build();

    for entry in walker.flatten() {
        if cancel.is_cancelled() {
            return files;
        }
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if !is_supported_extension(&entry.path().to_string_lossy()) {
            continue;
        }
        if let Ok(rel_path) = entry.path().strip_prefix(root)
            && !rel_path.as_os_str().is_empty()
        {
            files.push(rel_path.to_path_buf());
        }
    }

    files.sort();
    files
}

/// Nucleo reports char positions; highlighting works on byte offsets.
fn char_to_byte_indices(text: &str, char_indices: &[u32]) -> Vec<usize> {
    if char_indices.is_empty() {
        return Vec::new();
    }
    let wanted: HashSet<u32> = char_indices.iter().copied().collect();
    text.char_indices()
        .enumerate()
        .filter(|(char_idx, _)| wanted.contains(&(*char_idx as u32)))
        .map(|(_, (byte_idx, _))| byte_idx)
        .collect()
}

fn span_style(is_match: bool) -> Style {
    if is_match {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

/// Splits `text` into spans, emphasizing the bytes in `match_indices`.
fn build_highlighted_spans(text: &str, match_indices: &[usize]) -> Vec<Span<'static>> {
    if match_indices.is_empty() {
        return vec![Span::styled(text.to_string(), span_style(false))];
    }

    let match_set: HashSet<usize> = match_indices.iter().copied().collect();
    let mut spans = Vec::new();
    let mut current = String::new();
    let mut current_is_match = false;

    for (byte_idx, ch) in text.char_indices() {
        let is_match = match_set.contains(&byte_idx);
        if is_match != current_is_match && !current.is_empty() {
            spans.push(Span::styled(
                std::mem::take(&mut current),
                span_style(current_is_match),
            ));
        }
        current.push(ch);
        current_is_match = is_match;
    }
    if !current.is_empty() {
        spans.push(Span::styled(current, span_style(current_is_match)));
    }
    spans
}

/// Keeps the tail of `path` within `max_width` bytes, shifting match offsets.
fn truncate_path(path: &str, match_indices: &[usize], max_width: usize) -> (String, Vec<usize>) {
    if path.len() <= max_width || max_width < 2 {
        return (path.to_string(), match_indices.to_vec());
    }
    let mut cut = path.len() + 1 - max_width;
    while !path.is_char_boundary(cut) {
        cut += 1;
    }
    let ellipsis_len = '…'.len_utf8();
    let shifted = match_indices
        .iter()
        .filter(|&&idx| idx >= cut)
        .map(|&idx| idx - cut + ellipsis_len)
        .collect();
    (format!("…{}", &path[cut..]), shifted)
}

pub fn render_file_picker(
    frame: &mut Frame,
    picker: &FilePickerState,
    area: Rect,
    input_top_y: u16,
) {
    use super::render_utils::{
        InputHint, OverlayConfig, render_filter_line, render_overlay, render_separator,
    };

    let match_count = picker.filtered.len();
    let visible_count = match_count.min(MAX_VISIBLE_FILES);
    let body_rows = if picker.loading || match_count == 0 {
        3
    } else {
        visible_count as u16
    };
    // Borders, filter line, separator and footer.
    let height = body_rows + 5;

    let title = if picker.loading {
        "Attach documents (loading...)".to_string()
    } else if picker.marked.is_empty() {
        format!("Attach documents ({})", picker.files.len())
    } else {
        format!(
            "Attach documents ({}) · {} marked",
            picker.files.len(),
            picker.marked.len()
        )
    };
    let hints = [
        InputHint::new("↑↓", "nav"),
        InputHint::new("Space", "mark"),
        InputHint::new("Enter", "attach"),
        InputHint::new("Esc", "close"),
    ];
    let layout = render_overlay(
        frame,
        area,
        input_top_y,
        &OverlayConfig {
            title: &title,
            border_color: Color::Blue,
            width: 64,
            height,
            hints: &hints,
        },
    );

    if layout.body.height == 0 {
        return;
    }
    let filter_area = Rect::new(layout.body.x, layout.body.y, layout.body.width, 1);
    render_filter_line(
        frame,
        filter_area,
        &picker.filter,
        FILTER_PLACEHOLDER,
        Color::Blue,
    );
    render_separator(frame, layout.body, 1);

    let list_area = Rect::new(
        layout.body.x,
        layout.body.y + 2,
        layout.body.width,
        layout.body.height.saturating_sub(2),
    );

    if picker.loading || picker.filtered.is_empty() {
        let message = if picker.loading {
            "Looking for documents..."
        } else if picker.files.is_empty() {
            "No images or PDFs found"
        } else {
            "No matches"
        };
        frame.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            list_area,
        );
        return;
    }

    let list_height = list_area.height as usize;
    // "▶ " plus "[x] ".
    let max_width = list_area.width.saturating_sub(6) as usize;

    let items: Vec<ListItem> = picker
        .filtered
        .iter()
        .skip(picker.offset)
        .take(list_height)
        .filter_map(|file_match| {
            let path = picker.files.get(file_match.file_idx)?;
            let (display, indices) =
                truncate_path(&path.to_string_lossy(), &file_match.match_indices, max_width);

            let mark = if picker.is_marked(file_match.file_idx) {
                Span::styled("[x] ", Style::default().fg(Color::Green))
            } else {
                Span::styled("[ ] ", Style::default().fg(Color::DarkGray))
            };
            let mut spans = vec![mark];
            spans.extend(build_highlighted_spans(&display, &indices));
            Some(ListItem::new(Line::from(spans)))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(Some(picker.selected.saturating_sub(picker.offset)));
    frame.render_stateful_widget(list, list_area, &mut list_state);
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crossterm::event::{KeyEventKind, KeyEventState};
    use docchat_core::config::Config as AppConfig;

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

    fn tui() -> TuiState {
        TuiState::new(AppConfig::default(), PathBuf::from("."))
    }

    fn picker_with(files: &[&str]) -> FilePickerState {
        let (mut picker, _) = FilePickerState::open(TaskId(0));
        picker.set_files(files.iter().map(PathBuf::from).collect());
        picker
    }

    fn chosen(update: OverlayUpdate) -> Option<Vec<PathBuf>> {
        assert!(matches!(update.transition, OverlayTransition::Close));
        update.mutations.into_iter().find_map(|m| match m {
            StateMutation::ChooseFiles(files) => Some(files),
            _ => None,
        })
    }

    #[test]
    fn test_open_requests_discovery() {
        let (picker, effects) = FilePickerState::open(TaskId(7));
        assert!(picker.loading);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::DiscoverFiles { task: TaskId(7) }]
        ));
    }

    #[test]
    fn test_enter_without_marks_chooses_highlighted() {
        let tui = tui();
        let mut picker = picker_with(&["a.png", "b.png", "c.pdf"]);

        let _ = picker.handle_key(&tui, key(KeyCode::Down));
        let files = chosen(picker.handle_key(&tui, key(KeyCode::Enter)));

        assert_eq!(files, Some(vec![PathBuf::from("b.png")]));
    }

    #[test]
    fn test_marks_are_chosen_in_marking_order() {
        let tui = tui();
        let mut picker = picker_with(&["a.png", "b.png", "c.png"]);

        // Mark c, then a.
        let _ = picker.handle_key(&tui, key(KeyCode::Down));
        let _ = picker.handle_key(&tui, key(KeyCode::Down));
        let _ = picker.handle_key(&tui, key(KeyCode::Char(' ')));
        let _ = picker.handle_key(&tui, key(KeyCode::Up));
        let _ = picker.handle_key(&tui, key(KeyCode::Up));
        let _ = picker.handle_key(&tui, key(KeyCode::Char(' ')));

        let files = chosen(picker.handle_key(&tui, key(KeyCode::Enter)));
        assert_eq!(
            files,
            Some(vec![PathBuf::from("c.png"), PathBuf::from("a.png")])
        );
    }

    #[test]
    fn test_space_toggles_mark_off() {
        let tui = tui();
        let mut picker = picker_with(&["a.png", "b.png"]);

        let _ = picker.handle_key(&tui, key(KeyCode::Char(' ')));
        assert!(picker.is_marked(0));
        let _ = picker.handle_key(&tui, key(KeyCode::Up));
        let _ = picker.handle_key(&tui, key(KeyCode::Char(' ')));
        assert!(picker.marked.is_empty());
    }

    #[test]
    fn test_enter_on_empty_list_stays_open() {
        let tui = tui();
        let mut picker = picker_with(&[]);
        let update = picker.handle_key(&tui, key(KeyCode::Enter));
        assert!(matches!(update.transition, OverlayTransition::Stay));
    }

    #[test]
    fn test_typing_filters_and_backspace_restores() {
        let tui = tui();
        let mut picker = picker_with(&["scans/invoice.pdf", "photos/cat.png"]);

        for c in "cat".chars() {
            let _ = picker.handle_key(&tui, key(KeyCode::Char(c)));
        }
        assert_eq!(picker.filter, "cat");
        assert_eq!(picker.filtered.len(), 1);
        assert_eq!(picker.selected_file(), Some(&PathBuf::from("photos/cat.png")));

        for _ in 0..3 {
            let _ = picker.handle_key(&tui, key(KeyCode::Backspace));
        }
        assert_eq!(picker.filtered.len(), 2);
    }

    #[test]
    fn test_escape_closes_without_choice() {
        let tui = tui();
        let mut picker = picker_with(&["a.png"]);
        let update = picker.handle_key(&tui, key(KeyCode::Esc));
        assert!(chosen(update).is_none());
    }

    #[test]
    fn test_escape_cancels_running_discovery() {
        use crate::common::{TaskMeta, TaskStarted};

        let mut tui = tui();
        let token = CancellationToken::new();
        tui.tasks
            .state_mut(TaskKind::FileDiscovery)
            .on_started(&TaskStarted {
                id: TaskId(3),
                cancel: Some(token.clone()),
                meta: TaskMeta::None,
            });
        let (mut picker, _) = FilePickerState::open(TaskId(3));

        let update = picker.handle_key(&tui, key(KeyCode::Esc));
        assert!(matches!(
            update.effects.as_slice(),
            [UiEffect::CancelTask {
                kind: TaskKind::FileDiscovery,
                token: Some(_)
            }]
        ));
    }

    #[test]
    fn test_fuzzy_matching_ranks_by_score() {
        let mut picker = picker_with(&[
            "deeply/nested/report.pdf",
            "report.pdf",
            "misc/r_e_p_o_r_t.png",
        ]);
        picker.apply_filter("report");

        assert!(picker.filtered.len() >= 2);
        for m in &picker.filtered {
            assert!(m.score.is_some());
        }
        for window in picker.filtered.windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[test]
    fn test_fuzzy_matching_captures_byte_indices() {
        let mut picker = picker_with(&["docs/scan.pdf"]);
        picker.apply_filter("scan");

        let m = &picker.filtered[0];
        for idx in 5..9 {
            assert!(m.match_indices.contains(&idx));
        }
    }

    #[test]
    fn test_fuzzy_matching_no_match() {
        let mut picker = picker_with(&["a.png", "b.pdf"]);
        picker.apply_filter("xyz123");
        assert!(picker.filtered.is_empty());
        assert!(picker.chosen_files().is_empty());
    }

    #[test]
    fn test_highlighted_spans_split_on_matches() {
        let spans = build_highlighted_spans("docs/scan.pdf", &[5, 6, 7, 8]);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].content, "docs/");
        assert_eq!(spans[0].style.fg, Some(Color::Cyan));
        assert_eq!(spans[1].content, "scan");
        assert_eq!(spans[1].style.fg, Some(Color::Yellow));
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(spans[2].content, ".pdf");
    }

    #[test]
    fn test_truncate_path_keeps_tail_and_shifts_indices() {
        let (display, indices) = truncate_path("aaaaaaaaaa/scan.pdf", &[0, 11, 12], 10);
        assert!(display.starts_with('…'));
        assert!(display.ends_with("scan.pdf"));
        // Index 0 falls in the cut prefix.
        assert_eq!(indices.len(), 2);
        assert_eq!(&display[indices[0]..=indices[0]], "s");
    }

    #[test]
    fn test_truncate_path_respects_char_boundaries() {
        let (display, _) = truncate_path("ééééé/x.png", &[], 8);
        assert!(display.ends_with("x.png"));
    }

    #[test]
    fn test_discover_files_lists_supported_documents() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.pdf"), b"%PDF-1.4").unwrap();
        fs::write(dir.path().join("nested/a.png"), b"png").unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();

        let files = discover_files(dir.path(), &CancellationToken::new());

        assert_eq!(
            files,
            vec![PathBuf::from("b.pdf"), PathBuf::from("nested/a.png")]
        );
    }

    #[test]
    fn test_discover_files_stops_when_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(discover_files(dir.path(), &cancel).is_empty());
    }
}
