//! TUI reducer.
//!
//! The runtime calls `update(app, event)` for every event and executes the
//! returned effects. All state changes happen here.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use docchat_core::core::{ContentKind, Resolution};
use docchat_core::files::RawFile;
use ratatui::layout::Rect;

use crate::chat::{build_chat_lines, chat_inner_area};
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::mutations::StateMutation;
use crate::overlays::{
    AlertState, FilePickerState, ImagePreviewState, Overlay, OverlayExt, OverlayRequest,
    OverlayTransition, OverlayUpdate,
};
use crate::render::AppLayout;
use crate::state::{AppState, TuiState};

/// Title of the alert shown when a selection cannot be attached.
pub const SELECTION_ALERT_TITLE: &str = "Cannot attach";

/// Lines scrolled per mouse wheel step.
const WHEEL_LINES: usize = 3;

/// The main reducer.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    let mut effects = match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            app.tui.status_line.expire(Instant::now());
            vec![]
        }
        UiEvent::Frame { width, height } => {
            handle_frame(&mut app.tui, width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::TaskStarted { kind, started } => {
            app.tui.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tui.tasks.state_mut(kind).finish_if_active(completed.id) {
                update(app, *completed.result)
            } else {
                tracing::debug!(?kind, id = completed.id.0, "dropping superseded task result");
                vec![]
            }
        }
        UiEvent::SelectionLoaded(Ok(files)) => apply_selection(app, files),
        UiEvent::SelectionLoaded(Err(error)) => {
            open_overlay_request(
                app,
                OverlayRequest::Alert {
                    title: SELECTION_ALERT_TITLE.to_string(),
                    message: error,
                },
            )
        }
        UiEvent::UploadFinished { ticket, result } => {
            if app.tui.controller.upload_resolved(ticket, result) == Resolution::Discarded {
                tracing::debug!("upload result ignored");
            }
            vec![]
        }
        UiEvent::AskFinished { ticket, result } => {
            if app.tui.controller.ask_resolved(ticket, result) == Resolution::Discarded {
                tracing::debug!("answer ignored");
            }
            vec![]
        }
        UiEvent::PreviewDecoded { id, result } => {
            if let Err(error) = &result {
                tracing::warn!(%id, %error, "preview decode failed");
            }
            if !app.tui.preview.set_decoded(id, result) {
                tracing::debug!(%id, "decoded preview no longer current");
            }
            vec![]
        }
        UiEvent::FilesDiscovered(files) => {
            app.overlay.files_discovered(files);
            vec![]
        }
    };

    effects.extend(sync_preview(app));
    effects
}

/// Reconciles the preview pane with the controller's current preview handle.
///
/// Starts a decode when a new image handle appears, closes the zoom overlay
/// once zoom is gone, and turns released handles into cleanup effects.
fn sync_preview(app: &mut AppState) -> Vec<UiEffect> {
    let mut effects = Vec::new();
    let tui = &mut app.tui;

    let current = tui
        .controller
        .current_preview()
        .map(|handle| (handle.id(), handle.attachment().clone()));
    if tui.preview.track(current.as_ref().map(|(id, _)| *id))
        && let Some((id, attachment)) = current
        && attachment.kind() == ContentKind::Image
    {
        effects.push(UiEffect::DecodePreview {
            task: tui.task_seq.next_id(),
            id,
            path: attachment.path().to_path_buf(),
            max_edge: tui.config.preview.max_edge_px,
        });
    }

    if app
        .overlay
        .as_ref()
        .is_some_and(Overlay::is_image_preview)
        && !tui.controller.preview().is_zoomed()
    {
        app.overlay = None;
    }

    let released = tui.controller.preview_ledger().drain_released();
    if !released.is_empty() {
        effects.push(UiEffect::ReleasePreviews { ids: released });
    }
    effects
}

fn handle_frame(tui: &mut TuiState, width: u16, height: u16) {
    tui.viewport = (width, height);

    let inner = chat_inner_area(AppLayout::new(Rect::new(0, 0, width, height)).chat);
    let viewport_height = inner.height as usize;
    tui.chat.viewport_height = viewport_height;

    let turns = tui.controller.conversation().len();
    if turns != tui.chat.seen_turns {
        tui.chat.seen_turns = turns;
        tui.chat.scroll.follow();
    }

    if !tui.chat.scroll.is_following() {
        let total = build_chat_lines(tui, inner.width as usize).len();
        tui.chat.scroll.clamp(total, viewport_height);
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => {
            if app.overlay.is_none() && app.tui.input_enabled() {
                app.tui.input.insert_str(&text);
            }
            vec![]
        }
        Event::Mouse(mouse) if app.overlay.is_none() => {
            match mouse.kind {
                MouseEventKind::ScrollUp => app.tui.chat.scroll.scroll_up(WHEEL_LINES),
                MouseEventKind::ScrollDown => app.tui.chat.scroll.scroll_down(WHEEL_LINES),
                _ => {}
            }
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if let Some(overlay) = app.overlay.as_mut() {
        let update = overlay.handle_key(&app.tui, key);
        return apply_overlay_update(app, update);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Char('c' | 'q') if ctrl => vec![UiEffect::Quit],
        KeyCode::Char('o') if ctrl => open_overlay_request(app, OverlayRequest::FilePicker),
        KeyCode::Char('f') if ctrl => open_overlay_request(app, OverlayRequest::ImagePreview),
        KeyCode::Left if alt => apply_mutations(app, vec![StateMutation::PreviousPreview]),
        KeyCode::Right if alt => apply_mutations(app, vec![StateMutation::NextPreview]),
        KeyCode::Char('p') if ctrl => apply_mutations(app, vec![StateMutation::PreviousPreview]),
        KeyCode::Char('n') if ctrl => apply_mutations(app, vec![StateMutation::NextPreview]),
        KeyCode::PageUp => {
            let page = app.tui.chat.page();
            app.tui.chat.scroll.scroll_up(page);
            vec![]
        }
        KeyCode::PageDown => {
            let page = app.tui.chat.page();
            app.tui.chat.scroll.scroll_down(page);
            vec![]
        }
        KeyCode::Enter => submit_question(&mut app.tui),
        KeyCode::Esc => {
            app.tui.input.clear();
            vec![]
        }
        _ => {
            if app.tui.input_enabled() {
                app.tui.input.input(key);
            }
            vec![]
        }
    }
}

fn submit_question(tui: &mut TuiState) -> Vec<UiEffect> {
    match tui.controller.ask(tui.input.text()) {
        Ok(request) => {
            tui.input.clear();
            tui.status_line.clear_hint();
            tui.chat.scroll.follow();
            vec![UiEffect::Ask {
                task: tui.task_seq.next_id(),
                request,
            }]
        }
        Err(rejection) => {
            tui.status_line
                .set_hint(rejection.to_string(), Instant::now());
            vec![]
        }
    }
}

/// Feeds inspected files to the controller. An accepted set supersedes
/// whatever upload or question was in flight.
fn apply_selection(app: &mut AppState, files: Vec<RawFile>) -> Vec<UiEffect> {
    match app.tui.controller.select_files(files) {
        Ok(request) => {
            let tui = &mut app.tui;
            let mut effects = cancel_in_flight(tui);
            tui.input.clear();
            tui.status_line.clear_hint();
            tui.chat.scroll.follow();
            effects.push(UiEffect::Upload {
                task: tui.task_seq.next_id(),
                request,
            });
            effects
        }
        Err(error) => open_overlay_request(
            app,
            OverlayRequest::Alert {
                title: SELECTION_ALERT_TITLE.to_string(),
                message: error.to_string(),
            },
        ),
    }
}

fn cancel_in_flight(tui: &TuiState) -> Vec<UiEffect> {
    [TaskKind::Upload, TaskKind::Ask]
        .into_iter()
        .filter(|kind| tui.tasks.state(*kind).is_running())
        .map(|kind| UiEffect::CancelTask {
            kind,
            token: tui.tasks.state(kind).cancel.clone(),
        })
        .collect()
}

/// Starts reading `paths` (as chosen in the picker or given on the command line).
pub fn load_selection(tui: &mut TuiState, paths: Vec<PathBuf>) -> Vec<UiEffect> {
    if paths.is_empty() {
        return vec![];
    }
    vec![UiEffect::LoadSelection {
        task: tui.task_seq.next_id(),
        paths,
    }]
}

fn apply_mutations(app: &mut AppState, mutations: Vec<StateMutation>) -> Vec<UiEffect> {
    let mut effects = Vec::new();
    let tui = &mut app.tui;
    let browsable = tui.controller.attachments().len() > 1;

    for mutation in mutations {
        match mutation {
            StateMutation::ChooseFiles(relative) => {
                let paths = relative.into_iter().map(|p| tui.root.join(p)).collect();
                effects.extend(load_selection(tui, paths));
            }
            StateMutation::NextPreview if browsable => tui.controller.next_preview(),
            StateMutation::PreviousPreview if browsable => tui.controller.previous_preview(),
            StateMutation::NextPreview | StateMutation::PreviousPreview => {}
            StateMutation::Unzoom => tui.controller.unzoom(),
        }
    }
    effects
}

fn apply_overlay_update(app: &mut AppState, update: OverlayUpdate) -> Vec<UiEffect> {
    let OverlayUpdate {
        transition,
        mutations,
        mut effects,
    } = update;

    match transition {
        OverlayTransition::Stay => {}
        OverlayTransition::Close => app.overlay = None,
        OverlayTransition::Open(request) => {
            app.overlay = None;
            effects.extend(open_overlay_request(app, request));
        }
    }
    effects.extend(apply_mutations(app, mutations));
    effects
}

fn open_overlay_request(app: &mut AppState, request: OverlayRequest) -> Vec<UiEffect> {
    let mut effects = Vec::new();
    if let Some(Overlay::FilePicker(_)) = &app.overlay {
        let discovery = app.tui.tasks.state(TaskKind::FileDiscovery);
        if discovery.is_running() {
            effects.push(UiEffect::CancelTask {
                kind: TaskKind::FileDiscovery,
                token: discovery.cancel.clone(),
            });
        }
    }

    match request {
        OverlayRequest::FilePicker => {
            let (picker, open_effects) = FilePickerState::open(app.tui.task_seq.next_id());
            app.overlay = Some(Overlay::FilePicker(picker));
            effects.extend(open_effects);
        }
        OverlayRequest::ImagePreview => {
            if app.tui.controller.zoom() {
                app.overlay = Some(Overlay::ImagePreview(ImagePreviewState));
            } else if app.tui.controller.current_preview().is_some() {
                app.tui
                    .status_line
                    .set_hint("Only images can be zoomed.", Instant::now());
            }
        }
        OverlayRequest::Alert { title, message } => {
            app.overlay = Some(Overlay::Alert(AlertState::new(title, message)));
        }
    }
    effects
}
