//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! All side effects happen here. The reducer stays pure and produces
//! effects; this module executes them and feeds results back through the
//! inbox.
//!
//! Structure:
//! - `mod.rs`: `TuiRuntime`, event loop, effect dispatch, image placement
//! - `inbox.rs`: inbox channel types
//! - `handlers/`: async effect handlers (backend calls, file I/O)
//! - `image_ops.rs`: preview decoding and terminal pixel geometry

mod handlers;
mod image_ops;
mod inbox;

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use docchat_core::backend::BackendClient;
use docchat_core::config::Config;
use docchat_core::core::PreviewId;
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskMeta, TaskStarted};
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::overlays::image_preview::{delete_kitty_image, send_kitty_image};
use crate::state::AppState;
use crate::terminal::TuiTerminal;
use crate::{render, terminal, update};

/// Frame cadence while something is happening (~60fps).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. The terminal is restored on drop and on
/// panic.
pub struct TuiRuntime {
    terminal: TuiTerminal,
    pub state: AppState,
    client: BackendClient,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    last_tick: Instant,
    last_terminal_event: Instant,
    /// Image currently shown through the Kitty graphics protocol.
    placed: Option<(PreviewId, Rect)>,
}

impl TuiRuntime {
    /// Creates the runtime and starts loading `files` given on the command line.
    ///
    /// # Errors
    /// Returns an error if the backend client or the terminal cannot be set up.
    pub fn new(config: Config, root: PathBuf, files: Vec<PathBuf>) -> Result<Self> {
        let client = BackendClient::new(&config).context("Failed to create backend client")?;

        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let state = AppState::new(config, root);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let now = Instant::now();
        let mut runtime = Self {
            terminal,
            state,
            client,
            inbox_tx,
            inbox_rx,
            last_tick: now,
            last_terminal_event: now,
            placed: None,
        };

        let effects = update::load_selection(&mut runtime.state.tui, files);
        runtime.execute_effects(effects);

        Ok(runtime)
    }

    /// Runs the main event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;

        let result = self.event_loop();

        let _ = terminal::disable_input_features();

        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.tui.should_quit {
            let mut events = self.collect_events()?;

            // Layout updates happen before anything else in the batch.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }

                // Only Tick triggers render; this caps the frame rate.
                let marks_dirty = matches!(&event, UiEvent::Tick);

                let effects = update::update(&mut self.state, event);
                if marks_dirty {
                    dirty = true;
                }
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;

                let area = Rect::new(0, 0, size.width, size.height);
                self.sync_kitty(render::kitty_target(&self.state, area));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let needs_fast_poll = self.state.tui.tasks.is_any_running()
            || self.state.tui.controller.is_loading()
            || recent_terminal_activity;

        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let time_until_tick = tick_interval.saturating_sub(self.last_tick.elapsed());

        // Don't block when there is already work in the batch.
        let poll_duration = if events.is_empty() {
            time_until_tick
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Image Placement
    // ========================================================================

    /// Brings the terminal's Kitty placement in line with `desired`.
    fn sync_kitty(&mut self, desired: Option<(PreviewId, Rect)>) {
        if self.placed == desired {
            return;
        }

        if let Some((id, _)) = self.placed.take()
            && let Err(e) = delete_kitty_image(id)
        {
            tracing::warn!(error = %e, preview = %id, "failed to delete preview image");
        }

        let Some((id, rect)) = desired else {
            return;
        };
        let Some(image) = self.state.tui.preview.image() else {
            return;
        };

        match send_kitty_image(
            id,
            &image.base64_png,
            rect,
            (image.width, image.height),
            image_ops::cell_size(),
        ) {
            Ok(()) => self.placed = Some((id, rect)),
            Err(e) => {
                tracing::warn!(error = %e, preview = %id, "failed to place preview image");
            }
        }
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async task with a uniform TaskStarted/TaskCompleted lifecycle.
    fn spawn_task<F, Fut>(&self, kind: TaskKind, id: TaskId, meta: TaskMeta, cancelable: bool, f: F)
    where
        F: FnOnce(Option<CancellationToken>) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let cancel = cancelable.then(CancellationToken::new);
        let started = TaskStarted {
            id,
            cancel: cancel.clone(),
            meta,
        };
        let _ = tx.send(UiEvent::TaskStarted { kind, started });
        tokio::spawn(async move {
            let inner = f(cancel).await;
            let completed = TaskCompleted {
                id,
                result: Box::new(inner),
            };
            let _ = tx.send(UiEvent::TaskCompleted { kind, completed });
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }

            // The runtime just calls cancel(); the task still reports
            // completion and the reducer drops it.
            UiEffect::CancelTask { kind, token } => {
                if let Some(cancel) = token {
                    tracing::debug!(?kind, "cancelling task");
                    cancel.cancel();
                }
            }

            UiEffect::LoadSelection { task, paths } => {
                self.spawn_task(
                    TaskKind::Selection,
                    task,
                    TaskMeta::None,
                    false,
                    move |_| handlers::load_selection(paths),
                );
            }

            UiEffect::Upload { task, request } => {
                let client = self.client.clone();
                let meta = TaskMeta::Upload {
                    files: request.attachments.len(),
                };
                self.spawn_task(TaskKind::Upload, task, meta, true, move |cancel| {
                    handlers::upload(client, request, cancel)
                });
            }

            UiEffect::Ask { task, request } => {
                let client = self.client.clone();
                self.spawn_task(TaskKind::Ask, task, TaskMeta::None, true, move |cancel| {
                    handlers::ask(client, request, cancel)
                });
            }

            UiEffect::DecodePreview {
                task,
                id,
                path,
                max_edge,
            } => {
                self.spawn_task(
                    TaskKind::PreviewDecode,
                    task,
                    TaskMeta::None,
                    false,
                    move |_| handlers::decode_preview(id, path, max_edge),
                );
            }

            UiEffect::ReleasePreviews { ids } => {
                for id in ids {
                    if self.placed.is_some_and(|(placed, _)| placed == id) {
                        self.placed = None;
                    }
                    if let Err(e) = delete_kitty_image(id) {
                        tracing::warn!(error = %e, preview = %id, "failed to release preview image");
                    }
                }
            }

            UiEffect::DiscoverFiles { task } => {
                let root = self.state.tui.root.clone();
                self.spawn_task(
                    TaskKind::FileDiscovery,
                    task,
                    TaskMeta::None,
                    true,
                    move |cancel| handlers::file_discovery(root, cancel),
                );
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        if let Some((id, _)) = self.placed.take() {
            let _ = delete_kitty_image(id);
        }
        let _ = terminal::restore_terminal();
    }
}
