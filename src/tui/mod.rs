//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Background work
//!
//! Two kinds of tokio tasks report back through one `std::sync::mpsc` channel
//! of `Action`s, drained once per loop iteration:
//!
//! - the request task spawned for each `Effect::SpawnRequest` (at most one in
//!   flight, guaranteed by the core's `Processing` state)
//! - the liveness probe, which only ever sends `Action::HealthChecked`
//!
//! ## Redraw Strategy
//!
//! - **Animating** (typing placeholder, or a map hint still up): draws every ~80ms.
//! - **Idle**: sleeps up to 500ms, only redraws on events or background actions.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call.

mod component;
pub mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::conversation::{ConversationClient, ConversationRequest, HttpConversationClient};
use crate::core::action::{Action, Effect, UserEvent, update};
use crate::core::config::{MapSettings, ResolvedConfig};
use crate::core::map::DetailView;
use crate::core::message::{MessageContent, MessageLog};
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::message_list::EntryHit;
use crate::tui::components::{
    DetailOverlayState, InputBox, InputEvent, MessageListState, MessageView, OverlayEvent,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Modal input mode: determines how keyboard events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigate entries with arrow keys; digits pick an option or a marker.
    /// Other typing auto-switches to Input.
    Cursor,
    /// Text editing in the input box. Esc switches to Cursor.
    Input,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub input_mode: InputMode,
    pub overlay: DetailOverlayState,
    pub map_settings: MapSettings,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new(MapSettings::default())
    }
}

impl TuiState {
    pub fn new(map_settings: MapSettings) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            input_mode: InputMode::Input, // User expects to type immediately
            overlay: DetailOverlayState::new(),
            map_settings,
        }
    }
}

/// What picking something inside a log entry resolves to.
#[derive(Debug, Clone, PartialEq)]
enum Pick {
    Option(String),
    Marker(DetailView),
}

/// Resolve digit `n` (1-based) against the entry at `index`.
fn pick_by_number(log: &MessageLog, index: usize, n: usize) -> Option<Pick> {
    let i = n.checked_sub(1)?;
    match &log.get(index)?.content {
        MessageContent::QuickOptions { options, .. } => {
            options.get(i).map(|label| Pick::Option(label.clone()))
        }
        MessageContent::GeoResult { markers, .. } => markers
            .get(i)
            .map(|m| Pick::Marker(DetailView::from_marker(i, m))),
        _ => None,
    }
}

/// Resolve a click inside an entry.
fn pick_by_click(
    log: &MessageLog,
    hit: EntryHit,
    width: u16,
    settings: &MapSettings,
) -> Option<Pick> {
    let message = log.get(hit.index)?;
    match &message.content {
        MessageContent::QuickOptions { options, .. } => {
            let i = MessageView::option_at(message, width, hit.row)?;
            options.get(i).map(|label| Pick::Option(label.clone()))
        }
        MessageContent::GeoResult { markers, .. } => {
            let i = MessageView::marker_at(message, width, settings, hit.col, hit.row)?;
            markers
                .get(i)
                .map(|m| Pick::Marker(DetailView::from_marker(i, m)))
        }
        _ => None,
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let client: Arc<dyn ConversationClient> = Arc::new(HttpConversationClient::from_config(&config));
    let mut app = App::new(client, config.base_url.clone());
    let mut tui = TuiState::new(config.map);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let probe = config
        .health_interval
        .map(|interval| spawn_health_probe(app.client.clone(), interval, tx.clone()));

    update(&mut app, Action::Start);

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame
    let mut was_animating = false;

    loop {
        let now = Instant::now();
        tui.input_box.waiting = app.session.is_processing();
        tui.input_box.dimmed = matches!(tui.input_mode, InputMode::Cursor);

        let animating =
            app.session.is_processing() || tui.message_list.hint_pending(now, &tui.map_settings);
        // One more frame after animation stops clears the placeholder or hint
        if animating || was_animating {
            needs_redraw = true;
        }
        was_animating = animating;

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 4.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame, now))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating, long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if matches!(event, TuiEvent::Resize) {
                continue;
            }

            // Ctrl+C always quits regardless of mode
            if matches!(event, TuiEvent::ForceQuit) {
                should_quit |= dispatch(&mut app, Action::Quit, &tx);
                continue;
            }

            // When the overlay is open, route all events to it
            if tui.overlay.is_open() {
                if let Some(OverlayEvent::Closed) = tui.overlay.handle_event(&event) {
                    debug!("Detail overlay closed");
                }
                continue;
            }

            match event {
                TuiEvent::MouseMove(col, row) => {
                    tui.message_list.hovered_index =
                        tui.message_list.hit_test(col, row).map(|hit| hit.index);
                    continue;
                }
                TuiEvent::MouseDown(col, row) => {
                    let [_, _, input_area] = ui::layout_areas(terminal.get_frame().area());
                    if row >= input_area.y {
                        tui.input_mode = InputMode::Input;
                        tui.message_list.selected_index = None;
                        continue;
                    }
                    let pick = tui.message_list.hit_test(col, row).and_then(|hit| {
                        pick_by_click(
                            &app.log,
                            hit,
                            tui.message_list.content_width(),
                            &tui.map_settings,
                        )
                    });
                    if let Some(pick) = pick {
                        should_quit |= apply_pick(&mut app, &mut tui, pick, &tx);
                    }
                    continue;
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.message_list.handle_event(&event);
                    continue;
                }
                _ => {}
            }

            match tui.input_mode {
                InputMode::Input => {
                    if matches!(event, TuiEvent::Escape) {
                        tui.input_mode = InputMode::Cursor;
                        tui.message_list.selected_index = app.log.len().checked_sub(1);
                        tui.message_list.scroll_to_selected();
                        continue;
                    }
                    // Keep the draft while a request is in flight
                    if matches!(event, TuiEvent::Submit) && app.session.is_processing() {
                        debug!("Submit ignored while processing");
                        continue;
                    }
                    if let Some(InputEvent::Submit(text)) = tui.input_box.handle_event(&event) {
                        tui.message_list.stick_to_bottom = true;
                        should_quit |= dispatch(
                            &mut app,
                            Action::User(UserEvent::FreeText(text)),
                            &tx,
                        );
                    }
                }
                InputMode::Cursor => match event {
                    TuiEvent::InputChar(c) if c.is_ascii_digit() => {
                        let n = c.to_digit(10).map(|d| d as usize).unwrap_or(0);
                        let pick = tui
                            .message_list
                            .selected_index
                            .and_then(|idx| pick_by_number(&app.log, idx, n));
                        if let Some(pick) = pick {
                            should_quit |= apply_pick(&mut app, &mut tui, pick, &tx);
                        }
                    }
                    // Typing auto-switches to Input mode and forwards the event
                    TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                        tui.input_mode = InputMode::Input;
                        tui.message_list.selected_index = None;
                        tui.input_box.handle_event(&event);
                    }
                    TuiEvent::Submit => {
                        tui.input_mode = InputMode::Input;
                        tui.message_list.selected_index = None;
                    }
                    TuiEvent::CursorUp => {
                        if !app.log.is_empty() {
                            let idx = tui
                                .message_list
                                .selected_index
                                .map(|i| i.saturating_sub(1))
                                .unwrap_or(app.log.len() - 1);
                            tui.message_list.selected_index = Some(idx);
                            tui.message_list.scroll_to_selected();
                        }
                    }
                    TuiEvent::CursorDown => {
                        if let Some(idx) = tui.message_list.selected_index
                            && idx + 1 < app.log.len()
                        {
                            tui.message_list.selected_index = Some(idx + 1);
                            tui.message_list.scroll_to_selected();
                        }
                    }
                    _ => {}
                },
            }
        }

        if should_quit {
            break;
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, action, &tx) {
                should_quit = true;
            }
        }
        if should_quit {
            break;
        }
    }

    if let Some(handle) = probe {
        handle.abort();
    }
    ratatui::restore();
    Ok(())
}

/// Run an action through the reducer and carry out its effect.
/// Returns `true` when the app should quit.
fn dispatch(app: &mut App, action: Action, tx: &mpsc::Sender<Action>) -> bool {
    match update(app, action) {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SpawnRequest(request) => {
            spawn_request(app.client.clone(), request, tx.clone());
            false
        }
    }
}

fn apply_pick(app: &mut App, tui: &mut TuiState, pick: Pick, tx: &mpsc::Sender<Action>) -> bool {
    match pick {
        Pick::Option(label) => {
            tui.message_list.stick_to_bottom = true;
            dispatch(app, Action::User(UserEvent::OptionSelected(label)), tx)
        }
        Pick::Marker(view) => {
            tui.overlay.open(view);
            false
        }
    }
}

fn spawn_request(
    client: Arc<dyn ConversationClient>,
    request: ConversationRequest,
    tx: mpsc::Sender<Action>,
) {
    info!(
        "Spawning request via {} (intent={:?})",
        client.name(),
        request.intent
    );
    tokio::spawn(async move {
        let request_start = Instant::now();
        let result = client.send(&request).await;
        debug!(
            "Request finished in {}ms",
            request_start.elapsed().as_millis()
        );
        if tx.send(Action::ResultReceived(result)).is_err() {
            warn!("Failed to deliver result: receiver dropped");
        }
    });
}

fn spawn_health_probe(
    client: Arc<dyn ConversationClient>,
    interval: Duration,
    tx: mpsc::Sender<Action>,
) -> tokio::task::AbortHandle {
    info!("Starting health probe every {:?}", interval);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let online = client.health().await;
            if tx.send(Action::HealthChecked(online)).is_err() {
                debug!("Health probe stopping: receiver dropped");
                return;
            }
        }
    })
    .abort_handle()
}
