//! # Detail Overlay Component
//!
//! The single reusable sheet that shows one map marker's details. Selecting
//! another marker replaces the content; there is never more than one.
//!
//! Closed with Esc or `x`, or by grabbing the handle on its top edge and
//! dragging down at least `DRAG_CLOSE_ROWS` rows.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `DetailOverlayState` lives in `TuiState`
//! - `DetailOverlay` is created each frame with borrowed state

use log::debug;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::core::map::{DetailView, badge};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Rows the handle must be dragged down before the overlay closes.
pub const DRAG_CLOSE_ROWS: u16 = 3;
const HANDLE: &str = "━━━━━━";

#[derive(Default)]
pub struct DetailOverlayState {
    view: Option<DetailView>,
    /// Row where a handle drag started.
    drag_origin: Option<u16>,
    /// Where the overlay was last drawn (for handle hit-testing).
    area: Rect,
}

impl DetailOverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `view`, replacing whatever was shown before.
    pub fn open(&mut self, view: DetailView) {
        debug!("Opening detail for marker {}", view.badge);
        self.view = Some(view);
        self.drag_origin = None;
    }

    pub fn close(&mut self) {
        self.view = None;
        self.drag_origin = None;
    }

    pub fn is_open(&self) -> bool {
        self.view.is_some()
    }

    pub fn view(&self) -> Option<&DetailView> {
        self.view.as_ref()
    }

    fn on_handle(&self, col: u16, row: u16) -> bool {
        row == self.area.y && col >= self.area.x && col < self.area.right()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    Closed,
}

impl EventHandler for DetailOverlayState {
    type Event = OverlayEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if !self.is_open() {
            return None;
        }
        match *event {
            TuiEvent::Escape | TuiEvent::InputChar('x') => {
                self.close();
                Some(OverlayEvent::Closed)
            }
            TuiEvent::MouseDown(col, row) => {
                self.drag_origin = self.on_handle(col, row).then_some(row);
                None
            }
            TuiEvent::MouseDrag(_, row) => match self.drag_origin {
                Some(origin) if row >= origin.saturating_add(DRAG_CLOSE_ROWS) => {
                    self.close();
                    Some(OverlayEvent::Closed)
                }
                _ => None,
            },
            TuiEvent::MouseUp(..) => {
                self.drag_origin = None;
                None
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the detail overlay.
pub struct DetailOverlay<'a> {
    state: &'a mut DetailOverlayState,
}

impl<'a> DetailOverlay<'a> {
    pub fn new(state: &'a mut DetailOverlayState) -> Self {
        Self { state }
    }
}

impl Component for DetailOverlay<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if !self.state.is_open() {
            return;
        }
        let overlay = bottom_sheet(area);
        self.state.area = overlay;
        let Some(view) = &self.state.view else {
            return;
        };

        frame.render_widget(Clear, overlay);

        let badge_style = Style::default()
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD);
        let dim = Style::default().fg(Color::DarkGray);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Line::from(Span::styled(format!(" {} ", badge(view.badge.saturating_sub(1))), badge_style)).left_aligned())
            .title(Line::from(Span::styled(HANDLE, Style::default().fg(Color::Cyan))).centered())
            .title_bottom(Line::from(" Esc/x fechar · arraste ↓ para fechar ").centered())
            .padding(Padding::horizontal(1));

        let mut lines = vec![
            Line::from(Span::styled(
                view.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::default(),
        ];
        lines.push(match &view.address {
            Some(address) => Line::from(vec![Span::styled("Endereço: ", dim), Span::raw(address.clone())]),
            None => Line::from(Span::styled("Endereço não informado", dim)),
        });
        if let Some(url) = &view.image_url {
            lines.push(Line::from(vec![Span::styled("Imagem: ", dim), Span::raw(url.clone())]));
        }

        let details = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(details, overlay);
    }
}

/// A sheet anchored to the bottom of `outer`: 80% wide, 40% tall (at least 8 rows).
fn bottom_sheet(outer: Rect) -> Rect {
    let height = (outer.height * 2 / 5).max(8).min(outer.height);
    let [_, sheet] = Layout::vertical([Constraint::Min(0), Constraint::Length(height)]).areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage(10),
        Constraint::Percentage(80),
        Constraint::Percentage(10),
    ])
    .areas(sheet);
    center
}
