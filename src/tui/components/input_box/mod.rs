//! # InputBox Component
//!
//! Single-line text entry for values ("dipirona", "F32") and the "voltar" keyword.
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. `waiting` (a request is in flight)
//! and `dimmed` (Cursor mode) are props from the parent.
//!
//! Long input scrolls horizontally so the cursor is always visible. Cursor
//! math is in display columns (`unicode-width`), not bytes.

mod cursor;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::{CursorState, next_char_boundary, prev_char_boundary};

/// Total vertical space: one text row plus top and bottom borders.
pub const HEIGHT: u16 = 3;
const PLACEHOLDER: &str = "Digite sua mensagem (\"voltar\" para o início)";

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed)
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// A request is in flight (Prop)
    pub waiting: bool,
    /// Cursor mode is active (Prop)
    pub dimmed: bool,
    cursor: CursorState,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            waiting: false,
            dimmed: false,
            cursor: CursorState::new(),
        }
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.waiting {
            "Mensagem (aguardando resposta...)"
        } else {
            "Mensagem"
        };
        let mut style = Style::default().fg(Color::Green);
        if self.dimmed || self.waiting {
            style = style.add_modifier(Modifier::DIM);
        }
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(style)
            .title(title);
        let inner = block.inner(area);

        let (range, cursor_col) = self.cursor.window(&self.buffer, inner.width);
        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(PLACEHOLDER).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Paragraph::new(self.buffer[range].to_string()).style(style)
        };
        frame.render_widget(paragraph.block(block), area);

        if !self.dimmed && inner.width > 0 && inner.height > 0 {
            frame.set_cursor_position((inner.x + cursor_col, inner.y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor.pos, *c);
                self.cursor.pos += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Single-line field: line breaks become spaces.
                let flat: String = text
                    .chars()
                    .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                    .collect();
                self.buffer.insert_str(self.cursor.pos, &flat);
                self.cursor.pos += flat.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor.pos > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(prev..self.cursor.pos);
                self.cursor.pos = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor.pos < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor.pos);
                self.buffer.drain(self.cursor.pos..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => self
                .cursor
                .move_left(&self.buffer)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorRight => self
                .cursor
                .move_right(&self.buffer)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorHome => self
                .cursor
                .move_home()
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorEnd => self
                .cursor
                .move_end(&self.buffer)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor.reset();
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
