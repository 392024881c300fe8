//! # TitleBar Component
//!
//! Top status bar: which backend we talk to, the last status message, the
//! liveness indicator, and a "↓ New" marker when content sits below the scroll
//! position.
//!
//! Stateless: it receives everything as props and renders a single line.
//!
//! ```text
//! farmabot (http://localhost:8000) | Pronto | ● online | ↓ New
//! ```
//!
//! The liveness segment is omitted until the first probe reports, and when
//! probing is disabled.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    pub backend_label: String,
    pub status_message: String,
    pub backend_online: Option<bool>,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(
        backend_label: String,
        status_message: String,
        backend_online: Option<bool>,
        has_unseen_content: bool,
    ) -> Self {
        Self {
            backend_label,
            status_message,
            backend_online,
            has_unseen_content,
        }
    }

    fn spans(&self) -> Vec<Span<'static>> {
        let sep = || Span::raw(" | ");
        let mut spans = vec![Span::raw(format!("farmabot ({})", self.backend_label))];

        if !self.status_message.is_empty() {
            spans.push(sep());
            spans.push(Span::raw(self.status_message.clone()));
        }

        match self.backend_online {
            Some(true) => {
                spans.push(sep());
                spans.push(Span::styled("● online", Style::default().fg(Color::Green)));
            }
            Some(false) => {
                spans.push(sep());
                spans.push(Span::styled("● offline", Style::default().fg(Color::Red)));
            }
            None => {}
        }

        if self.has_unseen_content {
            spans.push(sep());
            spans.push(Span::styled("↓ New", Style::default().fg(Color::Yellow)));
        }
        spans
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Line::from(self.spans()), area);
    }
}
