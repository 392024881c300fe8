use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::config::MapSettings;
use crate::core::map::badge;
use crate::core::message::{MatchQuality, Message, MessageContent, Role};
use crate::tui::component::Component;
use crate::tui::components::map_view::MapView;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Canvas rows given to a map result.
pub const MAP_ROWS: u16 = 12;
/// Height of the "typing" placeholder bubble.
pub const TYPING_HEIGHT: u16 = 3;

/// A stateless component that renders one log entry.
///
/// `MessageView` is a **transient component**: it's created fresh each frame
/// with the data it needs. Rendering is a pure function of the message and the
/// props, so drawing the same entry twice yields the same cells.
///
/// # Height Calculation
///
/// [`calculate_height`](Self::calculate_height) predicts the rendered height
/// with `textwrap`, using options that match Ratatui's `Paragraph` wrapping, so
/// the parent `MessageList` can lay out the scroll canvas without rendering.
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    pub is_hovered: bool,
    pub is_selected: bool,
    pub settings: &'a MapSettings,
    /// Show the "tap a marker" hint on a map result.
    pub show_hint: bool,
}

impl<'a> MessageView<'a> {
    pub fn new(
        message: &'a Message,
        is_hovered: bool,
        is_selected: bool,
        settings: &'a MapSettings,
        show_hint: bool,
    ) -> Self {
        Self {
            message,
            is_hovered,
            is_selected,
            settings,
            show_hint,
        }
    }

    /// Calculate the height required for `message` given a width.
    pub fn calculate_height(message: &Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Too narrow for borders + padding; still occupy a row.
            return 1;
        }
        let text_rows: u16 = text_lines(&message.content)
            .iter()
            .map(|line| wrapped_rows(&line_text(line), content_width))
            .fold(0, u16::saturating_add);
        let map_rows = match &message.content {
            MessageContent::GeoResult { markers, .. } => {
                markers
                    .iter()
                    .enumerate()
                    .map(|(i, m)| wrapped_rows(&legend_text(i, &m.name), content_width))
                    .fold(MAP_ROWS, u16::saturating_add)
            }
            _ => 0,
        };
        text_rows
            .saturating_add(map_rows)
            .saturating_add(VERTICAL_OVERHEAD)
    }

    /// Which quick option sits on `rel_row` (relative to the message's top edge).
    pub fn option_at(message: &Message, width: u16, rel_row: u16) -> Option<usize> {
        let MessageContent::QuickOptions { prompt, options } = &message.content else {
            return None;
        };
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 || rel_row == 0 {
            return None;
        }
        let mut row = wrapped_rows(prompt, content_width).saturating_add(1);
        for (i, label) in options.iter().enumerate() {
            let rows = wrapped_rows(&option_text(i, label), content_width);
            if rel_row >= row && rel_row < row.saturating_add(rows) {
                return Some(i);
            }
            row = row.saturating_add(rows);
        }
        None
    }

    /// The canvas rectangle of a map result, relative to the message's top-left corner.
    pub fn map_rect(message: &Message, width: u16) -> Option<Rect> {
        let MessageContent::GeoResult { caption, .. } = &message.content else {
            return None;
        };
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return None;
        }
        let caption_rows = wrapped_rows(caption, content_width);
        Some(Rect::new(
            1 + CONTENT_PAD_H,
            caption_rows.saturating_add(1),
            content_width,
            MAP_ROWS,
        ))
    }

    /// Which marker's badge sits at `(rel_col, rel_row)` relative to the message's top-left corner.
    pub fn marker_at(
        message: &Message,
        width: u16,
        settings: &MapSettings,
        rel_col: u16,
        rel_row: u16,
    ) -> Option<usize> {
        let MessageContent::GeoResult {
            markers, center, ..
        } = &message.content
        else {
            return None;
        };
        let rect = Self::map_rect(message, width)?;
        if rel_col < rect.x || rel_row < rect.y || rel_col >= rect.right() || rel_row >= rect.bottom()
        {
            return None;
        }
        MapView::new(markers, *center, settings, false).marker_at(
            rect.width,
            rect.height,
            rel_col - rect.x,
            rel_row - rect.y,
        )
    }
}

/// Text rows of a message, in order, before wrapping.
/// A map result contributes its caption here; the canvas and legend follow it.
pub fn text_lines(content: &MessageContent) -> Vec<Line<'static>> {
    match content {
        MessageContent::Text { body } => verbatim(body, Style::default()),
        MessageContent::AnsweredText {
            body,
            latency_seconds,
            match_quality,
            matched_name,
        } => {
            let mut lines = Vec::new();
            if let Some(quality) = match_quality {
                lines.push(match_badge(*quality, matched_name.as_deref()));
            }
            lines.extend(verbatim(body, Style::default()));
            if let Some(latency) = latency_seconds {
                lines.push(Line::from(Span::styled(
                    format!("⏱ {}s", latency),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines
        }
        MessageContent::GeoResult { caption, .. } => verbatim(caption, Style::default()),
        MessageContent::QuickOptions { prompt, options } => {
            let mut lines = verbatim(prompt, Style::default());
            lines.extend(options.iter().enumerate().map(|(i, label)| {
                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", i + 1),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(label.clone(), Style::default().fg(Color::Cyan)),
                ])
            }));
            lines
        }
    }
}

fn match_badge(quality: MatchQuality, matched_name: Option<&str>) -> Line<'static> {
    match quality {
        MatchQuality::Exact => {
            let text = match matched_name {
                Some(name) => format!("✔ Resultado exato: {}", name),
                None => "✔ Resultado exato".to_string(),
            };
            Line::from(Span::styled(
                text,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ))
        }
        MatchQuality::Fuzzy => Line::from(Span::styled(
            "≈ Resultado semelhante",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    }
}

/// One line per source line break; the body is not reflowed or trimmed.
fn verbatim(text: &str, style: Style) -> Vec<Line<'static>> {
    text.split('\n')
        .map(|l| Line::from(Span::styled(l.trim_end_matches('\r').to_string(), style)))
        .collect()
}

fn option_text(index: usize, label: &str) -> String {
    format!("[{}] {}", index + 1, label)
}

fn legend_text(index: usize, name: &str) -> String {
    format!("{} {}", badge(index), name)
}

fn line_text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

fn wrapped_rows(text: &str, width: u16) -> u16 {
    if text.is_empty() {
        return 1;
    }
    let options = textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    u16::try_from(textwrap::wrap(text, options).len())
        .unwrap_or(u16::MAX)
        .max(1)
}

fn role_style(role: Role) -> (&'static str, Style) {
    match role {
        Role::User => ("você", Style::default().fg(Color::Green)),
        Role::Bot => ("farmabot", Style::default().fg(Color::Blue)),
    }
}

impl Widget for MessageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, style) = role_style(self.message.role);

        // Selection overrides hover: cyan border for selected, bright for hover, dim otherwise
        let border_style = if self.is_selected {
            Style::default().fg(Color::Cyan)
        } else if self.is_hovered {
            style
        } else {
            style.add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = text_lines(&self.message.content);
        let paragraph = |lines: Vec<Line<'static>>| {
            Paragraph::new(lines).style(style).wrap(Wrap { trim: false })
        };

        match &self.message.content {
            MessageContent::GeoResult {
                caption,
                markers,
                center,
            } => {
                let caption_rows = wrapped_rows(caption, inner.width.max(1));
                let [caption_area, map_area, legend_area] = Layout::vertical([
                    Constraint::Length(caption_rows),
                    Constraint::Length(MAP_ROWS),
                    Constraint::Min(0),
                ])
                .areas(inner);

                paragraph(lines).render(caption_area, buf);
                MapView::new(markers, *center, self.settings, self.show_hint)
                    .render(map_area, buf);

                let legend: Vec<Line<'static>> = markers
                    .iter()
                    .enumerate()
                    .map(|(i, m)| {
                        Line::from(vec![
                            Span::styled(
                                badge(i),
                                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                            ),
                            Span::raw(format!(" {}", m.name)),
                        ])
                    })
                    .collect();
                paragraph(legend).render(legend_area, buf);
            }
            _ => paragraph(lines).render(inner, buf),
        }
    }
}

impl Component for MessageView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

/// Placeholder bubble shown while a request is in flight. Never a log entry.
#[derive(Clone, Copy)]
pub struct TypingIndicator {
    pub spinner_frame: usize,
}

impl Widget for TypingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, style) = role_style(Role::Bot);
        let dots = ".".repeat(self.spinner_frame % 3 + 1);
        Paragraph::new(format!("Digitando{}", dots))
            .style(style.add_modifier(Modifier::ITALIC))
            .block(
                Block::bordered()
                    .title(title)
                    .border_type(BorderType::Rounded)
                    .border_style(style.add_modifier(Modifier::DIM))
                    .padding(Padding::horizontal(CONTENT_PAD_H)),
            )
            .render(area, buf);
    }
}
