//! # MapView Component
//!
//! Draws a geographic result on a braille canvas: a world outline for
//! orientation and one numbered badge per marker. Viewport math lives in
//! `core::map`; this file only paints and answers "which badge is under this cell".

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Map, MapResolution};
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::core::config::MapSettings;
use crate::core::map::{CanvasBounds, badge, plan_viewport};
use crate::core::message::Marker;

pub const HINT: &str = "Toque em um marcador";

#[derive(Clone, Copy)]
pub struct MapView<'a> {
    pub markers: &'a [Marker],
    pub center: Option<(f64, f64)>,
    pub settings: &'a MapSettings,
    pub show_hint: bool,
}

impl<'a> MapView<'a> {
    pub fn new(
        markers: &'a [Marker],
        center: Option<(f64, f64)>,
        settings: &'a MapSettings,
        show_hint: bool,
    ) -> Self {
        Self {
            markers,
            center,
            settings,
            show_hint,
        }
    }

    fn bounds(&self, cols: u16, rows: u16) -> CanvasBounds {
        plan_viewport(self.markers, self.center, self.settings).canvas_bounds(cols, rows)
    }

    /// Index of the marker whose badge covers cell `(col, row)` of a canvas of
    /// `cols` x `rows`. Later badges are drawn on top, so they win.
    pub fn marker_at(&self, cols: u16, rows: u16, col: u16, row: u16) -> Option<usize> {
        let bounds = self.bounds(cols, rows);
        self.markers
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, m)| {
                let (c, r) = bounds.cell_of(m.lat, m.lng, cols, rows)?;
                let w = badge(i).width() as u16;
                (r == row && col >= c && col < c.saturating_add(w)).then_some(i)
            })
    }
}

impl Widget for MapView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let bounds = self.bounds(area.width, area.height);
        let badge_style = Style::default()
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD);

        Canvas::default()
            .marker(symbols::Marker::Braille)
            .x_bounds(bounds.x)
            .y_bounds(bounds.y)
            .paint(|ctx| {
                ctx.draw(&Map {
                    resolution: MapResolution::High,
                    color: Color::DarkGray,
                });
                ctx.layer();
                for (i, m) in self.markers.iter().enumerate() {
                    ctx.print(m.lng, m.lat, Line::from(Span::styled(badge(i), badge_style)));
                }
            })
            .render(area, buf);

        if self.show_hint && !self.markers.is_empty() {
            let hint_area = Rect::new(area.x, area.bottom() - 1, area.width, 1);
            Paragraph::new(HINT)
                .style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::ITALIC),
                )
                .render(hint_area, buf);
        }
    }
}
