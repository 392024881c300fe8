//! # MessageList Component
//!
//! Scrollable view of the conversation log.
//!
//! ## Responsibilities
//!
//! - Display the log, plus the typing placeholder while a request is in flight
//! - Stick to the newest entry unless the user scrolled up
//! - Hit testing for mouse interactions (which entry, which option, which marker)
//! - Layout caching of entry heights
//! - Remember when each map was first drawn, for the marker hint
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the `MessageLog` (props).
//! Log entries are immutable once appended, so a cached height only goes stale
//! when the width changes.

use std::collections::HashMap;
use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::config::MapSettings;
use crate::core::map::hint_visible;
use crate::core::message::{MessageContent, MessageLog};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{MessageView, TYPING_HEIGHT, TypingIndicator};
use crate::tui::event::TuiEvent;

/// A point inside one log entry, relative to its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHit {
    pub index: usize,
    pub col: u16,
    pub row: u16,
}

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Selected entry (hover or keyboard navigation)
    pub selected_index: Option<usize>,
    /// Entry under the mouse pointer
    pub hovered_index: Option<usize>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Screen area of the last render (for hit testing)
    pub area: Rect,
    /// Content below the viewport the user has not scrolled to
    pub has_unseen_content: bool,
    /// First time each map entry was drawn
    map_first_shown: HashMap<usize, Instant>,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            selected_index: None,
            hovered_index: None,
            viewport_height: 0,
            area: Rect::default(),
            has_unseen_content: false,
            map_first_shown: HashMap::new(),
        }
    }

    /// Width entries were laid out at on the last render.
    pub fn content_width(&self) -> u16 {
        self.layout.content_width
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let total = self.layout.total_height();
        let max_y = total.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scroll the viewport so the selected entry is fully visible.
    /// If the entry is taller than the viewport, align its top edge.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        if idx >= self.layout.prefix_heights.len() {
            return;
        }

        let item_top = self.layout.top_of(idx);
        let item_bottom = self.layout.prefix_heights[idx];
        let offset_y = self.scroll_state.offset().y;

        if item_top < offset_y || item_bottom - item_top > self.viewport_height {
            self.scroll_state.set_offset(Position { x: 0, y: item_top });
            self.stick_to_bottom = false;
        } else if item_bottom > offset_y + self.viewport_height {
            let new_y = item_bottom.saturating_sub(self.viewport_height);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            // Re-pin if we've landed at the absolute bottom
            let total = self.layout.total_height();
            self.stick_to_bottom = new_y >= total.saturating_sub(self.viewport_height);
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let total = self.layout.total_height();
        let max_y = total.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Which entry (and where inside it) is at screen cell `(col, row)`.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<EntryHit> {
        let area = self.area;
        // Last column is the scrollbar.
        let content_right = area.x + self.layout.content_width;
        if row < area.y || row >= area.bottom() || col < area.x || col >= content_right {
            return None;
        }
        let content_y = (row - area.y).saturating_add(self.scroll_state.offset().y);
        let index = self
            .layout
            .prefix_heights
            .partition_point(|&end| end <= content_y);
        if index >= self.layout.prefix_heights.len() {
            return None; // Below all entries
        }
        Some(EntryHit {
            index,
            col: col - area.x,
            row: content_y - self.layout.top_of(index),
        })
    }

    /// Whether any drawn map still shows its hint at `now`.
    pub fn hint_pending(&self, now: Instant, settings: &MapSettings) -> bool {
        self.map_first_shown
            .values()
            .any(|&first| hint_visible(first, now, settings.hint_duration))
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub log: &'a MessageLog,
    pub is_processing: bool,
    pub spinner_frame: usize,
    pub settings: &'a MapSettings,
    pub now: Instant,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        log: &'a MessageLog,
        is_processing: bool,
        spinner_frame: usize,
        settings: &'a MapSettings,
        now: Instant,
    ) -> Self {
        Self {
            state,
            log,
            is_processing,
            spinner_frame,
            settings,
            now,
        }
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let entries = self.log.as_slice();

        // 1. Update Layout Cache
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(entries.len(), content_width);
        layout.heights.truncate(reusable);
        for message in entries.iter().skip(layout.heights.len()) {
            layout
                .heights
                .push(MessageView::calculate_height(message, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(entries.len(), content_width);

        let total_height = self.state.layout.total_height();
        let typing_height = if self.is_processing { TYPING_HEIGHT } else { 0 };
        let canvas_height = total_height.saturating_add(typing_height);

        // 2. Clamp scroll offset to prevent overscrolling past content.
        self.state.viewport_height = area.height;
        self.state.area = area;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = if self.state.stick_to_bottom {
            canvas_height.saturating_sub(area.height)
        } else {
            self.state.scroll_state.offset().y
        };
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible entries into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible_range {
            let message = &entries[i];
            let y = self.state.layout.top_of(i);
            let height = self.state.layout.heights[i];

            let show_hint = match &message.content {
                MessageContent::GeoResult { .. } => {
                    let first = *self.state.map_first_shown.entry(i).or_insert(self.now);
                    hint_visible(first, self.now, self.settings.hint_duration)
                }
                _ => false,
            };

            let view = MessageView::new(
                message,
                self.state.hovered_index == Some(i),
                self.state.selected_index == Some(i),
                self.settings,
                show_hint,
            );
            scroll_view.render_widget(view, Rect::new(0, y, content_width, height));
        }

        if self.is_processing {
            scroll_view.render_widget(
                TypingIndicator {
                    spinner_frame: self.spinner_frame,
                },
                Rect::new(0, total_height, content_width, TYPING_HEIGHT),
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);

        let offset = self.state.scroll_state.offset().y;
        let max_scroll = canvas_height.saturating_sub(area.height);
        self.state.has_unseen_content = canvas_height > area.height && offset < max_scroll;
    }
}

/// EventHandler is implemented on `MessageListState` rather than `MessageList`
/// because scroll position must persist across frames.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            message_count: 0,
            content_width: 0,
        }
    }

    /// How many cached heights are still valid. Entries never change after
    /// being appended, so only a width change (or a shorter log) invalidates.
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || message_count < self.message_count {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16) {
        self.message_count = message_count;
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Sum of all cached heights, saturating at `u16::MAX`.
    pub fn total_height(&self) -> u16 {
        self.heights.iter().fold(0, |acc, &h| acc.saturating_add(h))
    }

    /// Canvas row where entry `idx` starts.
    pub fn top_of(&self, idx: usize) -> u16 {
        if idx == 0 {
            0
        } else {
            self.prefix_heights.get(idx - 1).copied().unwrap_or(0)
        }
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
