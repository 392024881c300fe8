use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::input_box;
use crate::tui::components::{DetailOverlay, MessageList, TitleBar};

/// Split the frame into title bar, message list and input box.
pub fn layout_areas(area: Rect) -> [Rect; 3] {
    use Constraint::{Length, Min};
    Layout::vertical([Length(1), Min(0), Length(input_box::HEIGHT)]).areas(area)
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize, now: Instant) {
    let [title_area, main_area, input_area] = layout_areas(frame.area());

    MessageList::new(
        &mut tui.message_list,
        &app.log,
        app.session.is_processing(),
        spinner_frame,
        &tui.map_settings,
        now,
    )
    .render(frame, main_area);

    // Title bar after the list so the unseen-content flag is current
    TitleBar::new(
        app.backend_label.clone(),
        app.status_message.clone(),
        app.backend_online,
        tui.message_list.has_unseen_content,
    )
    .render(frame, title_area);

    tui.input_box.render(frame, input_area);

    DetailOverlay::new(&mut tui.overlay).render(frame, frame.area());
}
