//! UI rendering components

pub mod dashboard;
pub mod layout;
pub mod quiz_panel;
pub mod sidebar;
pub mod tutor_panel;

use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::Style,
    widgets::Block,
};

use crate::app::state::{AppState, View};
use crate::quiz::QuestionBank;
use crate::theme::Theme;

/// Width of the navigation sidebar
const SIDEBAR_WIDTH: u16 = 22;

/// Main draw function
pub fn draw(frame: &mut Frame, state: &mut AppState, bank: &QuestionBank, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.bg_primary)), area);

    let [body, status] = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
    let [side, main] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(30)]).areas(body);

    sidebar::draw(frame, side, state, theme);

    match state.view {
        View::Dashboard => dashboard::draw(frame, main, state, bank, theme),
        View::Tutor => tutor_panel::draw(frame, main, state, theme),
        View::Quiz => quiz_panel::draw(frame, main, state, bank, theme),
    }

    layout::draw_status_line(frame, status, state, theme);
}
