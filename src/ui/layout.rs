//! Layout utilities and common components

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::state::{AppState, View};
use crate::theme::Theme;

/// Bordered block used by every view
pub fn panel_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg_primary))
}

/// Key hints for a view
pub fn key_hints(view: View) -> &'static str {
    match view {
        View::Dashboard => "[Tab] switch view  [1-3] jump  [q] quit",
        View::Tutor => "[Enter] send  [Esc] cancel  [Up/Down] scroll  [Tab] switch view",
        View::Quiz => {
            "[j/k] move  [Enter] select  [s] submit  [n] next  [e] explain  [t] topic  [q] quit"
        }
    }
}

/// Draw the status line at the bottom of the screen
pub fn draw_status_line(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let line = match &state.status.message {
        Some(msg) => {
            let style = if state.status.is_error {
                Style::default().fg(theme.error)
            } else {
                Style::default().fg(theme.success)
            };
            Line::from(Span::styled(msg.clone(), style))
        }
        None => Line::from(Span::styled(key_hints(state.view), Style::default().fg(theme.fg_muted))),
    };

    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg_secondary)), area);
}

/// Create a centered rectangle with the given percentage of width and height
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// Draw a centered notice (used for empty states)
pub fn draw_notice(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let notice_area = centered_rect(80, 50, area);
    let para = Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(para, notice_area);
}
