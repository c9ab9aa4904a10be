//! Navigation sidebar

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::state::{AppState, View};
use crate::theme::Theme;

/// Draw the view list and a compact score summary
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let block = Block::default()
        .title(" StudyHub ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg_secondary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::from("")];
    for (i, view) in View::ALL.iter().enumerate() {
        let active = *view == state.view;
        let marker = if active { "\u{25B8}" } else { " " }; // ▸
        let style = if active {
            Style::default().fg(theme.accent_primary).bg(theme.selection).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg_secondary)
        };
        lines.push(Line::from(Span::styled(format!("{} {} {}", marker, i + 1, view.title()), style)));
    }

    let session = &state.session;
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" Score {}/{}", session.score, session.attempts),
        Style::default().fg(theme.fg_muted),
    )));
    if session.streak > 1 {
        lines.push(Line::from(Span::styled(
            format!(" Streak {}", session.streak),
            Style::default().fg(theme.warning),
        )));
    }
    if !state.tutor_available {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Tutor offline", Style::default().fg(theme.fg_muted))));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
