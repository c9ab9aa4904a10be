//! Dashboard view

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Wrap},
};

use super::layout::{draw_notice, panel_block};
use crate::app::state::AppState;
use crate::dashboard::{DashboardMetrics, TopicAccuracy};
use crate::quiz::QuestionBank;
use crate::theme::Theme;

/// Widest topic bar in characters
const BAR_WIDTH: usize = 20;

/// Draw the metrics dashboard
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, bank: &QuestionBank, theme: &Theme) {
    let metrics = DashboardMetrics::compute(bank, &state.session);

    let block = panel_block(" Dashboard ", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if metrics.has_no_data() {
        draw_notice(
            frame,
            inner,
            vec![
                Line::from(Span::styled(
                    "No data available",
                    Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Add questions to the question bank to see your metrics.",
                    Style::default().fg(theme.fg_muted),
                )),
            ],
        );
        return;
    }

    let [summary, gauge, details] =
        Layout::vertical([Constraint::Length(4), Constraint::Length(1), Constraint::Min(3)])
            .areas(inner);

    draw_summary(frame, summary, &metrics, theme);

    let ratio = f64::from(metrics.accuracy_percent) / 100.0;
    let accuracy = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent_primary).bg(theme.bg_tertiary))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("Accuracy {}%", metrics.accuracy_percent));
    frame.render_widget(accuracy, gauge);

    let [topics, weak] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(details);
    draw_topics(frame, topics, &metrics, theme);
    draw_weak_topics(frame, weak, &metrics.weak_topics, theme);
}

fn draw_summary(frame: &mut Frame, area: Rect, metrics: &DashboardMetrics, theme: &Theme) {
    let label = Style::default().fg(theme.fg_muted);
    let value = Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(" Questions ", label),
            Span::styled(metrics.total_questions.to_string(), value),
            Span::styled("   Topics ", label),
            Span::styled(metrics.topic_count().to_string(), value),
        ]),
        Line::from(vec![
            Span::styled(" Score ", label),
            Span::styled(format!("{}/{}", metrics.score, metrics.attempts), value),
            Span::styled("   Streak ", label),
            Span::styled(metrics.streak.to_string(), value),
            Span::styled("   Best ", label),
            Span::styled(metrics.best_streak.to_string(), value),
        ]),
    ];

    if metrics.rejected_records > 0 {
        lines.push(Line::from(Span::styled(
            format!(" {} bank records were skipped (see `studyhub bank check`)", metrics.rejected_records),
            Style::default().fg(theme.warning),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_topics(frame: &mut Frame, area: Rect, metrics: &DashboardMetrics, theme: &Theme) {
    let block = panel_block(" Questions by topic ", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let largest = metrics.questions_per_topic.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let lines: Vec<Line> = metrics
        .questions_per_topic
        .iter()
        .map(|(topic, count)| {
            let practised = metrics.topic_accuracy.iter().find(|t| &t.topic == topic);
            let accuracy = practised.map(|t| format!(" {}%", t.percent)).unwrap_or_default();
            Line::from(vec![
                Span::styled(format!("{:<16.16} ", topic), Style::default().fg(theme.fg_primary)),
                Span::styled(bar(*count, largest), Style::default().fg(theme.accent_secondary)),
                Span::styled(format!(" {}", count), Style::default().fg(theme.fg_secondary)),
                Span::styled(accuracy, Style::default().fg(theme.info)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_weak_topics(frame: &mut Frame, area: Rect, weak: &[TopicAccuracy], theme: &Theme) {
    let block = panel_block(" Needs practice ", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if weak.is_empty() {
        let msg = Paragraph::new("No weak topics yet. Keep practising!")
            .style(Style::default().fg(theme.fg_muted))
            .wrap(Wrap { trim: true });
        frame.render_widget(msg, inner);
        return;
    }

    let lines: Vec<Line> = weak
        .iter()
        .map(|t| {
            Line::from(vec![
                Span::styled(format!("{:<16.16} ", t.topic), Style::default().fg(theme.fg_primary)),
                Span::styled(
                    format!("{}% ({}/{})", t.percent, t.correct, t.attempted),
                    Style::default().fg(theme.error),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Proportional bar for a topic count
fn bar(count: usize, largest: usize) -> String {
    if largest == 0 {
        return String::new();
    }
    let filled = (count * BAR_WIDTH).div_ceil(largest);
    "\u{2588}".repeat(filled) // █
}
