//! Quiz practice view

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::layout::draw_notice;
use crate::app::state::AppState;
use crate::quiz::{AnswerOutcome, QuestionBank, QuestionRecord, QuizPhase, QuizSession};
use crate::theme::Theme;

/// Draw the quiz view
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, bank: &QuestionBank, theme: &Theme) {
    let session = &state.session;

    let block = Block::default()
        .title(format!(" Quiz Practice \u{00B7} {} ", state.quiz.topic_label())) // ·
        .title_bottom(Line::from(score_line(session)).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_primary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if bank.is_empty() {
        draw_empty_bank(frame, inner, theme);
        return;
    }

    match (&session.active_question, session.phase()) {
        (Some(question), phase) if phase != QuizPhase::NoQuestion => {
            draw_question(frame, inner, state, question, theme);
        }
        _ => draw_notice(
            frame,
            inner,
            vec![
                Line::from(Span::styled(
                    format!("{} questions ready", ready_count(bank, state.quiz.topic.as_deref())),
                    Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press [n] to draw a question, [t] to pick a topic",
                    Style::default().fg(theme.fg_muted),
                )),
            ],
        ),
    }
}

/// Questions available under the topic filter
fn ready_count(bank: &QuestionBank, topic: Option<&str>) -> usize {
    match topic {
        None => bank.len(),
        Some(topic) => bank
            .count_by_topic()
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(topic.trim()))
            .map_or(0, |(_, count)| count),
    }
}

/// Running score shown on the panel border
fn score_line(session: &QuizSession) -> String {
    format!(
        " Score {}/{}  Accuracy {}%  Streak {} ",
        session.score,
        session.attempts,
        session.accuracy_percent(),
        session.streak
    )
}

/// Draw the distinct no-data state
fn draw_empty_bank(frame: &mut Frame, area: Rect, theme: &Theme) {
    draw_notice(
        frame,
        area,
        vec![
            Line::from(Span::styled(
                "No questions available",
                Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "The question bank is empty or could not be read.",
                Style::default().fg(theme.fg_secondary),
            )),
            Line::from(Span::styled(
                "Run `studyhub bank check` for details.",
                Style::default().fg(theme.fg_muted),
            )),
        ],
    );
}

/// Draw the current question, its options and the outcome once revealed
fn draw_question(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    question: &QuestionRecord,
    theme: &Theme,
) {
    let session = &state.session;
    let mut lines = vec![
        Line::from(Span::styled(question.topic.clone(), Style::default().fg(theme.info))),
        Line::from(""),
        Line::from(Span::styled(
            question.prompt.clone(),
            Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (i, option) in question.options.iter().enumerate() {
        let highlighted = i == state.quiz.cursor && !session.revealed;
        let selected = session.selected_option.as_deref() == Some(option.as_str());

        let cursor = if highlighted { "\u{25B8}" } else { " " }; // ▸
        let marker = if selected { "\u{25CF}" } else { "\u{25CB}" }; // ● or ○

        let style = option_style(session.revealed, question.is_correct(option), selected, theme);
        let style = if highlighted { style.bg(theme.selection) } else { style };

        lines.push(Line::from(Span::styled(format!(" {} {} {}", cursor, marker, option), style)));
    }

    if let Some(outcome) = &session.last_outcome {
        lines.push(Line::from(""));
        lines.extend(outcome_lines(outcome, theme));
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: false }).alignment(Alignment::Left);
    frame.render_widget(para, area);
}

fn option_style(revealed: bool, correct: bool, selected: bool, theme: &Theme) -> Style {
    match (revealed, correct, selected) {
        (true, true, _) => Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
        (true, false, true) => Style::default().fg(theme.error),
        (false, _, true) => Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(theme.fg_secondary),
    }
}

fn outcome_lines(outcome: &AnswerOutcome, theme: &Theme) -> Vec<Line<'static>> {
    let verdict = if outcome.is_correct {
        Span::styled("Correct!", Style::default().fg(theme.success).add_modifier(Modifier::BOLD))
    } else {
        Span::styled(
            format!("Incorrect. The answer is {}.", outcome.correct_label),
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        )
    };

    let mut lines = vec![Line::from(verdict)];
    if !outcome.explanation.trim().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            outcome.explanation.clone(),
            Style::default().fg(theme.fg_secondary),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[n] next question    [e] explain with the tutor",
        Style::default().fg(theme.fg_muted),
    )));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_line_shows_running_totals() {
        let session = QuizSession { score: 3, attempts: 4, streak: 2, ..QuizSession::default() };
        assert_eq!(score_line(&session), " Score 3/4  Accuracy 75%  Streak 2 ");
    }

    #[test]
    fn ready_count_follows_topic_filter() {
        let bank = QuestionBank::from_json_str(
            r#"[
                {"topic": "Markets", "question": "Q1", "options": ["A) x"], "answer": "A"},
                {"topic": "Money", "question": "Q2", "options": ["A) x"], "answer": "A"},
                {"topic": "Markets", "question": "Q3", "options": ["A) x"], "answer": "A"}
            ]"#,
        );
        assert_eq!(ready_count(&bank, None), 3);
        assert_eq!(ready_count(&bank, Some("Markets")), 2);
        assert_eq!(ready_count(&bank, Some("Trade")), 0);
    }

    #[test]
    fn revealed_correct_option_is_highlighted() {
        let theme = Theme::default();
        assert_eq!(option_style(true, true, false, &theme).fg, Some(theme.success));
        assert_eq!(option_style(true, false, true, &theme).fg, Some(theme.error));
        assert_eq!(option_style(false, true, false, &theme).fg, Some(theme.fg_secondary));
    }

    #[test]
    fn wrong_outcome_names_correct_label() {
        let outcome = AnswerOutcome {
            is_correct: false,
            correct_label: "B".into(),
            explanation: "Because.".into(),
        };
        let lines = outcome_lines(&outcome, &Theme::default());
        assert!(lines[0].spans[0].content.contains("The answer is B"));
        assert!(lines.iter().any(|l| l.spans.iter().any(|s| s.content == "Because.")));
    }
}
