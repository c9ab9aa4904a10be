//! AI tutor view: streamed answer above, prompt input below

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use textwrap::{Options, wrap};

use crate::app::state::{AppState, PromptInput};
use crate::theme::Theme;

/// Draw the tutor view
pub fn draw(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let [answer_area, input_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

    draw_answer(frame, answer_area, state, theme);
    draw_input(frame, input_area, state, theme);
}

fn draw_answer(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let tutor = &mut state.tutor;
    let title = if tutor.streaming { " AI Tutor (streaming...) " } else { " AI Tutor " };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_primary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(prompt) = &tutor.last_prompt else {
        let hint = Paragraph::new(vec![
            Line::from(Span::styled(
                "Ask anything about economics.",
                Style::default().fg(theme.fg_secondary),
            )),
            Line::from(Span::styled(
                "Press [e] on a quiz question to have it explained.",
                Style::default().fg(theme.fg_muted),
            )),
        ]);
        frame.render_widget(hint, inner);
        return;
    };

    let width = inner.width.saturating_sub(1) as usize;
    let mut lines: Vec<Line> = wrap_text(prompt, width)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(theme.fg_muted))))
        .collect();
    lines.push(Line::from(""));

    if tutor.response.is_empty() {
        let waiting = if tutor.streaming { "Thinking..." } else { "No response yet..." };
        lines.push(Line::from(Span::styled(waiting, Style::default().fg(theme.fg_muted))));
    } else {
        for paragraph in tutor.response.lines() {
            if paragraph.trim().is_empty() {
                lines.push(Line::from(""));
                continue;
            }
            lines.extend(wrap_text(paragraph, width).into_iter().map(|l| style_line(l, theme)));
        }
    }

    // Clamp scroll position
    let max_scroll = lines.len().saturating_sub(inner.height as usize);
    let scroll = (tutor.scroll as usize).min(max_scroll);
    tutor.scroll = scroll as u16;

    let para = Paragraph::new(lines)
        .style(Style::default().fg(theme.fg_primary))
        .scroll((tutor.scroll, 0));
    frame.render_widget(para, inner);
}

fn draw_input(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let title = if state.tutor_available { " Ask " } else { " Ask (tutor not configured) " };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent_primary))
        .style(Style::default().bg(theme.bg_secondary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let base_style = Style::default().fg(theme.fg_primary);
    let line = build_line_with_cursor(&state.tutor.input, base_style, theme);
    frame.render_widget(Paragraph::new(line), inner);
}

/// Wrap a paragraph to the panel width
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width < 2 {
        return vec![text.to_string()];
    }
    wrap(text, Options::new(width)).into_iter().map(|s| s.to_string()).collect()
}

/// Apply styling to a line (headings, list items, inline code)
fn style_line(text: String, theme: &Theme) -> Line<'static> {
    if text.starts_with('#') {
        Line::from(Span::styled(
            text,
            Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
        ))
    } else if text.contains('`') {
        let code = Style::default().fg(theme.accent_secondary).bg(theme.bg_tertiary);
        let plain = Style::default().fg(theme.fg_primary);
        let spans: Vec<Span> = text
            .split('`')
            .enumerate()
            .filter(|(_, part)| !part.is_empty())
            .map(|(i, part)| Span::styled(part.to_string(), if i % 2 == 1 { code } else { plain }))
            .collect();
        Line::from(spans)
    } else {
        Line::from(text)
    }
}

/// Build the prompt line with a visible cursor
fn build_line_with_cursor(input: &PromptInput, base_style: Style, theme: &Theme) -> Line<'static> {
    let chars: Vec<char> = input.text.chars().collect();
    let cursor_pos = input.cursor.min(chars.len());
    let mut spans = Vec::new();

    if cursor_pos > 0 {
        let before: String = chars[..cursor_pos].iter().collect();
        spans.push(Span::styled(before, base_style));
    }

    // Cursor character (or space if at end)
    let cursor_char = chars.get(cursor_pos).copied().unwrap_or(' ');
    let cursor_style =
        Style::default().fg(theme.bg_primary).bg(theme.fg_primary).add_modifier(Modifier::BOLD);
    spans.push(Span::styled(cursor_char.to_string(), cursor_style));

    if cursor_pos + 1 < chars.len() {
        let after: String = chars[cursor_pos + 1..].iter().collect();
        spans.push(Span::styled(after, base_style));
    }

    Line::from(spans)
}
