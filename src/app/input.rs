//! Event handling utilities

use crossterm::event::{KeyCode, KeyModifiers};

use super::state::View;

/// Actions that can be taken in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    ShowView(View),

    // Quiz
    Up,
    Down,
    Select,
    Submit,
    NextQuestion,
    Explain,
    CycleTopic,

    // Tutor
    Send,
    Cancel,
    ScrollUp,
    ScrollDown,
    InsertChar(char),
    DeleteChar,
    DeleteForward,
    CursorLeft,
    CursorRight,
    CursorStart,
    CursorEnd,
}

/// Map a key press to an action for the given view
///
/// The tutor view captures printable keys for its prompt, so only Tab,
/// BackTab and Ctrl+C work everywhere.
pub fn key_to_action(view: View, key: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match key {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    match key {
        KeyCode::Tab => return Some(Action::NextView),
        KeyCode::BackTab => return Some(Action::PrevView),
        _ => {}
    }

    match view {
        View::Tutor => tutor_key_to_action(key),
        View::Dashboard => navigation_key_to_action(key),
        View::Quiz => quiz_key_to_action(key).or_else(|| navigation_key_to_action(key)),
    }
}

fn navigation_key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('1') => Some(Action::ShowView(View::Dashboard)),
        KeyCode::Char('2') => Some(Action::ShowView(View::Tutor)),
        KeyCode::Char('3') => Some(Action::ShowView(View::Quiz)),
        _ => None,
    }
}

fn quiz_key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Char('s') => Some(Action::Submit),
        KeyCode::Char('n') => Some(Action::NextQuestion),
        KeyCode::Char('e') => Some(Action::Explain),
        KeyCode::Char('t') => Some(Action::CycleTopic),
        _ => None,
    }
}

fn tutor_key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Enter => Some(Action::Send),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Up | KeyCode::PageUp => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::PageDown => Some(Action::ScrollDown),
        KeyCode::Backspace => Some(Action::DeleteChar),
        KeyCode::Delete => Some(Action::DeleteForward),
        KeyCode::Left => Some(Action::CursorLeft),
        KeyCode::Right => Some(Action::CursorRight),
        KeyCode::Home => Some(Action::CursorStart),
        KeyCode::End => Some(Action::CursorEnd),
        KeyCode::Char(c) => Some(Action::InsertChar(c)),
        _ => None,
    }
}
