//! Input handling for the console.
//!
//! Key mapping is mode-aware: while a text slot has focus, printable keys
//! feed the field instead of triggering shortcuts.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use super::app::{Action, View};

/// Convert a key event to an action, given the mounted view.
pub fn handle_key_event(key: KeyEvent, view: &View) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    match view {
        View::Dashboard => match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('n') => Some(Action::OpenCreateJob),
            _ => None,
        },
        View::CreateJob { focus } => match key.code {
            KeyCode::Esc => Some(Action::OpenDashboard),
            KeyCode::Tab | KeyCode::Down => Some(Action::FocusNext),
            KeyCode::BackTab | KeyCode::Up => Some(Action::FocusPrev),
            KeyCode::Enter => Some(Action::Activate),
            KeyCode::F(5) => Some(Action::ReloadCatalog),
            KeyCode::Left if focus.is_choice() => Some(Action::PrevChoice),
            KeyCode::Right if focus.is_choice() => Some(Action::NextChoice),
            KeyCode::Backspace if focus.is_text() => Some(Action::Backspace),
            KeyCode::Char(c) if focus.is_text() => Some(Action::TypeChar(c)),
            _ => None,
        },
    }
}

/// Convert a crossterm event to an action.
pub fn handle_event(event: Event, view: &View) -> Option<Action> {
    match event {
        Event::Key(key) => handle_key_event(key, view),
        _ => None,
    }
}
