use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// User actions from keyboard events
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    /// Esc: dismiss, cancel or clear, depending on what is open
    Back,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    /// Enter: expand/collapse in the list, save in the key prompt
    Confirm,
    NextDate,
    PrevDate,
    ToggleDayOfSelection,
    Summarize,
    EditApiKey,
    Reload,
    UpdateSearch(char),
    DeleteChar,
    None,
}

/// Poll for keyboard events and convert to actions
pub fn poll_event(timeout: Duration) -> anyhow::Result<Action> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind != KeyEventKind::Release
    {
        return Ok(key_to_action(key));
    }
    Ok(Action::None)
}

fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Back,

        // Navigation (Vim/Emacs style)
        (KeyCode::Char('p'), KeyModifiers::CONTROL) => Action::MoveUp,
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => Action::MoveDown,
        (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Down, _) => Action::MoveDown,
        (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,

        // Date filter
        (KeyCode::Tab, _) => Action::NextDate,
        (KeyCode::BackTab, _) => Action::PrevDate,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::ToggleDayOfSelection,

        // Actions
        (KeyCode::Enter, _) => Action::Confirm,
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => Action::Summarize,
        (KeyCode::Char('k'), KeyModifiers::CONTROL) => Action::EditApiKey,
        (KeyCode::Char('r'), KeyModifiers::CONTROL) => Action::Reload,

        // Text input
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::UpdateSearch(c)
        }
        (KeyCode::Backspace, _) => Action::DeleteChar,

        _ => Action::None,
    }
}
