//! Event handling utilities

use crossterm::event::{KeyCode, KeyModifiers};

/// Vim-style key mapping for the player screen (basic, without modifiers)
pub fn vim_key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        KeyCode::Char(c @ '1'..='9') => Some(Action::Choose(c as usize - '1' as usize)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Select),
        KeyCode::Char('r') => Some(Action::Restart),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Key mapping with modifiers (for Ctrl combinations)
pub fn key_with_modifier_to_action(key: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        match key {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        }
    } else {
        vim_key_to_action(key)
    }
}

/// Actions on the player screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Option navigation
    Up,
    Down,
    /// Pick an option directly by zero-based index
    Choose(usize),

    /// Submit the highlighted option, or continue after feedback
    Select,

    Restart,
    Quit,
}

/// Map a key on the setup form. Plain characters are text input.
pub fn form_key_to_action(key: KeyCode, modifiers: KeyModifiers) -> Option<FormAction> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match key {
            KeyCode::Char('c') => Some(FormAction::Quit),
            KeyCode::Char('v') => Some(FormAction::Paste),
            KeyCode::Char('u') => Some(FormAction::Clear),
            KeyCode::Char('a') => Some(FormAction::Home),
            KeyCode::Char('e') => Some(FormAction::End),
            _ => None,
        };
    }

    match key {
        KeyCode::Tab | KeyCode::Down => Some(FormAction::NextField),
        KeyCode::BackTab | KeyCode::Up => Some(FormAction::PrevField),
        KeyCode::Enter => Some(FormAction::Submit),
        KeyCode::Esc => Some(FormAction::Quit),
        KeyCode::Backspace => Some(FormAction::DeleteBack),
        KeyCode::Delete => Some(FormAction::DeleteForward),
        KeyCode::Left => Some(FormAction::Left),
        KeyCode::Right => Some(FormAction::Right),
        KeyCode::Home => Some(FormAction::Home),
        KeyCode::End => Some(FormAction::End),
        KeyCode::Char(c) => Some(FormAction::Insert(c)),
        _ => None,
    }
}

/// Editing actions on the setup form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Insert(char),
    DeleteBack,
    DeleteForward,
    Left,
    Right,
    Home,
    End,
    Clear,
    Paste,
    NextField,
    PrevField,
    Submit,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vim_j_maps_to_down() {
        assert_eq!(vim_key_to_action(KeyCode::Char('j')), Some(Action::Down));
    }

    #[test]
    fn vim_k_maps_to_up() {
        assert_eq!(vim_key_to_action(KeyCode::Char('k')), Some(Action::Up));
    }

    #[test]
    fn digits_choose_options() {
        assert_eq!(vim_key_to_action(KeyCode::Char('1')), Some(Action::Choose(0)));
        assert_eq!(vim_key_to_action(KeyCode::Char('4')), Some(Action::Choose(3)));
        assert_eq!(vim_key_to_action(KeyCode::Char('0')), None);
    }

    #[test]
    fn unknown_key_returns_none() {
        assert_eq!(vim_key_to_action(KeyCode::Char('x')), None);
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        assert_eq!(
            key_with_modifier_to_action(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Action::Quit)
        );
        assert_eq!(
            form_key_to_action(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(FormAction::Quit)
        );
    }

    #[test]
    fn form_letters_are_text() {
        assert_eq!(
            form_key_to_action(KeyCode::Char('q'), KeyModifiers::NONE),
            Some(FormAction::Insert('q'))
        );
        assert_eq!(
            form_key_to_action(KeyCode::Char('Q'), KeyModifiers::SHIFT),
            Some(FormAction::Insert('Q'))
        );
    }

    #[test]
    fn form_navigation_and_paste() {
        assert_eq!(form_key_to_action(KeyCode::BackTab, KeyModifiers::SHIFT), Some(FormAction::PrevField));
        assert_eq!(
            form_key_to_action(KeyCode::Char('v'), KeyModifiers::CONTROL),
            Some(FormAction::Paste)
        );
    }
}
