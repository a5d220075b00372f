//! Keyboard handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{AppState, PopupState};

/// What the app loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    /// Resubscribe with a doubled interval.
    Slower,
    /// Resubscribe with a halved interval.
    Faster,
}

pub fn handle_key(state: &mut AppState, key: KeyEvent) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }
    if state.popup == PopupState::QuitConfirm {
        return handle_quit_confirm(state, key);
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            state.popup = PopupState::QuitConfirm;
            KeyAction::None
        }
        KeyCode::Char('+') => KeyAction::Slower,
        KeyCode::Char('-') => KeyAction::Faster,
        _ => KeyAction::None,
    }
}

fn handle_quit_confirm(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.popup = PopupState::None;
            KeyAction::Quit
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            state.popup = PopupState::None;
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn state() -> AppState {
        AppState::new("local", Duration::from_secs(1))
    }

    #[test]
    fn quit_asks_for_confirmation() {
        let mut state = state();
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('q'))), KeyAction::None);
        assert_eq!(state.popup, PopupState::QuitConfirm);

        assert_eq!(handle_key(&mut state, key(KeyCode::Enter)), KeyAction::Quit);
        assert_eq!(state.popup, PopupState::None);
    }

    #[test]
    fn confirmation_can_be_cancelled() {
        let mut state = state();
        handle_key(&mut state, key(KeyCode::Esc));
        assert_eq!(state.popup, PopupState::QuitConfirm);

        assert_eq!(handle_key(&mut state, key(KeyCode::Char('n'))), KeyAction::None);
        assert_eq!(state.popup, PopupState::None);
    }

    #[test]
    fn interval_keys_ignored_while_confirming() {
        let mut state = state();
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('+'))), KeyAction::Slower);
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('-'))), KeyAction::Faster);

        state.popup = PopupState::QuitConfirm;
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('+'))), KeyAction::None);
    }

    #[test]
    fn ctrl_c_quits_immediately() {
        let mut state = state();
        let event = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'))
        };
        assert_eq!(handle_key(&mut state, event), KeyAction::Quit);
    }
}
