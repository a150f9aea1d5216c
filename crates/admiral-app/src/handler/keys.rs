//! Key event handlers for different UI modes

use crate::input_key::InputKey;
use crate::message::Message;
use crate::state::{AppState, View};

/// Convert key events to messages based on what currently has focus
pub fn handle_key(state: &AppState, key: InputKey) -> Option<Message> {
    // Force quit always works, even mid-dialog
    if key == InputKey::CharCtrl('c') {
        return Some(Message::Quit);
    }
    if state.confirm.is_some() {
        return handle_key_confirm(key);
    }
    if state.in_dialog() {
        return handle_key_dialog(key);
    }
    if state.view == View::UserSettings {
        return handle_key_user_settings(key);
    }
    handle_key_browse(state, key)
}

/// Confirmation dialogs: y/n shortcuts plus arrow + enter selection
fn handle_key_confirm(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Char('y' | 'Y') | InputKey::Enter => Some(Message::ConfirmAccept),
        InputKey::Char('n' | 'N') | InputKey::Esc => Some(Message::CloseConfirm),
        InputKey::Left | InputKey::Up => Some(Message::ConfirmPrev),
        InputKey::Right | InputKey::Down | InputKey::Tab => Some(Message::ConfirmNext),
        _ => None,
    }
}

/// Create/edit dialogs: free text entry plus field navigation
fn handle_key_dialog(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Esc => Some(Message::DialogCancel),
        InputKey::Enter => Some(Message::DialogSubmit),
        InputKey::Tab | InputKey::Down => Some(Message::DialogNextField),
        InputKey::BackTab | InputKey::Up => Some(Message::DialogPrevField),
        InputKey::Left => Some(Message::DialogCyclePrev),
        InputKey::Right => Some(Message::DialogCycleNext),
        InputKey::Backspace => Some(Message::DialogBackspace),
        InputKey::Char(c) => Some(Message::DialogChar(c)),
        _ => None,
    }
}

/// The settings view is one big form; digits must reach the port field,
/// so the number-key navigation shortcuts do not apply here.
fn handle_key_user_settings(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Esc => Some(Message::Navigate(View::Summary)),
        InputKey::Enter => Some(Message::DialogSubmit),
        InputKey::Tab | InputKey::Down => Some(Message::DialogNextField),
        InputKey::BackTab | InputKey::Up => Some(Message::DialogPrevField),
        InputKey::Backspace => Some(Message::DialogBackspace),
        InputKey::Char(' ') => Some(Message::DialogToggle),
        InputKey::Char(c) => Some(Message::DialogChar(c)),
        _ => None,
    }
}

/// Browse mode: navigation, refresh, and view-specific row actions
fn handle_key_browse(state: &AppState, key: InputKey) -> Option<Message> {
    // Number keys jump straight to a view
    if let InputKey::Char(c) = key {
        if let Some(digit) = c.to_digit(10) {
            let idx = digit.checked_sub(1)? as usize;
            if let Some(view) = View::ALL.get(idx) {
                return Some(Message::Navigate(*view));
            }
        }
    }

    match key {
        InputKey::Char('q') | InputKey::Esc => Some(Message::RequestQuit),
        InputKey::Char('r') => Some(Message::RefreshView),
        InputKey::Char('m') => Some(Message::ToggleMasking),
        InputKey::Up => Some(Message::GridUp),
        InputKey::Down => Some(Message::GridDown),
        InputKey::Tab => Some(Message::SwitchTab),
        InputKey::Char('n') => match state.view {
            View::Credentials | View::Users | View::Presets | View::Registries => {
                Some(Message::OpenCreateDialog)
            }
            _ => None,
        },
        InputKey::Char('e') | InputKey::Enter => match state.view {
            View::Credentials
            | View::Users
            | View::Environments
            | View::Presets
            | View::Registries => Some(Message::OpenEditDialog),
            _ => None,
        },
        InputKey::Char('d') | InputKey::Delete => match state.view {
            View::Credentials | View::Users | View::Presets | View::Registries => {
                Some(Message::OpenDeleteConfirm)
            }
            _ => None,
        },
        InputKey::Char('g') if state.view == View::Credentials => {
            Some(Message::OpenRegenerateConfirm)
        }
        InputKey::Char('s') if state.view == View::Environments => Some(Message::RescanRegistry),
        InputKey::Char('t') if state.view == View::Registries => {
            Some(Message::ToggleRegistryEnabled)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_c_always_quits() {
        let mut state = AppState::default();
        state.request_quit(); // confirm dialog open
        assert!(matches!(
            handle_key(&state, InputKey::CharCtrl('c')),
            Some(Message::Quit)
        ));
    }

    #[test]
    fn test_q_requests_quit_in_browse_mode() {
        let state = AppState::default();
        assert!(matches!(
            handle_key(&state, InputKey::Char('q')),
            Some(Message::RequestQuit)
        ));
    }

    #[test]
    fn test_number_keys_navigate() {
        let state = AppState::default();
        assert!(matches!(
            handle_key(&state, InputKey::Char('2')),
            Some(Message::Navigate(View::Credentials))
        ));
        assert!(matches!(
            handle_key(&state, InputKey::Char('6')),
            Some(Message::Navigate(View::Registries))
        ));
        // Out of range digits do nothing
        assert!(handle_key(&state, InputKey::Char('9')).is_none());
    }

    #[test]
    fn test_view_specific_keys() {
        let mut state = AppState::default();
        state.view = View::Credentials;
        assert!(matches!(
            handle_key(&state, InputKey::Char('g')),
            Some(Message::OpenRegenerateConfirm)
        ));

        state.view = View::Environments;
        assert!(handle_key(&state, InputKey::Char('g')).is_none());
        assert!(matches!(
            handle_key(&state, InputKey::Char('s')),
            Some(Message::RescanRegistry)
        ));

        state.view = View::Registries;
        assert!(matches!(
            handle_key(&state, InputKey::Char('t')),
            Some(Message::ToggleRegistryEnabled)
        ));
    }

    #[test]
    fn test_summary_has_no_row_actions() {
        let state = AppState::default();
        assert!(handle_key(&state, InputKey::Char('n')).is_none());
        assert!(handle_key(&state, InputKey::Char('d')).is_none());
    }

    #[test]
    fn test_confirm_dialog_keys() {
        let mut state = AppState::default();
        state.request_quit();
        assert!(matches!(
            handle_key(&state, InputKey::Enter),
            Some(Message::ConfirmAccept)
        ));
        assert!(matches!(
            handle_key(&state, InputKey::Esc),
            Some(Message::CloseConfirm)
        ));
        assert!(matches!(
            handle_key(&state, InputKey::Right),
            Some(Message::ConfirmNext)
        ));
    }

    #[test]
    fn test_dialog_chars_reach_fields() {
        let mut state = AppState::default();
        state.view = View::Presets;
        state.presets.dialog = Some(crate::dialogs::PresetForm::new());
        assert!(matches!(
            handle_key(&state, InputKey::Char('x')),
            Some(Message::DialogChar('x'))
        ));
        assert!(matches!(
            handle_key(&state, InputKey::Esc),
            Some(Message::DialogCancel)
        ));
    }

    #[test]
    fn test_user_settings_digits_are_text_input() {
        let mut state = AppState::default();
        state.view = View::UserSettings;
        assert!(matches!(
            handle_key(&state, InputKey::Char('2')),
            Some(Message::DialogChar('2'))
        ));
    }
}
