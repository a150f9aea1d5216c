//! User settings view: password change, preferred port, masking toggle
//!
//! A plain form rather than a dialog. The preferred-port bound is
//! 1024-65535 inclusive.

use admiral_client::MutationOutcome;
use admiral_core::prelude::*;

use crate::forms::{self, validate_port, TextField};
use crate::message::Message;
use crate::state::{AppState, SettingsFocus};

use super::{UpdateAction, UpdateResult};

pub fn handle_input(state: &mut AppState, message: Message) -> UpdateResult {
    let form = &mut state.user_settings;
    match message {
        Message::DialogChar(c) => {
            if let Some(field) = focused_text(form) {
                field.push(c);
            }
            UpdateResult::none()
        }
        Message::DialogBackspace => {
            if let Some(field) = focused_text(form) {
                field.backspace();
            }
            UpdateResult::none()
        }
        Message::DialogNextField => {
            form.focus = form.focus.next();
            UpdateResult::none()
        }
        Message::DialogPrevField => {
            form.focus = form.focus.prev();
            UpdateResult::none()
        }
        Message::DialogToggle => match form.focus {
            SettingsFocus::MaskingToggle => handle_toggle_masking(state),
            _ => {
                if let Some(field) = focused_text(form) {
                    field.push(' ');
                }
                UpdateResult::none()
            }
        },
        Message::DialogSubmit => match form.focus {
            SettingsFocus::CurrentPassword
            | SettingsFocus::NewPassword
            | SettingsFocus::ConfirmPassword
            | SettingsFocus::ChangePasswordButton => submit_password(state),
            SettingsFocus::PreferredPort | SettingsFocus::SavePortButton => submit_port(state),
            SettingsFocus::MaskingToggle => handle_toggle_masking(state),
        },
        _ => UpdateResult::none(),
    }
}

fn focused_text(
    form: &mut crate::state::UserSettingsViewState,
) -> Option<&mut TextField> {
    match form.focus {
        SettingsFocus::CurrentPassword => Some(&mut form.current_password),
        SettingsFocus::NewPassword => Some(&mut form.new_password),
        SettingsFocus::ConfirmPassword => Some(&mut form.confirm_password),
        SettingsFocus::PreferredPort => Some(&mut form.preferred_port),
        _ => None,
    }
}

fn submit_password(state: &mut AppState) -> UpdateResult {
    let form = &mut state.user_settings;
    if form.changing_password {
        return UpdateResult::none();
    }
    let current = form.current_password.validate(forms::require);
    let new = form.new_password.validate(forms::validate_password);
    let (current, new) = match (current, new) {
        (Some(c), Some(n)) => (c, n),
        _ => return UpdateResult::none(),
    };
    if form.confirm_password.value != new {
        form.confirm_password.set_error("Passwords do not match");
        return UpdateResult::none();
    }
    form.changing_password = true;
    UpdateResult::action(UpdateAction::ChangePassword { current, new })
}

pub fn handle_password_changed(state: &mut AppState, outcome: MutationOutcome) -> UpdateResult {
    let form = &mut state.user_settings;
    form.changing_password = false;
    if outcome.ok {
        form.current_password = TextField::default();
        form.new_password = TextField::default();
        form.confirm_password = TextField::default();
        state.toasts.success("Password changed");
    } else {
        state
            .toasts
            .error("Unable to change password", outcome.msg.unwrap_or_default());
    }
    UpdateResult::none()
}

fn submit_port(state: &mut AppState) -> UpdateResult {
    let Some(port) = state.user_settings.preferred_port.validate(validate_port) else {
        return UpdateResult::none();
    };
    if port == state.settings.ui.preferred_port {
        state.toasts.info("No changes made");
        return UpdateResult::none();
    }
    state.settings.ui.preferred_port = port;
    UpdateResult::action(UpdateAction::SavePreferences {
        settings: state.settings.clone(),
    })
}

pub fn handle_toggle_masking(state: &mut AppState) -> UpdateResult {
    state.settings.ui.mask_sensitive = !state.settings.ui.mask_sensitive;
    let label = if state.settings.ui.mask_sensitive {
        "Sensitive fields masked"
    } else {
        "Sensitive fields visible"
    };
    state.toasts.info(label);
    UpdateResult::action(UpdateAction::SavePreferences {
        settings: state.settings.clone(),
    })
}

pub fn handle_preferences_saved(state: &mut AppState, error: Option<String>) -> UpdateResult {
    match error {
        Some(error) => {
            warn!(%error, "failed to persist preferences");
            state.toasts.error("Unable to save preferences", error);
        }
        None => state.toasts.success("Preferences saved"),
    }
    UpdateResult::none()
}
