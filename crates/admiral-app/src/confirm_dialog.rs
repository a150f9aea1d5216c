//! Confirm dialog state.
//!
//! Data model for confirmation dialogs. The rendering widget lives in
//! admiral-tui. Each option carries the message dispatched when chosen,
//! so the dialog itself knows nothing about what it is confirming.

use crate::message::Message;

#[derive(Debug, Clone)]
pub struct ConfirmDialogState {
    pub title: String,
    pub message: String,
    pub options: Vec<(String, Message)>,
    pub selected: usize,
    /// Set while the confirmed mutation is in flight; a structural failure
    /// clears it and leaves the dialog open for another attempt.
    pub submitting: bool,
}

impl ConfirmDialogState {
    /// Create a generic confirmation dialog
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        options: Vec<(&str, Message)>,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            options: options
                .into_iter()
                .map(|(label, msg)| (label.to_string(), msg))
                .collect(),
            selected: 0,
            submitting: false,
        }
    }

    /// Quit confirmation shown while connected.
    pub fn quit_confirmation() -> Self {
        Self::new(
            "Quit Admiral?",
            "Any in-flight changes will keep running on the server.",
            vec![
                ("Quit", Message::ConfirmQuit),
                ("Cancel", Message::CancelQuit),
            ],
        )
    }

    /// Keypair deletion confirmation.
    pub fn delete_keypair(access_key: &str) -> Self {
        Self::new(
            "Delete keypair?",
            format!("{access_key} will be removed permanently."),
            vec![
                (
                    "Delete",
                    Message::DeleteKeypairConfirmed {
                        access_key: access_key.to_string(),
                    },
                ),
                ("Cancel", Message::CloseConfirm),
            ],
        )
    }

    /// Secret rotation confirmation.
    pub fn regenerate_keypair(access_key: &str) -> Self {
        Self::new(
            "Regenerate secret key?",
            format!("The current secret of {access_key} stops working immediately."),
            vec![
                (
                    "Regenerate",
                    Message::RegenerateKeypairConfirmed {
                        access_key: access_key.to_string(),
                    },
                ),
                ("Cancel", Message::CloseConfirm),
            ],
        )
    }

    /// Shown when a requested rate limit is below the recommended minimum.
    pub fn low_rate_limit(value: u32) -> Self {
        Self::new(
            "Rate limit looks very low",
            format!("{value} requests per 15 minutes may lock the user out. Proceed?"),
            vec![
                ("Proceed", Message::RateLimitConfirmed),
                ("Cancel", Message::CloseConfirm),
            ],
        )
    }

    /// User deletion confirmation.
    pub fn delete_user(email: &str) -> Self {
        Self::new(
            "Delete user?",
            format!("{email} will be marked deleted and signed out."),
            vec![
                (
                    "Delete",
                    Message::DeleteUserConfirmed {
                        email: email.to_string(),
                    },
                ),
                ("Cancel", Message::CloseConfirm),
            ],
        )
    }

    /// Preset deletion confirmation.
    pub fn delete_preset(name: &str) -> Self {
        Self::new(
            "Delete resource preset?",
            format!("Preset '{name}' will no longer be offered at session launch."),
            vec![
                (
                    "Delete",
                    Message::DeletePresetConfirmed {
                        name: name.to_string(),
                    },
                ),
                ("Cancel", Message::CloseConfirm),
            ],
        )
    }

    /// Registry deletion confirmation.
    pub fn delete_registry(hostname: &str) -> Self {
        Self::new(
            "Delete registry?",
            format!("{hostname} will be removed. Its images disappear on the next rescan."),
            vec![
                (
                    "Delete",
                    Message::DeleteRegistryConfirmed {
                        hostname: hostname.to_string(),
                    },
                ),
                ("Cancel", Message::CloseConfirm),
            ],
        )
    }

    pub fn select_next(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + 1) % self.options.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + self.options.len() - 1) % self.options.len();
        }
    }

    /// The message behind the currently selected option.
    pub fn accept(&self) -> Option<Message> {
        self.options.get(self.selected).map(|(_, msg)| msg.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_wraps() {
        let mut dialog = ConfirmDialogState::quit_confirmation();
        assert_eq!(dialog.selected, 0);
        dialog.select_next();
        assert_eq!(dialog.selected, 1);
        dialog.select_next();
        assert_eq!(dialog.selected, 0);
        dialog.select_prev();
        assert_eq!(dialog.selected, 1);
    }

    #[test]
    fn test_accept_returns_selected_option() {
        let dialog = ConfirmDialogState::delete_keypair("AK1");
        assert!(matches!(
            dialog.accept(),
            Some(Message::DeleteKeypairConfirmed { .. })
        ));
    }
}
