//! User view: refresh controller and action handlers

use admiral_client::MutationOutcome;
use admiral_core::prelude::*;
use admiral_core::{Capability, DataTopic, UserRow, UserStatus};

use crate::confirm_dialog::ConfirmDialogState;
use crate::dialogs::{DialogPhase, UserCreateForm, UserDialog, UserEditForm};
use crate::message::Message;
use crate::state::{AppState, UserTab};

use super::{UpdateAction, UpdateResult};

/// Status filter for the current tab: the inactive tab covers every
/// non-active lifecycle state.
fn statuses_for_tab(tab: UserTab) -> Vec<UserStatus> {
    match tab {
        UserTab::Active => vec![UserStatus::Active],
        UserTab::Inactive => vec![
            UserStatus::Inactive,
            UserStatus::BeforeVerification,
            UserStatus::Deleted,
        ],
    }
}

pub fn refresh(state: &mut AppState) -> UpdateResult {
    state.users.grid.set_loading();
    UpdateResult::action(UpdateAction::FetchUsers {
        statuses: statuses_for_tab(state.users.tab),
    })
}

pub fn handle_loaded(state: &mut AppState, mut users: Vec<UserRow>) -> UpdateResult {
    // The TOTP column only exists when the server advertises 2FA.
    if !state.caps.supports(Capability::TwoFactorAuth) {
        for user in &mut users {
            user.totp_activated = None;
        }
    }
    state.users.grid.set_rows(users);
    UpdateResult::none()
}

pub fn handle_load_failed(state: &mut AppState, error: String) -> UpdateResult {
    error!(%error, "user refresh failed");
    state.users.grid.fail();
    state.toasts.error("Unable to fetch users", error);
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────
// Dialogs
// ─────────────────────────────────────────────────────────────────

pub fn handle_dialog(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::OpenCreateDialog => {
            state.users.dialog = Some(UserDialog::Create(UserCreateForm::new()));
            UpdateResult::none()
        }
        Message::OpenEditDialog => {
            if let Some(row) = state.users.grid.selected_row() {
                state.users.dialog = Some(UserDialog::Edit(UserEditForm::from_row(row)));
            }
            UpdateResult::none()
        }
        Message::OpenDeleteConfirm => {
            if let Some(row) = state.users.grid.selected_row() {
                state.confirm = Some(ConfirmDialogState::delete_user(&row.email));
            }
            UpdateResult::none()
        }
        Message::DialogCancel => {
            state.users.dialog = None;
            UpdateResult::none()
        }
        Message::DialogSubmit => submit(state),
        other => {
            apply_field_input(state, other);
            UpdateResult::none()
        }
    }
}

fn apply_field_input(state: &mut AppState, message: Message) {
    let Some(dialog) = &mut state.users.dialog else {
        return;
    };
    match dialog {
        UserDialog::Create(form) => match message {
            Message::DialogChar(c) => {
                if let Some(field) = form.focused_text() {
                    field.push(c);
                }
            }
            Message::DialogBackspace => {
                if let Some(field) = form.focused_text() {
                    field.backspace();
                }
            }
            Message::DialogNextField => form.focus = (form.focus + 1) % UserCreateForm::FIELDS,
            Message::DialogPrevField => {
                form.focus = (form.focus + UserCreateForm::FIELDS - 1) % UserCreateForm::FIELDS
            }
            Message::DialogCycleNext | Message::DialogToggle => form.cycle(true),
            Message::DialogCyclePrev => form.cycle(false),
            _ => {}
        },
        UserDialog::Edit(form) => match message {
            Message::DialogChar(c) => {
                if let Some(field) = form.focused_text() {
                    field.push(c);
                }
            }
            Message::DialogBackspace => {
                if let Some(field) = form.focused_text() {
                    field.backspace();
                }
            }
            Message::DialogNextField => form.focus = (form.focus + 1) % UserEditForm::FIELDS,
            Message::DialogPrevField => {
                form.focus = (form.focus + UserEditForm::FIELDS - 1) % UserEditForm::FIELDS
            }
            Message::DialogCycleNext | Message::DialogToggle => form.cycle(true),
            Message::DialogCyclePrev => form.cycle(false),
            _ => {}
        },
    }
}

fn submit(state: &mut AppState) -> UpdateResult {
    match &mut state.users.dialog {
        Some(UserDialog::Create(form)) => match form.build() {
            Some(payload) => {
                form.phase = DialogPhase::Submitting;
                UpdateResult::action(UpdateAction::CreateUser(Box::new(payload)))
            }
            None => UpdateResult::none(),
        },
        Some(UserDialog::Edit(form)) => match form.validate_and_diff() {
            None => UpdateResult::none(),
            Some(None) => {
                state.users.dialog = None;
                state.toasts.info("No changes made");
                UpdateResult::none()
            }
            Some(Some(patch)) => {
                let email = form.original.email.clone();
                form.phase = DialogPhase::Submitting;
                UpdateResult::action(UpdateAction::ModifyUser { email, patch })
            }
        },
        None => UpdateResult::none(),
    }
}

pub fn handle_delete_confirmed(state: &mut AppState, email: String) -> UpdateResult {
    if let Some(confirm) = &mut state.confirm {
        confirm.submitting = true;
    }
    UpdateResult::action(UpdateAction::DeleteUser { email })
}

// ─────────────────────────────────────────────────────────────────
// Mutation results
// ─────────────────────────────────────────────────────────────────

pub fn handle_created(state: &mut AppState, outcome: MutationOutcome) -> UpdateResult {
    if outcome.ok {
        state.users.dialog = None;
        state.toasts.success("User created");
        UpdateResult::action(UpdateAction::Publish(DataTopic::Users))
    } else {
        reopen_dialog(state);
        state
            .toasts
            .error("Unable to create user", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

pub fn handle_modified(
    state: &mut AppState,
    email: String,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        state.users.dialog = None;
        state.toasts.success(format!("User {email} updated"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Users))
    } else {
        reopen_dialog(state);
        state
            .toasts
            .error("Unable to update user", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

pub fn handle_deleted(
    state: &mut AppState,
    email: String,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        state.confirm = None;
        state.toasts.success(format!("User {email} deleted"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Users))
    } else {
        if let Some(confirm) = &mut state.confirm {
            confirm.submitting = false;
        }
        state
            .toasts
            .error("Unable to delete user", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

fn reopen_dialog(state: &mut AppState) {
    match &mut state.users.dialog {
        Some(UserDialog::Create(form)) => form.phase = DialogPhase::Open,
        Some(UserDialog::Edit(form)) => form.phase = DialogPhase::Open,
        None => {}
    }
}
