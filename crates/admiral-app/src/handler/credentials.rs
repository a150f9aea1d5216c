//! Credential (keypair) view: refresh controller and action handlers
//!
//! The refresh chain fetches resource policies first because the keypair
//! rows resolve their slot totals against the policy mapping by name.
//! Active and inactive grids refresh independently and idempotently.

use std::collections::HashMap;

use admiral_client::MutationOutcome;
use admiral_core::prelude::*;
use admiral_core::{Capability, DataTopic, KeypairRow, ResourcePolicy};

use crate::confirm_dialog::ConfirmDialogState;
use crate::dialogs::{CredentialDialog, DialogPhase, KeypairCreateForm, KeypairEditForm};
use crate::message::Message;
use crate::state::AppState;

use super::{UpdateAction, UpdateResult};

/// Rate limits below this open a confirmation dialog before submitting.
pub const RATE_LIMIT_SOFT_MINIMUM: u32 = 100;

// ─────────────────────────────────────────────────────────────────
// Refresh controller
// ─────────────────────────────────────────────────────────────────

/// Refresh both grids; the inactive fetch is chained as a follow-up
/// message so each grid keeps its own loading state.
pub fn refresh_both(state: &mut AppState) -> UpdateResult {
    state.credentials.active.set_loading();
    UpdateResult::both(
        Message::RefreshCredentials { is_active: false },
        fetch_action(state, true),
    )
}

pub fn handle_refresh(state: &mut AppState, is_active: bool) -> UpdateResult {
    state.credentials.grid_mut(is_active).set_loading();
    UpdateResult::action(fetch_action(state, is_active))
}

fn fetch_action(state: &AppState, is_active: bool) -> UpdateAction {
    UpdateAction::FetchCredentials {
        is_active,
        include_main_keys: state.caps.supports(Capability::MainAccessKey),
    }
}

/// Merge raw keypairs with the policy mapping and (when supported) the
/// main-access-key designations. Pure: same inputs, same rows.
pub fn merge_rows(
    keypairs: Vec<KeypairRow>,
    policies: &HashMap<String, ResourcePolicy>,
    main_access_keys: Option<&HashMap<String, String>>,
) -> Vec<KeypairRow> {
    keypairs
        .into_iter()
        .map(|mut kp| {
            // Absent policy names leave the resource fields unset.
            if let Some(policy) = policies.get(&kp.resource_policy) {
                kp.total_slots = Some(policy.total_resource_slots.clone());
                kp.max_concurrent_sessions = Some(policy.max_concurrent_sessions.clone());
            }
            if let Some(map) = main_access_keys {
                kp.is_main = Some(
                    map.get(&kp.user_id)
                        .is_some_and(|main| *main == kp.access_key),
                );
            }
            kp
        })
        .collect()
}

pub fn handle_loaded(
    state: &mut AppState,
    is_active: bool,
    policies: Vec<ResourcePolicy>,
    keypairs: Vec<KeypairRow>,
    main_access_keys: Option<HashMap<String, String>>,
) -> UpdateResult {
    state.credentials.policies = policies.into_iter().map(|p| (p.name.clone(), p)).collect();
    let rows = merge_rows(
        keypairs,
        &state.credentials.policies,
        main_access_keys.as_ref(),
    );
    state.credentials.grid_mut(is_active).set_rows(rows);
    UpdateResult::none()
}

pub fn handle_load_failed(state: &mut AppState, is_active: bool, error: String) -> UpdateResult {
    error!(is_active, %error, "credential refresh failed");
    state.credentials.grid_mut(is_active).fail();
    state.toasts.error("Unable to fetch credentials", error);
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────
// Dialogs
// ─────────────────────────────────────────────────────────────────

pub fn handle_dialog(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::OpenCreateDialog => {
            state.credentials.dialog = Some(CredentialDialog::Create(KeypairCreateForm::new()));
            UpdateResult::none()
        }
        Message::OpenEditDialog => {
            if let Some(row) = state.credentials.focused_grid().selected_row() {
                state.credentials.dialog =
                    Some(CredentialDialog::Edit(KeypairEditForm::from_row(row)));
            }
            UpdateResult::none()
        }
        Message::OpenDeleteConfirm => {
            if let Some(row) = state.credentials.focused_grid().selected_row() {
                state.confirm = Some(ConfirmDialogState::delete_keypair(&row.access_key));
            }
            UpdateResult::none()
        }
        Message::OpenRegenerateConfirm => {
            if let Some(row) = state.credentials.focused_grid().selected_row() {
                state.confirm = Some(ConfirmDialogState::regenerate_keypair(&row.access_key));
            }
            UpdateResult::none()
        }
        Message::DialogCancel => {
            state.credentials.dialog = None;
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
    let Some(dialog) = &mut state.credentials.dialog else {
        return;
    };
    match dialog {
        CredentialDialog::Create(form) => match message {
            Message::DialogChar(c) => form.input_char(c),
            Message::DialogBackspace => {
                if let Some(field) = form.focused_text() {
                    field.backspace();
                }
            }
            Message::DialogNextField => form.focus = (form.focus + 1) % KeypairCreateForm::FIELDS,
            Message::DialogPrevField => {
                form.focus =
                    (form.focus + KeypairCreateForm::FIELDS - 1) % KeypairCreateForm::FIELDS
            }
            Message::DialogToggle | Message::DialogCycleNext | Message::DialogCyclePrev => {
                form.toggle()
            }
            _ => {}
        },
        CredentialDialog::Edit(form) => match message {
            Message::DialogChar(c) => form.input_char(c),
            Message::DialogBackspace => {
                if let Some(field) = form.focused_text() {
                    field.backspace();
                }
            }
            Message::DialogNextField => form.focus = (form.focus + 1) % KeypairEditForm::FIELDS,
            Message::DialogPrevField => {
                form.focus = (form.focus + KeypairEditForm::FIELDS - 1) % KeypairEditForm::FIELDS
            }
            Message::DialogToggle | Message::DialogCycleNext | Message::DialogCyclePrev => {
                form.toggle()
            }
            _ => {}
        },
    }
}

fn submit(state: &mut AppState) -> UpdateResult {
    match &mut state.credentials.dialog {
        Some(CredentialDialog::Create(form)) => match form.build() {
            Some(payload) => {
                form.phase = DialogPhase::Submitting;
                UpdateResult::action(UpdateAction::CreateKeypair(payload))
            }
            // Inline field errors block submission
            None => UpdateResult::none(),
        },
        Some(CredentialDialog::Edit(_)) => submit_edit(state),
        None => UpdateResult::none(),
    }
}

/// Submit the edit dialog: diff first, then the soft-threshold check.
fn submit_edit(state: &mut AppState) -> UpdateResult {
    let Some(CredentialDialog::Edit(form)) = &mut state.credentials.dialog else {
        return UpdateResult::none();
    };
    let Some((patch, rate_limit)) = form.validate_and_diff() else {
        return UpdateResult::none();
    };
    let Some(patch) = patch else {
        state.credentials.dialog = None;
        state.toasts.info("No changes made");
        return UpdateResult::none();
    };

    // A below-threshold rate limit needs explicit acknowledgment before
    // anything is sent.
    if patch.contains_key("rate_limit")
        && rate_limit < RATE_LIMIT_SOFT_MINIMUM
        && !form.rate_limit_confirmed
    {
        state.confirm = Some(ConfirmDialogState::low_rate_limit(rate_limit));
        return UpdateResult::none();
    }

    form.phase = DialogPhase::Submitting;
    UpdateResult::action(UpdateAction::ModifyKeypair {
        access_key: form.original.access_key.clone(),
        patch,
    })
}

/// The low-rate-limit dialog was accepted: mark the form confirmed and
/// re-run the submit path, which now passes the threshold gate.
pub fn handle_rate_limit_confirmed(state: &mut AppState) -> UpdateResult {
    state.confirm = None;
    if let Some(CredentialDialog::Edit(form)) = &mut state.credentials.dialog {
        form.rate_limit_confirmed = true;
        return submit_edit(state);
    }
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────
// Confirmed destructive actions
// ─────────────────────────────────────────────────────────────────

pub fn handle_delete_confirmed(state: &mut AppState, access_key: String) -> UpdateResult {
    if let Some(confirm) = &mut state.confirm {
        confirm.submitting = true;
    }
    UpdateResult::action(UpdateAction::DeleteKeypair { access_key })
}

pub fn handle_regenerate_confirmed(state: &mut AppState, access_key: String) -> UpdateResult {
    if let Some(confirm) = &mut state.confirm {
        confirm.submitting = true;
    }
    UpdateResult::action(UpdateAction::RegenerateKeypair { access_key })
}

// ─────────────────────────────────────────────────────────────────
// Mutation results
// ─────────────────────────────────────────────────────────────────

pub fn handle_created(state: &mut AppState, outcome: MutationOutcome) -> UpdateResult {
    if outcome.ok {
        state.credentials.dialog = None;
        state.toasts.success("Keypair created");
        UpdateResult::action(UpdateAction::Publish(DataTopic::Credentials))
    } else {
        reopen_dialog(state);
        state
            .toasts
            .error("Unable to create keypair", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

pub fn handle_modified(
    state: &mut AppState,
    access_key: String,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        state.credentials.dialog = None;
        state.toasts.success(format!("Keypair {access_key} updated"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Credentials))
    } else {
        reopen_dialog(state);
        state
            .toasts
            .error("Unable to update keypair", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

/// A failed delete leaves the confirmation dialog open and does not
/// trigger any refresh.
pub fn handle_deleted(
    state: &mut AppState,
    access_key: String,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        state.confirm = None;
        state.toasts.success(format!("Keypair {access_key} deleted"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Credentials))
    } else {
        if let Some(confirm) = &mut state.confirm {
            confirm.submitting = false;
        }
        state
            .toasts
            .error("Unable to delete keypair", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

pub fn handle_regenerated(
    state: &mut AppState,
    access_key: String,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        state.confirm = None;
        state
            .toasts
            .success(format!("Secret key of {access_key} regenerated"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Credentials))
    } else {
        if let Some(confirm) = &mut state.confirm {
            confirm.submitting = false;
        }
        state
            .toasts
            .error("Unable to regenerate keypair", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

fn reopen_dialog(state: &mut AppState) {
    match &mut state.credentials.dialog {
        Some(CredentialDialog::Create(form)) => form.phase = DialogPhase::Open,
        Some(CredentialDialog::Edit(form)) => form.phase = DialogPhase::Open,
        None => {}
    }
}
