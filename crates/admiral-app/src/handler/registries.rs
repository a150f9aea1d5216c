//! Container registry view: refresh, upsert, delete, enablement toggle
//!
//! Enablement is membership in the domain's `allowed_docker_registries`
//! set and is toggled independently of the entry itself.

use std::collections::HashSet;

use admiral_client::MutationOutcome;
use admiral_core::prelude::*;
use admiral_core::{DataTopic, RegistryRow};

use crate::confirm_dialog::ConfirmDialogState;
use crate::dialogs::{DialogPhase, RegistryForm};
use crate::message::Message;
use crate::state::AppState;

use super::{UpdateAction, UpdateResult};

pub fn refresh(state: &mut AppState) -> UpdateResult {
    state.registries.grid.set_loading();
    UpdateResult::action(UpdateAction::FetchRegistries)
}

/// Merge enablement into the entries from the allowed set.
pub fn merge_enabled(
    mut registries: Vec<RegistryRow>,
    allowed: &HashSet<String>,
) -> Vec<RegistryRow> {
    for row in &mut registries {
        row.enabled = allowed.contains(&row.hostname);
    }
    registries
}

pub fn handle_loaded(
    state: &mut AppState,
    registries: Vec<RegistryRow>,
    allowed_registries: HashSet<String>,
) -> UpdateResult {
    let rows = merge_enabled(registries, &allowed_registries);
    state.registries.grid.set_rows(rows);
    UpdateResult::none()
}

pub fn handle_load_failed(state: &mut AppState, error: String) -> UpdateResult {
    error!(%error, "registry refresh failed");
    state.registries.grid.fail();
    state.toasts.error("Unable to fetch registries", error);
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────
// Dialog
// ─────────────────────────────────────────────────────────────────

pub fn handle_dialog(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::OpenCreateDialog => {
            state.registries.dialog = Some(RegistryForm::new());
            UpdateResult::none()
        }
        Message::OpenEditDialog => {
            if let Some(row) = state.registries.grid.selected_row() {
                state.registries.dialog = Some(RegistryForm::from_row(row));
            }
            UpdateResult::none()
        }
        Message::OpenDeleteConfirm => {
            if let Some(row) = state.registries.grid.selected_row() {
                state.confirm = Some(ConfirmDialogState::delete_registry(&row.hostname));
            }
            UpdateResult::none()
        }
        Message::DialogCancel => {
            state.registries.dialog = None;
            UpdateResult::none()
        }
        Message::DialogSubmit => submit(state),
        other => {
            if let Some(form) = &mut state.registries.dialog {
                match other {
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
                    Message::DialogNextField => {
                        form.focus = (form.focus + 1) % RegistryForm::FIELDS
                    }
                    Message::DialogPrevField => {
                        form.focus = (form.focus + RegistryForm::FIELDS - 1) % RegistryForm::FIELDS
                    }
                    Message::DialogCycleNext | Message::DialogToggle => form.cycle(true),
                    Message::DialogCyclePrev => form.cycle(false),
                    _ => {}
                }
            }
            UpdateResult::none()
        }
    }
}

fn submit(state: &mut AppState) -> UpdateResult {
    let Some(form) = &mut state.registries.dialog else {
        return UpdateResult::none();
    };
    // An empty harbor project blocks submission here (inline error).
    let Some(payload) = form.build() else {
        return UpdateResult::none();
    };

    if let Some(original) = &form.original {
        let unchanged = payload.url == original.url
            && payload.username == original.username
            && payload.kind == original.kind
            && payload.project == original.project
            && payload.password.is_none();
        if unchanged {
            state.registries.dialog = None;
            state.toasts.info("No changes made");
            return UpdateResult::none();
        }
    }

    form.phase = DialogPhase::Submitting;
    UpdateResult::action(UpdateAction::SetRegistry(Box::new(payload)))
}

// ─────────────────────────────────────────────────────────────────
// Enablement toggle and delete
// ─────────────────────────────────────────────────────────────────

pub fn handle_toggle_enabled(state: &mut AppState) -> UpdateResult {
    let Some(row) = state.registries.grid.selected_row() else {
        return UpdateResult::none();
    };
    UpdateResult::action(UpdateAction::SetRegistryEnabled {
        hostname: row.hostname.clone(),
        enabled: !row.enabled,
    })
}

pub fn handle_delete_confirmed(state: &mut AppState, hostname: String) -> UpdateResult {
    if let Some(confirm) = &mut state.confirm {
        confirm.submitting = true;
    }
    UpdateResult::action(UpdateAction::DeleteRegistry { hostname })
}

// ─────────────────────────────────────────────────────────────────
// Mutation results
// ─────────────────────────────────────────────────────────────────

pub fn handle_saved(
    state: &mut AppState,
    hostname: String,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        state.registries.dialog = None;
        state.toasts.success(format!("Registry {hostname} saved"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Registries))
    } else {
        if let Some(form) = &mut state.registries.dialog {
            form.phase = DialogPhase::Open;
        }
        state
            .toasts
            .error("Unable to save registry", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

pub fn handle_deleted(
    state: &mut AppState,
    hostname: String,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        state.confirm = None;
        state.toasts.success(format!("Registry {hostname} deleted"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Registries))
    } else {
        if let Some(confirm) = &mut state.confirm {
            confirm.submitting = false;
        }
        state
            .toasts
            .error("Unable to delete registry", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

pub fn handle_enablement_changed(
    state: &mut AppState,
    hostname: String,
    enabled: bool,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        let verb = if enabled { "enabled" } else { "disabled" };
        state.toasts.success(format!("Registry {hostname} {verb}"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Registries))
    } else {
        state
            .toasts
            .error("Unable to toggle registry", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}
