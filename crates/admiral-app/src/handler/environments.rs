//! Environment image view: refresh, resource-limit edits, registry rescan
//!
//! Only images whose registry is in the domain's allowed set are kept.
//! A rescan is a server background task; its progress stream is forwarded
//! into the message loop by the action executor.

use std::collections::HashSet;

use admiral_client::MutationOutcome;
use admiral_core::prelude::*;
use admiral_core::{DataTopic, ImageRow};

use crate::dialogs::{DialogPhase, ImageLimitsForm};
use crate::message::{Message, RescanResult};
use crate::state::{AppState, RescanState};

use super::{UpdateAction, UpdateResult};

pub fn refresh(state: &mut AppState) -> UpdateResult {
    state.environments.grid.set_loading();
    UpdateResult::action(UpdateAction::FetchImages)
}

/// Keep only images from allowed registries.
pub fn filter_allowed(images: Vec<ImageRow>, allowed: &HashSet<String>) -> Vec<ImageRow> {
    images
        .into_iter()
        .filter(|img| allowed.contains(&img.registry))
        .collect()
}

pub fn handle_loaded(
    state: &mut AppState,
    images: Vec<ImageRow>,
    allowed_registries: HashSet<String>,
) -> UpdateResult {
    let rows = filter_allowed(images, &allowed_registries);
    state.environments.allowed_registries = allowed_registries;
    state.environments.grid.set_rows(rows);
    UpdateResult::none()
}

pub fn handle_load_failed(state: &mut AppState, error: String) -> UpdateResult {
    error!(%error, "image refresh failed");
    state.environments.grid.fail();
    state.toasts.error("Unable to fetch images", error);
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────
// Resource limit dialog
// ─────────────────────────────────────────────────────────────────

pub fn handle_dialog(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::OpenEditDialog => {
            if let Some(row) = state.environments.grid.selected_row() {
                state.environments.dialog = Some(ImageLimitsForm::from_limits(
                    row.reference(),
                    &row.resource_limits,
                ));
            }
            UpdateResult::none()
        }
        Message::DialogCancel => {
            state.environments.dialog = None;
            UpdateResult::none()
        }
        Message::DialogSubmit => {
            let Some(form) = &mut state.environments.dialog else {
                return UpdateResult::none();
            };
            match form.build() {
                Some(limits) => {
                    let reference = form.reference.clone();
                    form.phase = DialogPhase::Submitting;
                    UpdateResult::action(UpdateAction::ModifyImageLimits { reference, limits })
                }
                None => UpdateResult::none(),
            }
        }
        other => {
            if let Some(form) = &mut state.environments.dialog {
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
                        form.focus = (form.focus + 1) % ImageLimitsForm::FIELDS
                    }
                    Message::DialogPrevField => {
                        form.focus =
                            (form.focus + ImageLimitsForm::FIELDS - 1) % ImageLimitsForm::FIELDS
                    }
                    _ => {}
                }
            }
            UpdateResult::none()
        }
    }
}

pub fn handle_limits_modified(
    state: &mut AppState,
    reference: String,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        state.environments.dialog = None;
        state
            .toasts
            .success(format!("Resource limits of {reference} updated"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Images))
    } else {
        if let Some(form) = &mut state.environments.dialog {
            form.phase = DialogPhase::Open;
        }
        state
            .toasts
            .error("Unable to update image", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

// ─────────────────────────────────────────────────────────────────
// Registry rescan
// ─────────────────────────────────────────────────────────────────

pub fn handle_rescan_requested(state: &mut AppState) -> UpdateResult {
    if state.environments.rescan.is_some() {
        state.toasts.info("A rescan is already running");
        return UpdateResult::none();
    }
    let Some(row) = state.environments.grid.selected_row() else {
        state.toasts.info("Select an image to pick its registry");
        return UpdateResult::none();
    };
    UpdateResult::action(UpdateAction::RescanImages {
        registry: row.registry.clone(),
    })
}

pub fn handle_rescan_started(state: &mut AppState, task_id: String) -> UpdateResult {
    state.environments.rescan = Some(RescanState {
        task_id,
        current: 0,
        total: 0,
    });
    state.toasts.info("Registry rescan started");
    UpdateResult::none()
}

pub fn handle_rescan_start_failed(state: &mut AppState, error: String) -> UpdateResult {
    state.toasts.error("Unable to start rescan", error);
    UpdateResult::none()
}

pub fn handle_rescan_progress(state: &mut AppState, current: u64, total: u64) -> UpdateResult {
    if let Some(rescan) = &mut state.environments.rescan {
        rescan.current = current;
        rescan.total = total;
    }
    UpdateResult::none()
}

pub fn handle_rescan_finished(state: &mut AppState, result: RescanResult) -> UpdateResult {
    state.environments.rescan = None;
    match result {
        RescanResult::Done => {
            state.toasts.success("Registry rescan complete");
            UpdateResult::action(UpdateAction::Publish(DataTopic::Images))
        }
        RescanResult::Failed(message) => {
            state.toasts.error("Registry rescan failed", message);
            UpdateResult::none()
        }
        RescanResult::Cancelled => {
            state.toasts.info("Registry rescan cancelled");
            UpdateResult::none()
        }
    }
}
