//! Resource preset view: refresh controller and action handlers
//!
//! The shared-memory constraint (strictly less than total memory) is
//! enforced locally; violating submissions never reach the network.

use admiral_client::MutationOutcome;
use admiral_core::format::parse_mem_size;
use admiral_core::prelude::*;
use admiral_core::{DataTopic, ResourcePreset};

use crate::confirm_dialog::ConfirmDialogState;
use crate::diff::DiffBuilder;
use crate::dialogs::{DialogPhase, PresetForm, PresetValidation};
use crate::message::Message;
use crate::state::AppState;

use super::{UpdateAction, UpdateResult};

pub fn refresh(state: &mut AppState) -> UpdateResult {
    state.presets.grid.set_loading();
    UpdateResult::action(UpdateAction::FetchPresets)
}

pub fn handle_loaded(state: &mut AppState, presets: Vec<ResourcePreset>) -> UpdateResult {
    state.presets.grid.set_rows(presets);
    UpdateResult::none()
}

pub fn handle_load_failed(state: &mut AppState, error: String) -> UpdateResult {
    error!(%error, "preset refresh failed");
    state.presets.grid.fail();
    state.toasts.error("Unable to fetch resource presets", error);
    UpdateResult::none()
}

// ─────────────────────────────────────────────────────────────────
// Dialog
// ─────────────────────────────────────────────────────────────────

pub fn handle_dialog(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::OpenCreateDialog => {
            state.presets.dialog = Some(PresetForm::new());
            UpdateResult::none()
        }
        Message::OpenEditDialog => {
            if let Some(row) = state.presets.grid.selected_row() {
                state.presets.dialog = Some(PresetForm::from_preset(row));
            }
            UpdateResult::none()
        }
        Message::OpenDeleteConfirm => {
            if let Some(row) = state.presets.grid.selected_row() {
                state.confirm = Some(ConfirmDialogState::delete_preset(&row.name));
            }
            UpdateResult::none()
        }
        Message::DialogCancel => {
            state.presets.dialog = None;
            UpdateResult::none()
        }
        Message::DialogSubmit => submit(state),
        other => {
            if let Some(form) = &mut state.presets.dialog {
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
                    Message::DialogNextField => form.focus = (form.focus + 1) % PresetForm::FIELDS,
                    Message::DialogPrevField => {
                        form.focus = (form.focus + PresetForm::FIELDS - 1) % PresetForm::FIELDS
                    }
                    _ => {}
                }
            }
            UpdateResult::none()
        }
    }
}

/// Scalar view of an existing preset for change detection.
fn preset_scalars(preset: &ResourcePreset) -> (Option<f64>, Option<u64>, Option<u64>) {
    let cpu = preset.resource_slots.cpu.as_ref().and_then(|v| v.as_number());
    let mem = preset.resource_slots.mem.as_ref().and_then(|v| match v.as_number() {
        Some(n) => Some(n as u64),
        None => parse_mem_size(&v.display()),
    });
    (cpu, mem, preset.shared_memory)
}

fn submit(state: &mut AppState) -> UpdateResult {
    let Some(form) = &mut state.presets.dialog else {
        return UpdateResult::none();
    };
    let payload = match form.validate() {
        PresetValidation::Invalid => return UpdateResult::none(),
        PresetValidation::SharedMemoryTooLarge => {
            // Rejected locally: the mutation is never sent.
            state.toasts.error(
                "Shared memory too large",
                "Shared memory must be smaller than the preset's total memory",
            );
            return UpdateResult::none();
        }
        PresetValidation::Valid(payload) => payload,
    };

    match &form.original {
        None => {
            form.phase = DialogPhase::Submitting;
            UpdateResult::action(UpdateAction::CreatePreset(payload))
        }
        Some(original) => {
            let (orig_cpu, orig_mem, orig_shared) = preset_scalars(original);
            let new_cpu = payload
                .resource_slots
                .get("cpu")
                .and_then(|v| v.as_f64());
            let new_mem = payload
                .resource_slots
                .get("mem")
                .and_then(|v| v.as_u64());
            let patch = DiffBuilder::new()
                .field("cpu", &new_cpu, &orig_cpu)
                .field("mem", &new_mem, &orig_mem)
                .field("shared_memory", &payload.shared_memory, &orig_shared)
                .build();
            match patch {
                None => {
                    state.presets.dialog = None;
                    state.toasts.info("No changes made");
                    UpdateResult::none()
                }
                Some(_) => {
                    // The server replaces the whole slot bundle, so the
                    // diff only gates whether a request goes out at all.
                    let name = original.name.clone();
                    let mut patch = admiral_client::JsonPatch::new();
                    patch.insert(
                        "resource_slots".to_string(),
                        serde_json::Value::Object(payload.resource_slots.clone()),
                    );
                    if let Some(shared) = payload.shared_memory {
                        patch.insert("shared_memory".to_string(), serde_json::json!(shared));
                    }
                    form.phase = DialogPhase::Submitting;
                    UpdateResult::action(UpdateAction::ModifyPreset { name, patch })
                }
            }
        }
    }
}

pub fn handle_delete_confirmed(state: &mut AppState, name: String) -> UpdateResult {
    if let Some(confirm) = &mut state.confirm {
        confirm.submitting = true;
    }
    UpdateResult::action(UpdateAction::DeletePreset { name })
}

// ─────────────────────────────────────────────────────────────────
// Mutation results
// ─────────────────────────────────────────────────────────────────

pub fn handle_created(state: &mut AppState, outcome: MutationOutcome) -> UpdateResult {
    if outcome.ok {
        state.presets.dialog = None;
        state.toasts.success("Resource preset created");
        UpdateResult::action(UpdateAction::Publish(DataTopic::Presets))
    } else {
        if let Some(form) = &mut state.presets.dialog {
            form.phase = DialogPhase::Open;
        }
        state
            .toasts
            .error("Unable to create preset", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

pub fn handle_modified(
    state: &mut AppState,
    name: String,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        state.presets.dialog = None;
        state.toasts.success(format!("Preset {name} updated"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Presets))
    } else {
        if let Some(form) = &mut state.presets.dialog {
            form.phase = DialogPhase::Open;
        }
        state
            .toasts
            .error("Unable to update preset", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}

pub fn handle_deleted(
    state: &mut AppState,
    name: String,
    outcome: MutationOutcome,
) -> UpdateResult {
    if outcome.ok {
        state.confirm = None;
        state.toasts.success(format!("Preset {name} deleted"));
        UpdateResult::action(UpdateAction::Publish(DataTopic::Presets))
    } else {
        if let Some(confirm) = &mut state.confirm {
            confirm.submitting = false;
        }
        state
            .toasts
            .error("Unable to delete preset", outcome.msg.unwrap_or_default());
        UpdateResult::none()
    }
}
