//! Tests for handler module

use std::collections::HashMap;

use admiral_client::test_utils::{test_keypair, test_policy, test_registry, test_user};
use admiral_client::MutationOutcome;
use admiral_core::{Capability, CapabilitySet, DataTopic, ListCondition, RegistryKind};

use super::{update, UpdateAction, UpdateResult};
use crate::dialogs::{CredentialDialog, KeypairEditForm, PresetForm, RegistryForm};
use crate::forms::TextField;
use crate::message::Message;
use crate::state::{AppState, Phase, View};
use crate::toast::ToastSeverity;

fn connected_state() -> AppState {
    let mut state = AppState::default();
    state.connected = true;
    state.phase = Phase::Ready;
    state.caps = CapabilitySet::resolve(true, true, ["main-access-key", "2fa"]);
    state
}

fn action_of(result: UpdateResult) -> UpdateAction {
    result.action.expect("expected an action")
}

// ─────────────────────────────────────────────────────────────────
// Quit flow
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_quit_message_sets_quitting_phase() {
    let mut state = AppState::default();
    assert_ne!(state.phase, Phase::Quitting);

    update(&mut state, Message::Quit);

    assert_eq!(state.phase, Phase::Quitting);
    assert!(state.should_quit());
}

#[test]
fn test_request_quit_opens_confirmation_then_confirm_quits() {
    let mut state = AppState::default();
    update(&mut state, Message::RequestQuit);
    assert!(state.confirm.is_some());

    update(&mut state, Message::ConfirmQuit);
    assert!(state.should_quit());
    assert!(state.confirm.is_none());
}

// ─────────────────────────────────────────────────────────────────
// View-state gate
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_navigate_before_connect_defers_refresh() {
    let mut state = AppState::default();
    assert!(!state.connected);

    let result = update(&mut state, Message::Navigate(View::Credentials));
    assert!(result.action.is_none());
    assert_eq!(state.view, View::Credentials);
}

#[test]
fn test_client_connected_refreshes_current_view() {
    let mut state = AppState::default();
    state.view = View::Users;

    let result = update(
        &mut state,
        Message::ClientConnected {
            version: "26.1.0".to_string(),
            capabilities: CapabilitySet::resolve(true, false, ["2fa"]),
        },
    );

    assert!(state.connected);
    assert_eq!(state.phase, Phase::Ready);
    assert!(state.caps.supports(Capability::TwoFactorAuth));
    assert!(matches!(
        action_of(result),
        UpdateAction::FetchUsers { .. }
    ));
}

#[test]
fn test_navigate_while_connected_refreshes_immediately() {
    let mut state = connected_state();
    let result = update(&mut state, Message::Navigate(View::Presets));
    assert!(matches!(action_of(result), UpdateAction::FetchPresets));
    assert_eq!(state.presets.grid.condition, ListCondition::Loading);
}

// ─────────────────────────────────────────────────────────────────
// Credential refresh controller (spec scenarios)
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_active_refresh_requests_only_active_keypairs() {
    let mut state = connected_state();

    let result = update(&mut state, Message::RefreshCredentials { is_active: true });

    assert_eq!(
        state.credentials.active.condition,
        ListCondition::Loading
    );
    match action_of(result) {
        UpdateAction::FetchCredentials {
            is_active,
            include_main_keys,
        } => {
            assert!(is_active);
            assert!(include_main_keys); // capability advertised
        }
        other => panic!("unexpected action: {other:?}"),
    }
}

#[test]
fn test_empty_credential_list_shows_no_data() {
    let mut state = connected_state();
    update(&mut state, Message::RefreshCredentials { is_active: true });

    update(
        &mut state,
        Message::CredentialsLoaded {
            is_active: true,
            policies: vec![],
            keypairs: vec![],
            main_access_keys: None,
        },
    );
    assert_eq!(state.credentials.active.condition, ListCondition::NoData);
}

#[test]
fn test_loaded_credentials_resolve_policy_totals() {
    let mut state = connected_state();

    let mut keypair = test_keypair("AK1", "a@example.com", true);
    keypair.resource_policy = "default".to_string();
    let orphan = {
        let mut kp = test_keypair("AK2", "b@example.com", true);
        kp.resource_policy = "missing-policy".to_string();
        kp
    };

    update(
        &mut state,
        Message::CredentialsLoaded {
            is_active: true,
            policies: vec![test_policy("default")],
            keypairs: vec![keypair, orphan],
            main_access_keys: Some(HashMap::from([(
                "a@example.com".to_string(),
                "AK1".to_string(),
            )])),
        },
    );

    let rows = &state.credentials.active.rows;
    assert_eq!(state.credentials.active.condition, ListCondition::Loaded);
    assert!(rows[0].total_slots.is_some());
    assert_eq!(rows[0].is_main, Some(true));
    // Absent policy name leaves the resource fields unset
    assert!(rows[1].total_slots.is_none());
    assert_eq!(rows[1].is_main, Some(false));
}

#[test]
fn test_refresh_is_idempotent() {
    let mut state = connected_state();
    let load = || Message::CredentialsLoaded {
        is_active: true,
        policies: vec![test_policy("default")],
        keypairs: vec![test_keypair("AK1", "a@example.com", true)],
        main_access_keys: None,
    };

    update(&mut state, load());
    let first = state.credentials.active.rows.clone();
    update(&mut state, load());
    assert_eq!(state.credentials.active.rows, first);
}

#[test]
fn test_load_failure_clears_loading_and_raises_toast() {
    let mut state = connected_state();
    update(&mut state, Message::RefreshCredentials { is_active: true });

    update(
        &mut state,
        Message::CredentialsLoadFailed {
            is_active: true,
            error: "connection refused".to_string(),
        },
    );

    assert_ne!(
        state.credentials.active.condition,
        ListCondition::Loading
    );
    let toast = state.toasts.latest().unwrap();
    assert_eq!(toast.severity, ToastSeverity::Error);
    assert_eq!(toast.text, "Unable to fetch credentials");
    assert_eq!(toast.detail.as_deref(), Some("connection refused"));
}

// ─────────────────────────────────────────────────────────────────
// Diff short-circuit
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_unmodified_edit_short_circuits_without_network() {
    let mut state = connected_state();
    state.view = View::Credentials;
    let row = test_keypair("AK1", "a@example.com", true);
    state.credentials.active.set_rows(vec![row.clone()]);
    state.credentials.dialog = Some(CredentialDialog::Edit(KeypairEditForm::from_row(&row)));

    let result = update(&mut state, Message::DialogSubmit);

    assert!(result.action.is_none());
    assert!(state.credentials.dialog.is_none());
    assert_eq!(state.toasts.latest().unwrap().text, "No changes made");
}

// ─────────────────────────────────────────────────────────────────
// Delete keypair failure (spec scenario)
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_failed_delete_keeps_dialog_and_raises_error() {
    let mut state = connected_state();
    state.view = View::Credentials;
    state.credentials.active.set_rows(vec![test_keypair("AK1", "a@example.com", true)]);
    update(&mut state, Message::OpenDeleteConfirm);
    assert!(state.confirm.is_some());

    let result = update(
        &mut state,
        Message::KeypairDeleted {
            access_key: "AK1".to_string(),
            outcome: MutationOutcome::failed("X"),
        },
    );

    // No refresh is triggered and the delete dialog stays open
    assert!(result.action.is_none());
    assert!(state.confirm.is_some());
    assert!(!state.confirm.as_ref().unwrap().submitting);
    let toast = state.toasts.latest().unwrap();
    assert_eq!(toast.text, "Unable to delete keypair");
    assert_eq!(toast.detail.as_deref(), Some("X"));
}

#[test]
fn test_successful_delete_closes_dialog_and_publishes() {
    let mut state = connected_state();
    state.confirm = Some(crate::confirm_dialog::ConfirmDialogState::delete_keypair(
        "AK1",
    ));

    let result = update(
        &mut state,
        Message::KeypairDeleted {
            access_key: "AK1".to_string(),
            outcome: MutationOutcome::ok(),
        },
    );

    assert!(state.confirm.is_none());
    assert!(matches!(
        action_of(result),
        UpdateAction::Publish(DataTopic::Credentials)
    ));
}

// ─────────────────────────────────────────────────────────────────
// Rate-limit soft threshold (spec scenario)
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_low_rate_limit_requires_confirmation_then_mutates_once() {
    let mut state = connected_state();
    state.view = View::Credentials;
    let row = test_keypair("AK1", "a@example.com", true);
    state.credentials.active.set_rows(vec![row.clone()]);

    let mut form = KeypairEditForm::from_row(&row);
    form.rate_limit = TextField::new("50");
    state.credentials.dialog = Some(CredentialDialog::Edit(form));

    // First submit: confirmation dialog instead of a mutation
    let result = update(&mut state, Message::DialogSubmit);
    assert!(result.action.is_none());
    let confirm = state.confirm.as_ref().expect("confirmation dialog");
    assert!(confirm.message.contains("50"));

    // Accepting dispatches the confirmed message, which mutates exactly once
    let result = update(&mut state, Message::RateLimitConfirmed);
    match action_of(result) {
        UpdateAction::ModifyKeypair { access_key, patch } => {
            assert_eq!(access_key, "AK1");
            assert_eq!(patch.get("rate_limit"), Some(&serde_json::json!(50)));
        }
        other => panic!("unexpected action: {other:?}"),
    }
    assert!(state.confirm.is_none());
}

#[test]
fn test_rate_limit_at_threshold_submits_directly() {
    let mut state = connected_state();
    state.view = View::Credentials;
    let row = test_keypair("AK1", "a@example.com", true);
    let mut form = KeypairEditForm::from_row(&row);
    form.rate_limit = TextField::new("100");
    state.credentials.dialog = Some(CredentialDialog::Edit(form));

    let result = update(&mut state, Message::DialogSubmit);
    assert!(state.confirm.is_none());
    assert!(matches!(
        action_of(result),
        UpdateAction::ModifyKeypair { .. }
    ));
}

// ─────────────────────────────────────────────────────────────────
// Preset shared-memory constraint (spec property)
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_preset_shared_memory_rejected_locally() {
    let mut state = connected_state();
    state.view = View::Presets;
    let mut form = PresetForm::new();
    form.name = TextField::new("big");
    form.cpu = TextField::new("4");
    form.mem = TextField::new("1g");
    form.shared_memory = TextField::new("2g");
    state.presets.dialog = Some(form);

    let result = update(&mut state, Message::DialogSubmit);

    assert!(result.action.is_none());
    assert_eq!(
        state.toasts.latest().unwrap().text,
        "Shared memory too large"
    );
    // Dialog stays open for correction
    assert!(state.presets.dialog.is_some());
}

// ─────────────────────────────────────────────────────────────────
// Registry project requirement (spec scenario)
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_harbor_registry_without_project_blocks_submission() {
    let mut state = connected_state();
    state.view = View::Registries;
    let mut form = RegistryForm::new();
    form.hostname = TextField::new("harbor.example.io");
    form.url = TextField::new("https://harbor.example.io");
    form.kind = RegistryKind::Harbor;
    state.registries.dialog = Some(form);

    let result = update(&mut state, Message::DialogSubmit);

    assert!(result.action.is_none());
    let dialog = state.registries.dialog.as_ref().unwrap();
    assert!(!dialog.project.is_valid());
}

#[test]
fn test_registry_enablement_toggle() {
    let mut state = connected_state();
    state.view = View::Registries;
    let mut row = test_registry("cr.example.io", RegistryKind::Docker);
    row.enabled = true;
    state.registries.grid.set_rows(vec![row]);

    let result = update(&mut state, Message::ToggleRegistryEnabled);
    match action_of(result) {
        UpdateAction::SetRegistryEnabled { hostname, enabled } => {
            assert_eq!(hostname, "cr.example.io");
            assert!(!enabled);
        }
        other => panic!("unexpected action: {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────
// Cross-view staleness
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_data_changed_refreshes_active_view() {
    let mut state = connected_state();
    state.view = View::Credentials;

    let result = update(&mut state, Message::DataChanged(DataTopic::Credentials));
    assert!(matches!(
        action_of(result),
        UpdateAction::FetchCredentials { .. }
    ));
}

#[test]
fn test_data_changed_marks_inactive_views_stale() {
    let mut state = connected_state();
    state.view = View::Summary;

    let result = update(&mut state, Message::DataChanged(DataTopic::Registries));
    assert!(result.action.is_none());
    assert!(state.stale.contains(&View::Registries));
    assert!(state.stale.contains(&View::Environments));

    // Activating a stale view clears the mark and refreshes
    let result = update(&mut state, Message::Navigate(View::Registries));
    assert!(!state.stale.contains(&View::Registries));
    assert!(matches!(action_of(result), UpdateAction::FetchRegistries));
}

// ─────────────────────────────────────────────────────────────────
// Summary polling
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_summary_poll_tick_only_fires_while_active() {
    let mut state = connected_state();
    state.view = View::Summary;
    let result = update(&mut state, Message::SummaryPollTick);
    assert!(matches!(action_of(result), UpdateAction::FetchSummary));

    state.view = View::Users;
    let result = update(&mut state, Message::SummaryPollTick);
    assert!(result.action.is_none());
}

#[test]
fn test_users_tab_switch_refetches_with_other_statuses() {
    let mut state = connected_state();
    state.view = View::Users;
    state.users.grid.set_rows(vec![test_user("a@example.com", "a")]);

    let result = update(&mut state, Message::SwitchTab);
    match action_of(result) {
        UpdateAction::FetchUsers { statuses } => {
            assert!(statuses.contains(&admiral_core::UserStatus::Inactive));
            assert!(!statuses.contains(&admiral_core::UserStatus::Active));
        }
        other => panic!("unexpected action: {other:?}"),
    }
}

#[test]
fn test_users_totp_column_dropped_without_capability() {
    let mut state = connected_state();
    state.caps = CapabilitySet::resolve(true, true, std::iter::empty::<&str>());
    let mut user = test_user("a@example.com", "a");
    user.totp_activated = Some(true);

    update(&mut state, Message::UsersLoaded { users: vec![user] });
    assert_eq!(state.users.grid.rows[0].totp_activated, None);
}
