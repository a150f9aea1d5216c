//! Main update function - handles state transitions (TEA pattern)

use tracing::info;

use crate::message::Message;
use crate::state::{AppState, Phase};

use super::{
    credentials, environments, helpers, keys::handle_key, presets, registries, summary,
    user_settings, users, UpdateResult,
};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Key(key) => {
            if let Some(msg) = handle_key(state, key) {
                UpdateResult::message(msg)
            } else {
                UpdateResult::none()
            }
        }

        Message::Tick => {
            state.toasts.tick();
            UpdateResult::none()
        }

        Message::RequestQuit => {
            state.request_quit();
            UpdateResult::none()
        }

        Message::Quit => {
            state.phase = Phase::Quitting;
            UpdateResult::none()
        }

        Message::ConfirmQuit => {
            state.confirm_quit();
            UpdateResult::none()
        }

        Message::CancelQuit => {
            state.cancel_quit();
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Connection / View-State Gate
        // ─────────────────────────────────────────────────────────
        Message::Navigate(view) => {
            state.view = view;
            state.stale.remove(&view);
            if state.connected {
                helpers::refresh_view(state, view)
            } else {
                // Deferred: ClientConnected re-runs the gate for the
                // current view once the client is ready.
                UpdateResult::none()
            }
        }

        Message::ClientConnected {
            version,
            capabilities,
        } => {
            info!(%version, "client ready");
            state.connected = true;
            state.phase = Phase::Ready;
            state.server_version = version;
            state.caps = capabilities;
            state
                .toasts
                .success(format!("Connected to cluster manager {}", state.server_version));
            helpers::refresh_view(state, state.view)
        }

        Message::ClientConnectFailed { error } => {
            state.toasts.error("Unable to connect", error);
            UpdateResult::none()
        }

        Message::DataChanged(topic) => helpers::handle_data_changed(state, topic),

        Message::RefreshView => helpers::refresh_view(state, state.view),

        // ─────────────────────────────────────────────────────────
        // Grid Navigation
        // ─────────────────────────────────────────────────────────
        Message::GridUp => {
            helpers::handle_grid_nav(state, true);
            UpdateResult::none()
        }
        Message::GridDown => {
            helpers::handle_grid_nav(state, false);
            UpdateResult::none()
        }
        Message::SwitchTab => helpers::handle_switch_tab(state),

        // ─────────────────────────────────────────────────────────
        // Refresh Controller Results
        // ─────────────────────────────────────────────────────────
        Message::RefreshCredentials { is_active } => credentials::handle_refresh(state, is_active),
        Message::CredentialsLoaded {
            is_active,
            policies,
            keypairs,
            main_access_keys,
        } => credentials::handle_loaded(state, is_active, policies, keypairs, main_access_keys),
        Message::CredentialsLoadFailed { is_active, error } => {
            credentials::handle_load_failed(state, is_active, error)
        }

        Message::UsersLoaded { users } => users::handle_loaded(state, users),
        Message::UsersLoadFailed { error } => users::handle_load_failed(state, error),

        Message::ImagesLoaded {
            images,
            allowed_registries,
        } => environments::handle_loaded(state, images, allowed_registries),
        Message::ImagesLoadFailed { error } => environments::handle_load_failed(state, error),

        Message::PresetsLoaded { presets } => presets::handle_loaded(state, presets),
        Message::PresetsLoadFailed { error } => presets::handle_load_failed(state, error),

        Message::RegistriesLoaded {
            registries,
            allowed_registries,
        } => registries::handle_loaded(state, registries, allowed_registries),
        Message::RegistriesLoadFailed { error } => registries::handle_load_failed(state, error),

        Message::SummaryLoaded { counts, usage } => summary::handle_loaded(state, counts, usage),
        Message::SummaryLoadFailed { error } => summary::handle_load_failed(state, error),
        Message::SummaryPollTick => summary::handle_poll_tick(state),

        // ─────────────────────────────────────────────────────────
        // Dialogs
        // ─────────────────────────────────────────────────────────
        Message::OpenCreateDialog
        | Message::OpenEditDialog
        | Message::OpenDeleteConfirm
        | Message::OpenRegenerateConfirm
        | Message::DialogChar(_)
        | Message::DialogBackspace
        | Message::DialogNextField
        | Message::DialogPrevField
        | Message::DialogToggle
        | Message::DialogCycleNext
        | Message::DialogCyclePrev
        | Message::DialogSubmit
        | Message::DialogCancel => helpers::route_dialog_message(state, message),

        // ─────────────────────────────────────────────────────────
        // Confirmation Dialog
        // ─────────────────────────────────────────────────────────
        Message::ConfirmNext => {
            if let Some(confirm) = &mut state.confirm {
                confirm.select_next();
            }
            UpdateResult::none()
        }
        Message::ConfirmPrev => {
            if let Some(confirm) = &mut state.confirm {
                confirm.select_prev();
            }
            UpdateResult::none()
        }
        Message::ConfirmAccept => {
            match state.confirm.as_ref().and_then(|c| c.accept()) {
                Some(msg) => UpdateResult::message(msg),
                None => UpdateResult::none(),
            }
        }
        Message::CloseConfirm => {
            state.confirm = None;
            UpdateResult::none()
        }

        Message::DeleteKeypairConfirmed { access_key } => {
            credentials::handle_delete_confirmed(state, access_key)
        }
        Message::RegenerateKeypairConfirmed { access_key } => {
            credentials::handle_regenerate_confirmed(state, access_key)
        }
        Message::RateLimitConfirmed => credentials::handle_rate_limit_confirmed(state),
        Message::DeleteUserConfirmed { email } => users::handle_delete_confirmed(state, email),
        Message::DeletePresetConfirmed { name } => presets::handle_delete_confirmed(state, name),
        Message::DeleteRegistryConfirmed { hostname } => {
            registries::handle_delete_confirmed(state, hostname)
        }

        // ─────────────────────────────────────────────────────────
        // Action Results
        // ─────────────────────────────────────────────────────────
        Message::KeypairCreated { outcome } => credentials::handle_created(state, outcome),
        Message::KeypairModified {
            access_key,
            outcome,
        } => credentials::handle_modified(state, access_key, outcome),
        Message::KeypairDeleted {
            access_key,
            outcome,
        } => credentials::handle_deleted(state, access_key, outcome),
        Message::KeypairRegenerated {
            access_key,
            outcome,
        } => credentials::handle_regenerated(state, access_key, outcome),

        Message::UserCreated { outcome } => users::handle_created(state, outcome),
        Message::UserModified { email, outcome } => users::handle_modified(state, email, outcome),
        Message::UserDeleted { email, outcome } => users::handle_deleted(state, email, outcome),

        Message::PresetCreated { outcome } => presets::handle_created(state, outcome),
        Message::PresetModified { name, outcome } => presets::handle_modified(state, name, outcome),
        Message::PresetDeleted { name, outcome } => presets::handle_deleted(state, name, outcome),

        Message::RegistrySaved { hostname, outcome } => {
            registries::handle_saved(state, hostname, outcome)
        }
        Message::RegistryDeleted { hostname, outcome } => {
            registries::handle_deleted(state, hostname, outcome)
        }
        Message::RegistryEnablementChanged {
            hostname,
            enabled,
            outcome,
        } => registries::handle_enablement_changed(state, hostname, enabled, outcome),
        Message::ToggleRegistryEnabled => registries::handle_toggle_enabled(state),

        Message::ImageLimitsModified { reference, outcome } => {
            environments::handle_limits_modified(state, reference, outcome)
        }

        Message::PasswordChanged { outcome } => user_settings::handle_password_changed(state, outcome),
        Message::PreferencesSaved { error } => user_settings::handle_preferences_saved(state, error),
        Message::ToggleMasking => user_settings::handle_toggle_masking(state),

        // ─────────────────────────────────────────────────────────
        // Registry Rescan
        // ─────────────────────────────────────────────────────────
        Message::RescanRegistry => environments::handle_rescan_requested(state),
        Message::RescanStarted { task_id } => environments::handle_rescan_started(state, task_id),
        Message::RescanStartFailed { error } => {
            environments::handle_rescan_start_failed(state, error)
        }
        Message::RescanProgress { current, total } => {
            environments::handle_rescan_progress(state, current, total)
        }
        Message::RescanFinished { result } => environments::handle_rescan_finished(state, result),
    }
}
