//! Shared handler plumbing: refresh dispatch, cross-view staleness,
//! grid navigation, and dialog message routing.

use admiral_core::DataTopic;

use crate::message::Message;
use crate::state::{AppState, CredentialTab, UserTab, View};

use super::{
    credentials, environments, presets, registries, summary, user_settings, users, UpdateResult,
};

/// Run the refresh controller of the given view.
pub fn refresh_view(state: &mut AppState, view: View) -> UpdateResult {
    match view {
        View::Summary => summary::refresh(state),
        View::Credentials => credentials::refresh_both(state),
        View::Users => users::refresh(state),
        View::Environments => environments::refresh(state),
        View::Presets => presets::refresh(state),
        View::Registries => registries::refresh(state),
        // The settings form holds no server data
        View::UserSettings => UpdateResult::none(),
    }
}

/// Views whose data depends on a topic.
fn affected_views(topic: DataTopic) -> &'static [View] {
    match topic {
        DataTopic::Credentials => &[View::Credentials],
        DataTopic::Users => &[View::Users],
        DataTopic::Images => &[View::Environments],
        DataTopic::Presets => &[View::Presets],
        // Enablement changes alter which images pass the allowed filter
        DataTopic::Registries => &[View::Registries, View::Environments],
        DataTopic::Policies => &[View::Credentials],
    }
}

/// A mutation elsewhere changed data: refresh the current view if it is
/// affected, mark the others stale so their next activation refreshes.
pub fn handle_data_changed(state: &mut AppState, topic: DataTopic) -> UpdateResult {
    let mut result = UpdateResult::none();
    for view in affected_views(topic) {
        if *view == state.view {
            result = refresh_view(state, *view);
        } else {
            state.stale.insert(*view);
        }
    }
    result
}

/// Up/down selection on the focused grid of the current view.
pub fn handle_grid_nav(state: &mut AppState, up: bool) {
    match state.view {
        View::Credentials => {
            let grid = state.credentials.focused_grid_mut();
            if up {
                grid.select_prev();
            } else {
                grid.select_next();
            }
        }
        View::Users => {
            if up {
                state.users.grid.select_prev();
            } else {
                state.users.grid.select_next();
            }
        }
        View::Environments => {
            if up {
                state.environments.grid.select_prev();
            } else {
                state.environments.grid.select_next();
            }
        }
        View::Presets => {
            if up {
                state.presets.grid.select_prev();
            } else {
                state.presets.grid.select_next();
            }
        }
        View::Registries => {
            if up {
                state.registries.grid.select_prev();
            } else {
                state.registries.grid.select_next();
            }
        }
        View::Summary | View::UserSettings => {}
    }
}

/// Tab switches between the active/inactive splits where a view has them.
pub fn handle_switch_tab(state: &mut AppState) -> UpdateResult {
    match state.view {
        View::Credentials => {
            state.credentials.tab = match state.credentials.tab {
                CredentialTab::Active => CredentialTab::Inactive,
                CredentialTab::Inactive => CredentialTab::Active,
            };
            UpdateResult::none()
        }
        View::Users => {
            state.users.tab = match state.users.tab {
                UserTab::Active => UserTab::Inactive,
                UserTab::Inactive => UserTab::Active,
            };
            // The user grid is status-filtered server-side, so switching
            // tabs re-runs the refresh with the other status set.
            users::refresh(state)
        }
        _ => UpdateResult::none(),
    }
}

/// Route generic dialog input to whichever view owns the open dialog.
pub fn route_dialog_message(state: &mut AppState, message: Message) -> UpdateResult {
    match state.view {
        View::Credentials => credentials::handle_dialog(state, message),
        View::Users => users::handle_dialog(state, message),
        View::Environments => environments::handle_dialog(state, message),
        View::Presets => presets::handle_dialog(state, message),
        View::Registries => registries::handle_dialog(state, message),
        View::UserSettings => user_settings::handle_input(state, message),
        View::Summary => UpdateResult::none(),
    }
}
