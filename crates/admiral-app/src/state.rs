//! Application state (Model in TEA pattern)

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use admiral_core::{
    CapabilitySet, ClusterUsage, ImageRow, KeypairRow, ListCondition, RegistryRow, ResourcePolicy,
    ResourcePreset, SessionCounts, UserRow,
};

use crate::config::Settings;
use crate::confirm_dialog::ConfirmDialogState;
use crate::dialogs::{CredentialDialog, ImageLimitsForm, PresetForm, RegistryForm, UserDialog};
use crate::forms::TextField;
use crate::toast::ToastStack;

/// Application lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for the connect task to report readiness
    #[default]
    Connecting,
    Ready,
    Quitting,
}

/// Top-level views, one per navigation slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Summary,
    Credentials,
    Users,
    Environments,
    Presets,
    Registries,
    UserSettings,
}

impl View {
    /// Navigation order, matching the number-key shortcuts 1-7.
    pub const ALL: [View; 7] = [
        View::Summary,
        View::Credentials,
        View::Users,
        View::Environments,
        View::Presets,
        View::Registries,
        View::UserSettings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            View::Summary => "Summary",
            View::Credentials => "Credentials",
            View::Users => "Users",
            View::Environments => "Environments",
            View::Presets => "Presets",
            View::Registries => "Registries",
            View::UserSettings => "Settings",
        }
    }
}

/// A scrollable table of rows plus its load condition.
#[derive(Debug, Clone)]
pub struct GridState<T> {
    pub rows: Vec<T>,
    pub condition: ListCondition,
    pub selected: usize,
}

impl<T> Default for GridState<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            condition: ListCondition::Loading,
            selected: 0,
        }
    }
}

impl<T> GridState<T> {
    pub fn set_loading(&mut self) {
        self.condition = ListCondition::Loading;
    }

    /// Install refreshed rows; empty collections show the no-data state.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.condition = if rows.is_empty() {
            ListCondition::NoData
        } else {
            ListCondition::Loaded
        };
        self.rows = rows;
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
    }

    /// A refresh failed: clear the loading indicator, keep existing rows.
    pub fn fail(&mut self) {
        self.condition = if self.rows.is_empty() {
            ListCondition::NoData
        } else {
            ListCondition::Loaded
        };
    }

    pub fn select_next(&mut self) {
        if !self.rows.is_empty() && self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_row(&self) -> Option<&T> {
        self.rows.get(self.selected)
    }
}

// ─────────────────────────────────────────────────────────────────
// Per-view state
// ─────────────────────────────────────────────────────────────────

/// Which credential grid has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialTab {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Default)]
pub struct CredentialsViewState {
    pub tab: CredentialTab,
    pub active: GridState<KeypairRow>,
    pub inactive: GridState<KeypairRow>,
    /// Policy mapping fetched alongside keypairs; keypair rows resolve
    /// their resource totals against this by name.
    pub policies: HashMap<String, ResourcePolicy>,
    pub dialog: Option<CredentialDialog>,
}

impl CredentialsViewState {
    pub fn grid(&self, is_active: bool) -> &GridState<KeypairRow> {
        if is_active {
            &self.active
        } else {
            &self.inactive
        }
    }

    pub fn grid_mut(&mut self, is_active: bool) -> &mut GridState<KeypairRow> {
        if is_active {
            &mut self.active
        } else {
            &mut self.inactive
        }
    }

    pub fn focused_grid(&self) -> &GridState<KeypairRow> {
        self.grid(self.tab == CredentialTab::Active)
    }

    pub fn focused_grid_mut(&mut self) -> &mut GridState<KeypairRow> {
        self.grid_mut(self.tab == CredentialTab::Active)
    }
}

/// Which user grid has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserTab {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Default)]
pub struct UsersViewState {
    pub tab: UserTab,
    pub grid: GridState<UserRow>,
    pub dialog: Option<UserDialog>,
}

/// Progress of an in-flight registry rescan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RescanState {
    pub task_id: String,
    pub current: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentsViewState {
    pub grid: GridState<ImageRow>,
    pub allowed_registries: HashSet<String>,
    pub rescan: Option<RescanState>,
    pub dialog: Option<ImageLimitsForm>,
}

#[derive(Debug, Clone, Default)]
pub struct PresetsViewState {
    pub grid: GridState<ResourcePreset>,
    pub dialog: Option<PresetForm>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistriesViewState {
    pub grid: GridState<RegistryRow>,
    pub dialog: Option<RegistryForm>,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryViewState {
    pub condition: ListCondition,
    pub counts: Option<SessionCounts>,
    pub usage: Option<ClusterUsage>,
    pub last_refreshed: Option<DateTime<Utc>>,
}

/// Focus rows of the user-settings form view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsFocus {
    #[default]
    CurrentPassword,
    NewPassword,
    ConfirmPassword,
    ChangePasswordButton,
    PreferredPort,
    SavePortButton,
    MaskingToggle,
}

impl SettingsFocus {
    pub const ORDER: [SettingsFocus; 7] = [
        SettingsFocus::CurrentPassword,
        SettingsFocus::NewPassword,
        SettingsFocus::ConfirmPassword,
        SettingsFocus::ChangePasswordButton,
        SettingsFocus::PreferredPort,
        SettingsFocus::SavePortButton,
        SettingsFocus::MaskingToggle,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserSettingsViewState {
    pub focus: SettingsFocus,
    pub current_password: TextField,
    pub new_password: TextField,
    pub confirm_password: TextField,
    pub preferred_port: TextField,
    pub changing_password: bool,
}

// ─────────────────────────────────────────────────────────────────
// AppState
// ─────────────────────────────────────────────────────────────────

/// The whole application model. Mutated only inside `update()`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub phase: Phase,
    pub view: View,
    pub connected: bool,
    pub server_version: String,
    pub caps: CapabilitySet,
    /// Views whose data changed while they were inactive; refreshed on
    /// their next activation.
    pub stale: HashSet<View>,

    pub credentials: CredentialsViewState,
    pub users: UsersViewState,
    pub environments: EnvironmentsViewState,
    pub presets: PresetsViewState,
    pub registries: RegistriesViewState,
    pub summary: SummaryViewState,
    pub user_settings: UserSettingsViewState,

    pub toasts: ToastStack,
    pub confirm: Option<ConfirmDialogState>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let mut user_settings = UserSettingsViewState::default();
        user_settings.preferred_port = TextField::new(settings.ui.preferred_port.to_string());
        Self {
            phase: Phase::Connecting,
            view: View::Summary,
            connected: false,
            server_version: String::new(),
            caps: CapabilitySet::default(),
            stale: HashSet::new(),
            credentials: CredentialsViewState::default(),
            users: UsersViewState::default(),
            environments: EnvironmentsViewState::default(),
            presets: PresetsViewState::default(),
            registries: RegistriesViewState::default(),
            summary: SummaryViewState::default(),
            user_settings,
            toasts: ToastStack::default(),
            confirm: None,
            settings,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.phase == Phase::Quitting
    }

    pub fn request_quit(&mut self) {
        if self.settings.ui.confirm_quit {
            self.confirm = Some(ConfirmDialogState::quit_confirmation());
        } else {
            self.phase = Phase::Quitting;
        }
    }

    pub fn confirm_quit(&mut self) {
        self.confirm = None;
        self.phase = Phase::Quitting;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm = None;
    }

    /// Whether a create/edit dialog is open on the current view.
    pub fn in_dialog(&self) -> bool {
        match self.view {
            View::Credentials => self.credentials.dialog.is_some(),
            View::Users => self.users.dialog.is_some(),
            View::Environments => self.environments.dialog.is_some(),
            View::Presets => self.presets.dialog.is_some(),
            View::Registries => self.registries.dialog.is_some(),
            View::Summary | View::UserSettings => false,
        }
    }

    /// Whether masking of sensitive fields is enabled.
    pub fn masking_enabled(&self) -> bool {
        self.settings.ui.mask_sensitive
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
