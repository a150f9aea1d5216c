//! Message types for the application (TEA pattern)

use std::collections::{HashMap, HashSet};

use admiral_client::MutationOutcome;
use admiral_core::{
    CapabilitySet, ClusterUsage, DataTopic, ImageRow, KeypairRow, ResourcePolicy, ResourcePreset,
    RegistryRow, SessionCounts, UserRow,
};

use crate::input_key::InputKey;
use crate::state::View;

/// Outcome of a registry rescan background task.
#[derive(Debug, Clone, PartialEq)]
pub enum RescanResult {
    Done,
    Failed(String),
    Cancelled,
}

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    /// Keyboard event from terminal
    Key(InputKey),

    /// Tick event for periodic updates (toast expiry)
    Tick,

    /// Request to quit (may show confirmation dialog)
    RequestQuit,

    /// Force quit without confirmation (Ctrl+C)
    Quit,

    /// Confirm quit from confirmation dialog
    ConfirmQuit,

    /// Cancel quit from confirmation dialog
    CancelQuit,

    // ─────────────────────────────────────────────────────────
    // Connection / View-State Gate
    // ─────────────────────────────────────────────────────────
    /// Switch to a view. Refresh runs immediately when connected,
    /// otherwise it is deferred until `ClientConnected` arrives.
    Navigate(View),

    /// One-shot readiness notification from the connect task
    ClientConnected {
        version: String,
        capabilities: CapabilitySet,
    },

    /// Connect attempt failed; the connect task retries on its own
    ClientConnectFailed { error: String },

    /// A mutation elsewhere changed data this view may be showing
    DataChanged(DataTopic),

    /// Refresh the currently active view ('r' key)
    RefreshView,

    // ─────────────────────────────────────────────────────────
    // Grid Navigation
    // ─────────────────────────────────────────────────────────
    GridUp,
    GridDown,
    /// Toggle the active/inactive tab on credential and user views
    SwitchTab,

    // ─────────────────────────────────────────────────────────
    // Refresh Controller Results
    // ─────────────────────────────────────────────────────────
    /// Refresh one credential grid (active or inactive keypairs)
    RefreshCredentials { is_active: bool },

    CredentialsLoaded {
        is_active: bool,
        policies: Vec<ResourcePolicy>,
        keypairs: Vec<KeypairRow>,
        /// Present only when the server supports main-access-key
        main_access_keys: Option<HashMap<String, String>>,
    },
    CredentialsLoadFailed { is_active: bool, error: String },

    UsersLoaded { users: Vec<UserRow> },
    UsersLoadFailed { error: String },

    ImagesLoaded {
        images: Vec<ImageRow>,
        allowed_registries: HashSet<String>,
    },
    ImagesLoadFailed { error: String },

    PresetsLoaded { presets: Vec<ResourcePreset> },
    PresetsLoadFailed { error: String },

    RegistriesLoaded {
        registries: Vec<RegistryRow>,
        allowed_registries: HashSet<String>,
    },
    RegistriesLoadFailed { error: String },

    SummaryLoaded {
        counts: SessionCounts,
        usage: ClusterUsage,
    },
    SummaryLoadFailed { error: String },

    /// Fired by the periodic task while the summary view is active
    SummaryPollTick,

    // ─────────────────────────────────────────────────────────
    // Dialog / Form Input
    // ─────────────────────────────────────────────────────────
    /// Open the create dialog for the current view
    OpenCreateDialog,
    /// Open the edit dialog seeded from the selected row
    OpenEditDialog,
    /// Open the delete confirmation for the selected row
    OpenDeleteConfirm,
    /// Open the secret-regeneration confirmation (credentials view)
    OpenRegenerateConfirm,

    DialogChar(char),
    DialogBackspace,
    DialogNextField,
    DialogPrevField,
    /// Toggle a boolean field (space)
    DialogToggle,
    /// Cycle an enum field forward/backward (left/right arrows)
    DialogCycleNext,
    DialogCyclePrev,
    DialogSubmit,
    DialogCancel,

    // ─────────────────────────────────────────────────────────
    // Confirmation Dialog
    // ─────────────────────────────────────────────────────────
    ConfirmNext,
    ConfirmPrev,
    /// Dispatch the selected option's message
    ConfirmAccept,
    /// Close the confirmation dialog without acting
    CloseConfirm,

    DeleteKeypairConfirmed { access_key: String },
    RegenerateKeypairConfirmed { access_key: String },
    /// The below-threshold rate limit was explicitly acknowledged
    RateLimitConfirmed,
    DeleteUserConfirmed { email: String },
    DeletePresetConfirmed { name: String },
    DeleteRegistryConfirmed { hostname: String },

    // ─────────────────────────────────────────────────────────
    // Action Results
    // ─────────────────────────────────────────────────────────
    KeypairCreated { outcome: MutationOutcome },
    KeypairModified {
        access_key: String,
        outcome: MutationOutcome,
    },
    KeypairDeleted {
        access_key: String,
        outcome: MutationOutcome,
    },
    KeypairRegenerated {
        access_key: String,
        outcome: MutationOutcome,
    },

    UserCreated { outcome: MutationOutcome },
    UserModified {
        email: String,
        outcome: MutationOutcome,
    },
    UserDeleted {
        email: String,
        outcome: MutationOutcome,
    },

    PresetCreated { outcome: MutationOutcome },
    PresetModified {
        name: String,
        outcome: MutationOutcome,
    },
    PresetDeleted {
        name: String,
        outcome: MutationOutcome,
    },

    RegistrySaved {
        hostname: String,
        outcome: MutationOutcome,
    },
    RegistryDeleted {
        hostname: String,
        outcome: MutationOutcome,
    },
    RegistryEnablementChanged {
        hostname: String,
        enabled: bool,
        outcome: MutationOutcome,
    },

    ImageLimitsModified {
        reference: String,
        outcome: MutationOutcome,
    },

    PasswordChanged { outcome: MutationOutcome },

    /// UI preferences were written to disk (or failed to)
    PreferencesSaved { error: Option<String> },

    // ─────────────────────────────────────────────────────────
    // Registry Rescan (background task)
    // ─────────────────────────────────────────────────────────
    /// Start a rescan of the selected row's registry ('s' key)
    RescanRegistry,
    RescanStarted { task_id: String },
    RescanStartFailed { error: String },
    RescanProgress { current: u64, total: u64 },
    RescanFinished { result: RescanResult },

    // ─────────────────────────────────────────────────────────
    // User Settings
    // ─────────────────────────────────────────────────────────
    /// Flip sensitive-field masking and persist the preference
    ToggleMasking,

    /// Toggle `allowed_docker_registries` membership for the selected
    /// registry ('t' key on the registries view)
    ToggleRegistryEnabled,
}
