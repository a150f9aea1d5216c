//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `keys`: Key event handlers per UI mode
//! - `helpers`: View refresh dispatch and cross-view staleness
//! - `credentials`, `users`, `environments`, `presets`, `registries`,
//!   `summary`, `user_settings`: per-view refresh controllers and action
//!   handlers

pub(crate) mod credentials;
pub(crate) mod environments;
pub(crate) mod helpers;
pub(crate) mod keys;
pub(crate) mod presets;
pub(crate) mod registries;
pub(crate) mod summary;
pub(crate) mod update;
pub(crate) mod user_settings;
pub(crate) mod users;

#[cfg(test)]
mod tests;

use admiral_client::{JsonPatch, KeypairCreate, PresetPayload, RegistryPayload, UserCreate};
use admiral_core::{DataTopic, ResourceLimit, UserStatus};

use crate::config::Settings;
use crate::message::Message;

// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone)]
pub enum UpdateAction {
    /// Establish the API session (retries internally until it succeeds)
    Connect,

    /// Refresh one credential grid: resource policies, then keypairs,
    /// then (when supported) the main-access-key map
    FetchCredentials {
        is_active: bool,
        include_main_keys: bool,
    },

    FetchUsers { statuses: Vec<UserStatus> },

    /// Domain's allowed registries, then the image list
    FetchImages,

    FetchPresets,

    /// Registry entries plus the allowed set for enablement merging
    FetchRegistries,

    /// Session counts plus cluster resource aggregation
    FetchSummary,

    CreateKeypair(KeypairCreate),
    ModifyKeypair { access_key: String, patch: JsonPatch },
    DeleteKeypair { access_key: String },
    RegenerateKeypair { access_key: String },

    CreateUser(Box<UserCreate>),
    ModifyUser { email: String, patch: JsonPatch },
    DeleteUser { email: String },

    CreatePreset(PresetPayload),
    ModifyPreset { name: String, patch: JsonPatch },
    DeletePreset { name: String },

    SetRegistry(Box<RegistryPayload>),
    DeleteRegistry { hostname: String },
    SetRegistryEnabled { hostname: String, enabled: bool },

    ModifyImageLimits {
        reference: String,
        limits: Vec<ResourceLimit>,
    },

    ChangePassword { current: String, new: String },

    /// Start a rescan and forward its background-task events
    RescanImages { registry: String },

    /// Broadcast a data-change topic to sibling views
    Publish(DataTopic),

    /// Persist UI preferences to the config file
    SavePreferences { settings: Settings },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    pub fn both(msg: Message, action: UpdateAction) -> Self {
        Self {
            message: Some(msg),
            action: Some(action),
        }
    }
}
