//! The `ClusterApi` trait - the contract every view talks to
//!
//! Reads resolve to already-typed view models; mutations resolve to a
//! uniform [`MutationOutcome`]. Transport-level failures surface as
//! `Error::Transport`, server-reported failures as `Error::Api`; the
//! caller treats both as terminal and tells the user.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use admiral_core::prelude::*;
use admiral_core::{
    CapabilitySet, ClusterUsage, ImageRow, KeypairRow, RegistryKind, RegistryRow, ResourceLimit,
    ResourcePolicy, ResourcePreset, SessionCounts, UserRow, UserStatus,
};

use crate::bgtask::BgTaskStream;
use crate::protocol::MutationOutcome;

/// Partial-update payload: only the fields that actually changed.
///
/// Built by the action handlers' diff step; an empty patch never reaches
/// the client.
pub type JsonPatch = serde_json::Map<String, serde_json::Value>;

/// API credentials for the cluster manager.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

/// Session info returned by a successful connect.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectInfo {
    /// Server version string, display only
    pub version: String,
    /// Role flags and feature capabilities, resolved once per connection
    pub capabilities: CapabilitySet,
}

/// Payload for keypair creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypairCreate {
    pub user_id: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub resource_policy: String,
    pub rate_limit: u32,
}

/// Payload for user creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: admiral_core::UserRole,
}

/// Payload for resource preset create/modify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetPayload {
    pub name: String,
    pub resource_slots: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_memory: Option<u64>,
}

/// Payload for registry create/modify. Keyed by hostname.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryPayload {
    pub hostname: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "type")]
    pub kind: RegistryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// The cluster manager API surface the console consumes.
///
/// Implementations must be safe to share behind `Arc` across the spawned
/// refresh and action tasks.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Establish the session and resolve capabilities. Called once by the
    /// engine at startup; the readiness transition is broadcast to views
    /// as a one-shot message.
    async fn connect(&self) -> Result<ConnectInfo>;

    // ─────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────

    async fn list_resource_policies(&self) -> Result<Vec<ResourcePolicy>>;

    /// Keypairs filtered by active flag, matching the active/inactive grids.
    async fn list_keypairs(&self, is_active: bool) -> Result<Vec<KeypairRow>>;

    /// Map of user email to designated main access key.
    /// Only called when the `MainAccessKey` capability is present.
    async fn list_main_access_keys(&self) -> Result<HashMap<String, String>>;

    async fn list_users(&self, statuses: &[UserStatus]) -> Result<Vec<UserRow>>;

    /// The domain's `allowed_docker_registries` set.
    async fn get_allowed_registries(&self) -> Result<HashSet<String>>;

    async fn list_images(&self) -> Result<Vec<ImageRow>>;

    async fn list_presets(&self) -> Result<Vec<ResourcePreset>>;

    /// Registry entries; `enabled` is left false and merged from
    /// [`ClusterApi::get_allowed_registries`] by the view.
    async fn list_registries(&self) -> Result<Vec<RegistryRow>>;

    async fn fetch_session_counts(&self) -> Result<SessionCounts>;

    async fn fetch_cluster_usage(&self) -> Result<ClusterUsage>;

    // ─────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────

    async fn create_keypair(&self, req: &KeypairCreate) -> Result<MutationOutcome>;

    async fn modify_keypair(&self, access_key: &str, patch: &JsonPatch) -> Result<MutationOutcome>;

    async fn delete_keypair(&self, access_key: &str) -> Result<MutationOutcome>;

    /// Server-side secret rotation; the new secret arrives on the next
    /// credential refresh.
    async fn regenerate_keypair(&self, access_key: &str) -> Result<MutationOutcome>;

    async fn create_user(&self, req: &UserCreate) -> Result<MutationOutcome>;

    async fn modify_user(&self, email: &str, patch: &JsonPatch) -> Result<MutationOutcome>;

    async fn delete_user(&self, email: &str) -> Result<MutationOutcome>;

    async fn create_preset(&self, req: &PresetPayload) -> Result<MutationOutcome>;

    async fn modify_preset(&self, name: &str, patch: &JsonPatch) -> Result<MutationOutcome>;

    async fn delete_preset(&self, name: &str) -> Result<MutationOutcome>;

    /// Create or replace a registry entry (hostname-keyed upsert).
    async fn set_registry(&self, req: &RegistryPayload) -> Result<MutationOutcome>;

    async fn delete_registry(&self, hostname: &str) -> Result<MutationOutcome>;

    /// Toggle membership in `allowed_docker_registries`, independent of the
    /// entry's existence.
    async fn set_registry_enabled(&self, hostname: &str, enabled: bool)
        -> Result<MutationOutcome>;

    /// Replace the minimum resource limits of one image.
    async fn modify_image_resource_limits(
        &self,
        reference: &str,
        limits: &[ResourceLimit],
    ) -> Result<MutationOutcome>;

    async fn change_password(&self, current: &str, new: &str) -> Result<MutationOutcome>;

    /// Kick off a registry rescan; returns the background task id.
    async fn rescan_images(&self, registry: &str) -> Result<String>;

    /// Attach to a background task's progress event stream.
    async fn attach_background_task(&self, task_id: &str) -> Result<BgTaskStream>;
}
