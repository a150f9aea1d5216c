//! Domain view-model types
//!
//! Every struct here is derived from an API response and lives only until
//! the next refresh. The cluster manager owns the canonical records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slot::{ResourceSlots, SlotValue};

/// Load state of a list view.
///
/// `Loading` is set by the refresh controller before its first call,
/// `NoData` when the merged collection came back empty, `Loaded` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListCondition {
    #[default]
    Loading,
    NoData,
    Loaded,
}

// ─────────────────────────────────────────────────────────────────
// Credentials (keypairs)
// ─────────────────────────────────────────────────────────────────

/// A credential (keypair) row.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypairRow {
    /// Owning user id (email)
    pub user_id: String,
    pub access_key: String,
    pub secret_key: String,
    pub is_active: bool,
    pub is_admin: bool,
    /// Name of the attached resource policy
    pub resource_policy: String,
    pub rate_limit: u32,
    pub num_queries: u64,
    pub concurrency_used: u32,
    pub created_at: DateTime<Utc>,
    /// Whether this is the user's main access key. `None` when the server
    /// does not support main-access-key designation.
    pub is_main: Option<bool>,
    /// Slot totals resolved by looking up `resource_policy` in the policy
    /// mapping fetched alongside the keypair list. Stays `None` when the
    /// policy name is absent from that mapping.
    pub total_slots: Option<ResourceSlots>,
    /// Concurrency limit from the resolved policy, `None` when unresolved.
    pub max_concurrent_sessions: Option<SlotValue>,
}

impl KeypairRow {
    /// Age of the keypair in whole days.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> i64 {
        crate::format::elapsed_days(self.created_at, now)
    }
}

/// A resource policy: name-keyed bundle of slot and vfolder limits.
///
/// Never patched in place; the owning view re-fetches the whole mapping
/// after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePolicy {
    pub name: String,
    pub total_resource_slots: ResourceSlots,
    pub max_concurrent_sessions: SlotValue,
    pub max_containers_per_session: SlotValue,
    pub idle_timeout: SlotValue,
    pub max_vfolder_count: SlotValue,
    pub max_vfolder_size: SlotValue,
    pub allowed_vfolder_hosts: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────

/// User account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserStatus {
    Active,
    Inactive,
    BeforeVerification,
    Deleted,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::BeforeVerification => "before-verification",
            UserStatus::Deleted => "deleted",
        }
    }
}

/// User role, most privileged first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Superadmin,
    Admin,
    #[default]
    User,
    Monitor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Superadmin => "superadmin",
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Monitor => "monitor",
        }
    }
}

/// A user row. Email is the identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub status: UserStatus,
    pub role: UserRole,
    pub groups: Vec<String>,
    /// `None` when the server does not support main-access-key designation
    pub main_access_key: Option<String>,
    /// `None` when the server does not advertise 2FA support
    pub totp_activated: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────
// Resource presets
// ─────────────────────────────────────────────────────────────────

/// A resource preset: a named slot bundle offered at session launch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePreset {
    pub name: String,
    pub resource_slots: ResourceSlots,
    /// Shared memory in bytes. Must stay strictly below the preset's total
    /// memory; enforced client-side before any mutation is sent.
    pub shared_memory: Option<u64>,
}

// ─────────────────────────────────────────────────────────────────
// Container registries
// ─────────────────────────────────────────────────────────────────

/// Registry type. Harbor variants require a project name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    Docker,
    Harbor,
    Harbor2,
}

impl RegistryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryKind::Docker => "docker",
            RegistryKind::Harbor => "harbor",
            RegistryKind::Harbor2 => "harbor2",
        }
    }

    /// Harbor-family registries scope images under a project.
    pub fn requires_project(&self) -> bool {
        matches!(self, RegistryKind::Harbor | RegistryKind::Harbor2)
    }
}

/// A registry entry, keyed by hostname.
///
/// Enablement is separate set membership (the domain's
/// `allowed_docker_registries`), toggled independently of the entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryRow {
    pub hostname: String,
    pub url: String,
    pub username: Option<String>,
    pub kind: RegistryKind,
    pub project: Option<String>,
    pub enabled: bool,
}

// ─────────────────────────────────────────────────────────────────
// Summary dashboard
// ─────────────────────────────────────────────────────────────────

/// Session counts shown on the summary panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionCounts {
    pub running: u64,
    pub enqueued: u64,
}

/// Used/capacity pair for one slot kind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlotUsage {
    pub used: f64,
    pub capacity: f64,
}

impl SlotUsage {
    /// Utilization in percent, clamped to 0 when capacity is unknown.
    pub fn percent(&self) -> f64 {
        if self.capacity <= 0.0 {
            0.0
        } else {
            (self.used / self.capacity) * 100.0
        }
    }
}

/// Cluster-wide resource aggregation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClusterUsage {
    pub cpu: SlotUsage,
    /// Memory in bytes
    pub mem: SlotUsage,
    pub accelerators: BTreeMap<String, SlotUsage>,
}
