//! Wire DTOs and response decoding
//!
//! Reads come back as `{ "<entity_plural>": [...] }` envelopes; mutations
//! as `{ok, msg?}`, sometimes nested under an operation key such as
//! `delete_keypair`. Everything is decoded here so the rest of the
//! workspace only sees typed view models and [`MutationOutcome`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use admiral_core::prelude::*;
use admiral_core::{
    ImageRow, KeypairRow, RegistryKind, RegistryRow, ResourceLimit, ResourcePolicy,
    ResourcePreset, ResourceSlots, SlotValue, UserRole, UserRow, UserStatus,
};

/// Uniform result of every mutation: structural success or a server
/// message. A transport failure never produces one of these; it surfaces
/// as `Error::Transport` instead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MutationOutcome {
    pub ok: bool,
    #[serde(default)]
    pub msg: Option<String>,
}

impl MutationOutcome {
    pub fn ok() -> Self {
        Self { ok: true, msg: None }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            msg: Some(msg.into()),
        }
    }

    /// Decode from a response body that is either a bare `{ok, msg}` or an
    /// envelope like `{"delete_keypair": {ok, msg}}`.
    pub fn from_body(body: &Value, nested_key: &str) -> Result<Self> {
        let obj = match body.get(nested_key) {
            Some(inner) => inner,
            None => body,
        };
        serde_json::from_value(obj.clone())
            .map_err(|e| Error::protocol(format!("malformed mutation response: {e}")))
    }
}

// ─────────────────────────────────────────────────────────────────
// Read envelopes
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct KeypairsEnvelope {
    pub keypairs: Vec<KeypairDto>,
}

#[derive(Debug, Deserialize)]
pub struct PoliciesEnvelope {
    pub resource_policies: Vec<PolicyDto>,
}

#[derive(Debug, Deserialize)]
pub struct UsersEnvelope {
    pub users: Vec<UserDto>,
}

#[derive(Debug, Deserialize)]
pub struct MainAccessKeysEnvelope {
    pub main_access_keys: Vec<MainAccessKeyDto>,
}

#[derive(Debug, Deserialize)]
pub struct ImagesEnvelope {
    pub images: Vec<ImageDto>,
}

#[derive(Debug, Deserialize)]
pub struct PresetsEnvelope {
    pub resource_presets: Vec<PresetDto>,
}

#[derive(Debug, Deserialize)]
pub struct RegistriesEnvelope {
    pub registries: Vec<RegistryDto>,
}

#[derive(Debug, Deserialize)]
pub struct DomainEnvelope {
    pub domain: DomainDto,
}

#[derive(Debug, Deserialize)]
pub struct DomainDto {
    #[serde(default)]
    pub allowed_docker_registries: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionCountsEnvelope {
    pub sessions: SessionCountsDto,
}

#[derive(Debug, Deserialize)]
pub struct SessionCountsDto {
    #[serde(default)]
    pub running: u64,
    #[serde(default)]
    pub enqueued: u64,
}

#[derive(Debug, Deserialize)]
pub struct UsageEnvelope {
    pub resources: UsageDto,
}

#[derive(Debug, Deserialize)]
pub struct UsageDto {
    pub cpu: SlotUsageDto,
    pub mem: SlotUsageDto,
    #[serde(default)]
    pub accelerators: BTreeMap<String, SlotUsageDto>,
}

#[derive(Debug, Deserialize)]
pub struct SlotUsageDto {
    pub used: f64,
    pub capacity: f64,
}

#[derive(Debug, Deserialize)]
pub struct HelloEnvelope {
    pub version: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RescanEnvelope {
    pub rescan_images: RescanDto,
}

#[derive(Debug, Deserialize)]
pub struct RescanDto {
    pub ok: bool,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Entity DTOs
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct KeypairDto {
    pub user_id: String,
    pub access_key: String,
    pub secret_key: String,
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    pub resource_policy: String,
    #[serde(default)]
    pub rate_limit: u32,
    #[serde(default)]
    pub num_queries: u64,
    #[serde(default)]
    pub concurrency_used: u32,
    pub created_at: DateTime<Utc>,
    /// Absent on servers without main-access-key support
    #[serde(default)]
    pub is_main: Option<bool>,
}

impl KeypairDto {
    /// Convert to a view row. Policy totals stay unset here; the refresh
    /// controller merges them from the policy mapping.
    pub fn into_row(self) -> KeypairRow {
        KeypairRow {
            user_id: self.user_id,
            access_key: self.access_key,
            secret_key: self.secret_key,
            is_active: self.is_active,
            is_admin: self.is_admin,
            resource_policy: self.resource_policy,
            rate_limit: self.rate_limit,
            num_queries: self.num_queries,
            concurrency_used: self.concurrency_used,
            created_at: self.created_at,
            is_main: self.is_main,
            total_slots: None,
            max_concurrent_sessions: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyDto {
    pub name: String,
    #[serde(default)]
    pub total_resource_slots: BTreeMap<String, SlotValue>,
    #[serde(default = "unlimited")]
    pub max_concurrent_sessions: SlotValue,
    #[serde(default = "unlimited")]
    pub max_containers_per_session: SlotValue,
    #[serde(default = "unlimited")]
    pub idle_timeout: SlotValue,
    #[serde(default = "unlimited")]
    pub max_vfolder_count: SlotValue,
    #[serde(default = "unlimited")]
    pub max_vfolder_size: SlotValue,
    #[serde(default)]
    pub allowed_vfolder_hosts: Vec<String>,
}

fn unlimited() -> SlotValue {
    SlotValue::Number(0.0)
}

impl PolicyDto {
    pub fn into_policy(self) -> ResourcePolicy {
        ResourcePolicy {
            name: self.name,
            total_resource_slots: ResourceSlots::from_map(self.total_resource_slots),
            max_concurrent_sessions: self.max_concurrent_sessions,
            max_containers_per_session: self.max_containers_per_session,
            idle_timeout: self.idle_timeout,
            max_vfolder_count: self.max_vfolder_count,
            max_vfolder_size: self.max_vfolder_size,
            allowed_vfolder_hosts: self.allowed_vfolder_hosts,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub status: UserStatus,
    pub role: UserRole,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub main_access_key: Option<String>,
    #[serde(default)]
    pub totp_activated: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserDto {
    pub fn into_row(self) -> UserRow {
        UserRow {
            email: self.email,
            username: self.username,
            full_name: self.full_name,
            status: self.status,
            role: self.role,
            groups: self.groups,
            main_access_key: self.main_access_key,
            totp_activated: self.totp_activated,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainAccessKeyDto {
    pub email: String,
    pub access_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageDto {
    pub registry: String,
    pub name: String,
    pub tag: String,
    pub architecture: String,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub resource_limits: Vec<ResourceLimit>,
    #[serde(default)]
    pub installed: bool,
}

impl ImageDto {
    pub fn into_row(self) -> ImageRow {
        ImageRow::new(
            self.registry,
            self.name,
            self.tag,
            self.architecture,
            self.digest,
            self.labels,
            self.resource_limits,
            self.installed,
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresetDto {
    pub name: String,
    #[serde(default)]
    pub resource_slots: BTreeMap<String, SlotValue>,
    #[serde(default)]
    pub shared_memory: Option<u64>,
}

impl PresetDto {
    pub fn into_preset(self) -> ResourcePreset {
        ResourcePreset {
            name: self.name,
            resource_slots: ResourceSlots::from_map(self.resource_slots),
            shared_memory: self.shared_memory,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryDto {
    pub hostname: String,
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "type")]
    pub kind: RegistryKind,
    #[serde(default)]
    pub project: Option<String>,
}

impl RegistryDto {
    /// Enablement is merged from the domain's allowed set by the view.
    pub fn into_row(self) -> RegistryRow {
        RegistryRow {
            hostname: self.hostname,
            url: self.url,
            username: self.username,
            kind: self.kind,
            project: self.project,
            enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_from_bare_body() {
        let body = json!({"ok": true});
        let outcome = MutationOutcome::from_body(&body, "delete_keypair").unwrap();
        assert!(outcome.ok);
        assert_eq!(outcome.msg, None);
    }

    #[test]
    fn test_outcome_from_nested_body() {
        let body = json!({"delete_keypair": {"ok": false, "msg": "keypair not found"}});
        let outcome = MutationOutcome::from_body(&body, "delete_keypair").unwrap();
        assert!(!outcome.ok);
        assert_eq!(outcome.msg.as_deref(), Some("keypair not found"));
    }

    #[test]
    fn test_outcome_malformed_is_protocol_error() {
        let body = json!({"delete_keypair": [1, 2, 3]});
        let err = MutationOutcome::from_body(&body, "delete_keypair").unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
    }

    #[test]
    fn test_keypair_dto_into_row_leaves_policy_unset() {
        let dto: KeypairDto = serde_json::from_value(json!({
            "user_id": "admin@example.com",
            "access_key": "AKIAFAKE12345678",
            "secret_key": "sk",
            "is_active": true,
            "is_admin": true,
            "resource_policy": "default",
            "rate_limit": 5000,
            "num_queries": 12,
            "concurrency_used": 1,
            "created_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        let row = dto.into_row();
        assert_eq!(row.access_key, "AKIAFAKE12345678");
        assert!(row.total_slots.is_none());
        assert!(row.is_main.is_none());
    }

    #[test]
    fn test_policy_dto_slot_split() {
        let dto: PolicyDto = serde_json::from_value(json!({
            "name": "default",
            "total_resource_slots": {"cpu": 8, "mem": "32g", "cuda.device": 2},
            "max_concurrent_sessions": 5
        }))
        .unwrap();
        let policy = dto.into_policy();
        assert_eq!(policy.total_resource_slots.display_slot("cpu"), "8");
        assert_eq!(policy.total_resource_slots.display_slot("mem"), "32g");
        assert_eq!(policy.total_resource_slots.display_slot("cuda.device"), "2");
        assert_eq!(policy.max_concurrent_sessions, SlotValue::Number(5.0));
    }

    #[test]
    fn test_users_envelope_shape() {
        let env: UsersEnvelope = serde_json::from_value(json!({
            "users": [{
                "email": "dev@example.com",
                "username": "dev",
                "status": "active",
                "role": "user"
            }]
        }))
        .unwrap();
        assert_eq!(env.users.len(), 1);
        let row = env.users.into_iter().next().unwrap().into_row();
        assert_eq!(row.status, UserStatus::Active);
        assert_eq!(row.role, UserRole::User);
        assert!(row.totp_activated.is_none());
    }

    #[test]
    fn test_registry_dto_type_field() {
        let dto: RegistryDto = serde_json::from_value(json!({
            "hostname": "harbor.example.io",
            "url": "https://harbor.example.io",
            "type": "harbor2",
            "project": "team"
        }))
        .unwrap();
        let row = dto.into_row();
        assert_eq!(row.kind, RegistryKind::Harbor2);
        assert!(!row.enabled);
    }
}
