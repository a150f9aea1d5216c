//! Test utilities for the client crate
//!
//! Provides row factories and a scripted [`FakeClusterApi`] used by the
//! application crate's handler tests (enable the `test-helpers` feature).
//! The fake records every call so tests can assert that an action handler
//! did -- or, just as often, did not -- reach the network.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::mpsc;

use admiral_core::prelude::*;
use admiral_core::{
    CapabilitySet, ClusterUsage, ImageRow, KeypairRow, RegistryKind, RegistryRow, ResourceLimit,
    ResourcePolicy, ResourcePreset, ResourceSlots, SessionCounts, SlotValue, UserRole, UserRow,
    UserStatus,
};

use crate::api::{
    ClusterApi, ConnectInfo, JsonPatch, KeypairCreate, PresetPayload, RegistryPayload, UserCreate,
};
use crate::bgtask::{BgTaskEvent, BgTaskStream};
use crate::protocol::MutationOutcome;

// ─────────────────────────────────────────────────────────────────
// Row factories
// ─────────────────────────────────────────────────────────────────

/// Creates a test keypair row with sensible defaults.
pub fn test_keypair(access_key: &str, user_id: &str, is_active: bool) -> KeypairRow {
    KeypairRow {
        user_id: user_id.to_string(),
        access_key: access_key.to_string(),
        secret_key: format!("secret-{access_key}"),
        is_active,
        is_admin: false,
        resource_policy: "default".to_string(),
        rate_limit: 5000,
        num_queries: 0,
        concurrency_used: 0,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        is_main: None,
        total_slots: None,
        max_concurrent_sessions: None,
    }
}

/// Creates a test resource policy with cpu/mem slots.
pub fn test_policy(name: &str) -> ResourcePolicy {
    let mut map = BTreeMap::new();
    map.insert("cpu".to_string(), SlotValue::Number(8.0));
    map.insert("mem".to_string(), SlotValue::Text("32g".to_string()));
    ResourcePolicy {
        name: name.to_string(),
        total_resource_slots: ResourceSlots::from_map(map),
        max_concurrent_sessions: SlotValue::Number(5.0),
        max_containers_per_session: SlotValue::Number(1.0),
        idle_timeout: SlotValue::Number(600.0),
        max_vfolder_count: SlotValue::Number(10.0),
        max_vfolder_size: SlotValue::Number(0.0),
        allowed_vfolder_hosts: vec!["local".to_string()],
    }
}

/// Creates an active test user.
pub fn test_user(email: &str, username: &str) -> UserRow {
    UserRow {
        email: email.to_string(),
        username: username.to_string(),
        full_name: None,
        status: UserStatus::Active,
        role: UserRole::User,
        groups: vec!["default".to_string()],
        main_access_key: None,
        totp_activated: None,
        created_at: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
    }
}

/// Creates a test image row.
pub fn test_image(registry: &str, name: &str, tag: &str) -> ImageRow {
    ImageRow::new(
        registry,
        name,
        tag,
        "x86_64",
        None,
        BTreeMap::new(),
        vec![ResourceLimit {
            key: "cpu".to_string(),
            min: SlotValue::Number(1.0),
            max: SlotValue::Number(0.0),
        }],
        true,
    )
}

/// Creates a test resource preset.
pub fn test_preset(name: &str, cpu: f64, mem_bytes: u64) -> ResourcePreset {
    let mut map = BTreeMap::new();
    map.insert("cpu".to_string(), SlotValue::Number(cpu));
    map.insert("mem".to_string(), SlotValue::Number(mem_bytes as f64));
    ResourcePreset {
        name: name.to_string(),
        resource_slots: ResourceSlots::from_map(map),
        shared_memory: None,
    }
}

/// Creates a test registry row.
pub fn test_registry(hostname: &str, kind: RegistryKind) -> RegistryRow {
    RegistryRow {
        hostname: hostname.to_string(),
        url: format!("https://{hostname}"),
        username: None,
        kind,
        project: kind.requires_project().then(|| "team".to_string()),
        enabled: false,
    }
}

// ─────────────────────────────────────────────────────────────────
// Scripted fake client
// ─────────────────────────────────────────────────────────────────

/// One recorded API call: operation name plus a JSON-ish detail string.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub op: String,
    pub detail: String,
}

#[derive(Default)]
struct FakeState {
    version: String,
    capabilities: CapabilitySet,
    keypairs: Vec<KeypairRow>,
    policies: Vec<ResourcePolicy>,
    users: Vec<UserRow>,
    main_access_keys: HashMap<String, String>,
    images: Vec<ImageRow>,
    presets: Vec<ResourcePreset>,
    registries: Vec<RegistryRow>,
    allowed_registries: HashSet<String>,
    session_counts: SessionCounts,
    usage: ClusterUsage,
    /// Scripted outcome per operation name; missing entries succeed.
    outcomes: HashMap<String, MutationOutcome>,
    /// When set, every read fails with a transport error carrying this text.
    fail_reads: Option<String>,
    bgtask_events: Vec<BgTaskEvent>,
    calls: Vec<RecordedCall>,
}

/// A scripted in-memory [`ClusterApi`] implementation.
pub struct FakeClusterApi {
    state: Mutex<FakeState>,
}

impl Default for FakeClusterApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeClusterApi {
    /// A superadmin connection with every capability advertised.
    pub fn new() -> Self {
        let state = FakeState {
            version: "26.1.0-fake".to_string(),
            capabilities: CapabilitySet::resolve(
                true,
                true,
                [
                    "main-access-key",
                    "2fa",
                    "session-lifetime",
                    "deprecated-max-vfolder-count-in-keypair-resource-policy",
                ],
            ),
            bgtask_events: vec![BgTaskEvent::Done],
            ..FakeState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with_capabilities(self, capabilities: CapabilitySet) -> Self {
        self.state.lock().unwrap().capabilities = capabilities;
        self
    }

    pub fn with_keypairs(self, keypairs: Vec<KeypairRow>) -> Self {
        self.state.lock().unwrap().keypairs = keypairs;
        self
    }

    pub fn with_policies(self, policies: Vec<ResourcePolicy>) -> Self {
        self.state.lock().unwrap().policies = policies;
        self
    }

    pub fn with_users(self, users: Vec<UserRow>) -> Self {
        self.state.lock().unwrap().users = users;
        self
    }

    pub fn with_main_access_keys(self, map: HashMap<String, String>) -> Self {
        self.state.lock().unwrap().main_access_keys = map;
        self
    }

    pub fn with_images(self, images: Vec<ImageRow>) -> Self {
        self.state.lock().unwrap().images = images;
        self
    }

    pub fn with_presets(self, presets: Vec<ResourcePreset>) -> Self {
        self.state.lock().unwrap().presets = presets;
        self
    }

    pub fn with_registries(self, registries: Vec<RegistryRow>) -> Self {
        self.state.lock().unwrap().registries = registries;
        self
    }

    pub fn with_allowed_registries<I: IntoIterator<Item = String>>(self, allowed: I) -> Self {
        self.state.lock().unwrap().allowed_registries = allowed.into_iter().collect();
        self
    }

    pub fn with_session_counts(self, counts: SessionCounts) -> Self {
        self.state.lock().unwrap().session_counts = counts;
        self
    }

    pub fn with_usage(self, usage: ClusterUsage) -> Self {
        self.state.lock().unwrap().usage = usage;
        self
    }

    pub fn with_bgtask_events(self, events: Vec<BgTaskEvent>) -> Self {
        self.state.lock().unwrap().bgtask_events = events;
        self
    }

    /// Script the outcome of one mutation operation (by trait method name).
    pub fn script_outcome(&self, op: &str, outcome: MutationOutcome) {
        self.state
            .lock()
            .unwrap()
            .outcomes
            .insert(op.to_string(), outcome);
    }

    /// Make every read fail with a transport error.
    pub fn fail_reads(&self, message: &str) {
        self.state.lock().unwrap().fail_reads = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .count()
    }

    pub fn last_call(&self, op: &str) -> Option<RecordedCall> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .rev()
            .find(|c| c.op == op)
            .cloned()
    }

    fn record(&self, op: &str, detail: impl Into<String>) {
        self.state.lock().unwrap().calls.push(RecordedCall {
            op: op.to_string(),
            detail: detail.into(),
        });
    }

    fn read_gate(&self) -> Result<()> {
        match &self.state.lock().unwrap().fail_reads {
            Some(msg) => Err(Error::transport(msg.clone())),
            None => Ok(()),
        }
    }

    fn outcome_for(&self, op: &str) -> MutationOutcome {
        self.state
            .lock()
            .unwrap()
            .outcomes
            .get(op)
            .cloned()
            .unwrap_or_else(MutationOutcome::ok)
    }
}

#[async_trait]
impl ClusterApi for FakeClusterApi {
    async fn connect(&self) -> Result<ConnectInfo> {
        self.record("connect", "");
        let state = self.state.lock().unwrap();
        Ok(ConnectInfo {
            version: state.version.clone(),
            capabilities: state.capabilities.clone(),
        })
    }

    async fn list_resource_policies(&self) -> Result<Vec<ResourcePolicy>> {
        self.record("list_resource_policies", "");
        self.read_gate()?;
        Ok(self.state.lock().unwrap().policies.clone())
    }

    async fn list_keypairs(&self, is_active: bool) -> Result<Vec<KeypairRow>> {
        self.record("list_keypairs", format!("is_active={is_active}"));
        self.read_gate()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .keypairs
            .iter()
            .filter(|k| k.is_active == is_active)
            .cloned()
            .collect())
    }

    async fn list_main_access_keys(&self) -> Result<HashMap<String, String>> {
        self.record("list_main_access_keys", "");
        self.read_gate()?;
        Ok(self.state.lock().unwrap().main_access_keys.clone())
    }

    async fn list_users(&self, statuses: &[UserStatus]) -> Result<Vec<UserRow>> {
        let detail = statuses
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",");
        self.record("list_users", detail);
        self.read_gate()?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .filter(|u| statuses.contains(&u.status))
            .cloned()
            .collect())
    }

    async fn get_allowed_registries(&self) -> Result<HashSet<String>> {
        self.record("get_allowed_registries", "");
        self.read_gate()?;
        Ok(self.state.lock().unwrap().allowed_registries.clone())
    }

    async fn list_images(&self) -> Result<Vec<ImageRow>> {
        self.record("list_images", "");
        self.read_gate()?;
        Ok(self.state.lock().unwrap().images.clone())
    }

    async fn list_presets(&self) -> Result<Vec<ResourcePreset>> {
        self.record("list_presets", "");
        self.read_gate()?;
        Ok(self.state.lock().unwrap().presets.clone())
    }

    async fn list_registries(&self) -> Result<Vec<RegistryRow>> {
        self.record("list_registries", "");
        self.read_gate()?;
        Ok(self.state.lock().unwrap().registries.clone())
    }

    async fn fetch_session_counts(&self) -> Result<SessionCounts> {
        self.record("fetch_session_counts", "");
        self.read_gate()?;
        Ok(self.state.lock().unwrap().session_counts)
    }

    async fn fetch_cluster_usage(&self) -> Result<ClusterUsage> {
        self.record("fetch_cluster_usage", "");
        self.read_gate()?;
        Ok(self.state.lock().unwrap().usage.clone())
    }

    async fn create_keypair(&self, req: &KeypairCreate) -> Result<MutationOutcome> {
        self.record(
            "create_keypair",
            serde_json::to_string(req).unwrap_or_default(),
        );
        Ok(self.outcome_for("create_keypair"))
    }

    async fn modify_keypair(&self, access_key: &str, patch: &JsonPatch) -> Result<MutationOutcome> {
        let patch = serde_json::to_string(patch).unwrap_or_default();
        self.record("modify_keypair", format!("{access_key}:{patch}"));
        Ok(self.outcome_for("modify_keypair"))
    }

    async fn delete_keypair(&self, access_key: &str) -> Result<MutationOutcome> {
        self.record("delete_keypair", access_key);
        Ok(self.outcome_for("delete_keypair"))
    }

    async fn regenerate_keypair(&self, access_key: &str) -> Result<MutationOutcome> {
        self.record("regenerate_keypair", access_key);
        Ok(self.outcome_for("regenerate_keypair"))
    }

    async fn create_user(&self, req: &UserCreate) -> Result<MutationOutcome> {
        self.record("create_user", req.email.clone());
        Ok(self.outcome_for("create_user"))
    }

    async fn modify_user(&self, email: &str, patch: &JsonPatch) -> Result<MutationOutcome> {
        let patch = serde_json::to_string(patch).unwrap_or_default();
        self.record("modify_user", format!("{email}:{patch}"));
        Ok(self.outcome_for("modify_user"))
    }

    async fn delete_user(&self, email: &str) -> Result<MutationOutcome> {
        self.record("delete_user", email);
        Ok(self.outcome_for("delete_user"))
    }

    async fn create_preset(&self, req: &PresetPayload) -> Result<MutationOutcome> {
        self.record(
            "create_preset",
            serde_json::to_string(req).unwrap_or_default(),
        );
        Ok(self.outcome_for("create_preset"))
    }

    async fn modify_preset(&self, name: &str, patch: &JsonPatch) -> Result<MutationOutcome> {
        let patch = serde_json::to_string(patch).unwrap_or_default();
        self.record("modify_preset", format!("{name}:{patch}"));
        Ok(self.outcome_for("modify_preset"))
    }

    async fn delete_preset(&self, name: &str) -> Result<MutationOutcome> {
        self.record("delete_preset", name);
        Ok(self.outcome_for("delete_preset"))
    }

    async fn set_registry(&self, req: &RegistryPayload) -> Result<MutationOutcome> {
        self.record(
            "set_registry",
            serde_json::to_string(req).unwrap_or_default(),
        );
        Ok(self.outcome_for("set_registry"))
    }

    async fn delete_registry(&self, hostname: &str) -> Result<MutationOutcome> {
        self.record("delete_registry", hostname);
        Ok(self.outcome_for("delete_registry"))
    }

    async fn set_registry_enabled(
        &self,
        hostname: &str,
        enabled: bool,
    ) -> Result<MutationOutcome> {
        self.record("set_registry_enabled", format!("{hostname}:{enabled}"));
        Ok(self.outcome_for("set_registry_enabled"))
    }

    async fn modify_image_resource_limits(
        &self,
        reference: &str,
        limits: &[ResourceLimit],
    ) -> Result<MutationOutcome> {
        let limits = serde_json::to_string(limits).unwrap_or_default();
        self.record(
            "modify_image_resource_limits",
            format!("{reference}:{limits}"),
        );
        Ok(self.outcome_for("modify_image_resource_limits"))
    }

    async fn change_password(&self, _current: &str, _new: &str) -> Result<MutationOutcome> {
        // Passwords are deliberately not recorded.
        self.record("change_password", "");
        Ok(self.outcome_for("change_password"))
    }

    async fn rescan_images(&self, registry: &str) -> Result<String> {
        self.record("rescan_images", registry);
        Ok("task-1".to_string())
    }

    async fn attach_background_task(&self, task_id: &str) -> Result<BgTaskStream> {
        self.record("attach_background_task", task_id);
        let events = self.state.lock().unwrap().bgtask_events.clone();
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            let _ = tx.try_send(event);
        }
        Ok(BgTaskStream::from_receiver(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_filters_keypairs_by_active_flag() {
        let api = FakeClusterApi::new().with_keypairs(vec![
            test_keypair("AK1", "a@example.com", true),
            test_keypair("AK2", "b@example.com", false),
        ]);
        let active = api.list_keypairs(true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].access_key, "AK1");
        assert_eq!(
            api.last_call("list_keypairs").unwrap().detail,
            "is_active=true"
        );
    }

    #[tokio::test]
    async fn test_fake_scripted_outcome() {
        let api = FakeClusterApi::new();
        api.script_outcome("delete_keypair", MutationOutcome::failed("X"));
        let outcome = api.delete_keypair("AK1").await.unwrap();
        assert!(!outcome.ok);
        assert_eq!(outcome.msg.as_deref(), Some("X"));
        assert_eq!(api.call_count("delete_keypair"), 1);
    }

    #[tokio::test]
    async fn test_fake_read_failure() {
        let api = FakeClusterApi::new();
        api.fail_reads("connection refused");
        let err = api.list_users(&[UserStatus::Active]).await.unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
