//! Dialog form state
//!
//! Data models for the create/edit dialogs. Rendering lives in
//! admiral-tui. Every dialog seeds its fields from the selected row's view
//! model on open, validates client-side on submit, and -- for edits --
//! produces a diff patch so unchanged fields never hit the wire.

use admiral_client::{JsonPatch, KeypairCreate, PresetPayload, RegistryPayload, UserCreate};
use admiral_core::{
    KeypairRow, RegistryKind, RegistryRow, ResourceLimit, ResourcePreset, SlotValue, UserRole,
    UserRow, UserStatus,
};

use crate::diff::DiffBuilder;
use crate::forms::{
    self, parse_mem_field, require, validate_email, validate_hostname, validate_password,
    validate_rate_limit, validate_registry_url, TextField,
};

/// Where a dialog is in its lifecycle. The optional confirming sub-state
/// (destructive or below-threshold actions) is the separate confirm
/// overlay on `AppState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogPhase {
    #[default]
    Open,
    Submitting,
}

fn cycle<T: Copy + PartialEq>(items: &[T], current: T, forward: bool) -> T {
    let idx = items.iter().position(|i| *i == current).unwrap_or(0);
    let len = items.len();
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    items[next]
}

const ROLES: &[UserRole] = &[
    UserRole::Superadmin,
    UserRole::Admin,
    UserRole::User,
    UserRole::Monitor,
];

const STATUSES: &[UserStatus] = &[
    UserStatus::Active,
    UserStatus::Inactive,
    UserStatus::BeforeVerification,
    UserStatus::Deleted,
];

const REGISTRY_KINDS: &[RegistryKind] = &[
    RegistryKind::Docker,
    RegistryKind::Harbor,
    RegistryKind::Harbor2,
];

// ─────────────────────────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum CredentialDialog {
    Create(KeypairCreateForm),
    Edit(KeypairEditForm),
}

#[derive(Debug, Clone, Default)]
pub struct KeypairCreateForm {
    pub user_id: TextField,
    pub rate_limit: TextField,
    pub resource_policy: TextField,
    pub is_admin: bool,
    pub is_active: bool,
    pub focus: usize,
    pub phase: DialogPhase,
}

impl KeypairCreateForm {
    pub const FIELDS: usize = 5;

    pub fn new() -> Self {
        Self {
            rate_limit: TextField::new("5000"),
            resource_policy: TextField::new("default"),
            is_active: true,
            ..Self::default()
        }
    }

    pub fn focused_text(&mut self) -> Option<&mut TextField> {
        match self.focus {
            0 => Some(&mut self.user_id),
            1 => Some(&mut self.rate_limit),
            2 => Some(&mut self.resource_policy),
            _ => None,
        }
    }

    /// Type into the focused text field; space toggles boolean fields.
    pub fn input_char(&mut self, c: char) {
        match self.focus {
            0 => self.user_id.push(c),
            1 => self.rate_limit.push(c),
            2 => self.resource_policy.push(c),
            _ if c == ' ' => self.toggle(),
            _ => {}
        }
    }

    pub fn toggle(&mut self) {
        match self.focus {
            3 => self.is_admin = !self.is_admin,
            4 => self.is_active = !self.is_active,
            _ => {}
        }
    }

    /// Validate and build the creation payload. Inline errors on failure.
    pub fn build(&mut self) -> Option<KeypairCreate> {
        let user_id = self.user_id.validate(validate_email);
        let rate_limit = self.rate_limit.validate(validate_rate_limit);
        let resource_policy = self.resource_policy.validate(require);
        Some(KeypairCreate {
            user_id: user_id?,
            is_active: self.is_active,
            is_admin: self.is_admin,
            resource_policy: resource_policy?,
            rate_limit: rate_limit?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct KeypairEditForm {
    pub original: KeypairRow,
    pub rate_limit: TextField,
    pub resource_policy: TextField,
    pub is_admin: bool,
    pub is_active: bool,
    /// Set after the low-rate-limit confirmation dialog was accepted.
    pub rate_limit_confirmed: bool,
    pub focus: usize,
    pub phase: DialogPhase,
}

impl KeypairEditForm {
    pub const FIELDS: usize = 4;

    /// Seed from the selected row.
    pub fn from_row(row: &KeypairRow) -> Self {
        Self {
            rate_limit: TextField::new(row.rate_limit.to_string()),
            resource_policy: TextField::new(&row.resource_policy),
            is_admin: row.is_admin,
            is_active: row.is_active,
            rate_limit_confirmed: false,
            focus: 0,
            phase: DialogPhase::Open,
            original: row.clone(),
        }
    }

    pub fn focused_text(&mut self) -> Option<&mut TextField> {
        match self.focus {
            0 => Some(&mut self.rate_limit),
            1 => Some(&mut self.resource_policy),
            _ => None,
        }
    }

    /// Type into the focused text field; space toggles boolean fields.
    pub fn input_char(&mut self, c: char) {
        match self.focus {
            0 => self.rate_limit.push(c),
            1 => self.resource_policy.push(c),
            _ if c == ' ' => self.toggle(),
            _ => {}
        }
    }

    pub fn toggle(&mut self) {
        match self.focus {
            2 => self.is_admin = !self.is_admin,
            3 => self.is_active = !self.is_active,
            _ => {}
        }
    }

    /// Validate fields and diff against the original row.
    ///
    /// `None` means a validation failure (inline errors are set); otherwise
    /// the patch (empty ⇒ `None` inside) and the parsed rate limit.
    pub fn validate_and_diff(&mut self) -> Option<(Option<JsonPatch>, u32)> {
        let rate_limit = self.rate_limit.validate(validate_rate_limit);
        let resource_policy = self.resource_policy.validate(require);
        let (rate_limit, resource_policy) = (rate_limit?, resource_policy?);

        let patch = DiffBuilder::new()
            .field("is_active", &self.is_active, &self.original.is_active)
            .field("is_admin", &self.is_admin, &self.original.is_admin)
            .field(
                "resource_policy",
                &resource_policy,
                &self.original.resource_policy,
            )
            .field("rate_limit", &rate_limit, &self.original.rate_limit)
            .build();
        Some((patch, rate_limit))
    }
}

// ─────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum UserDialog {
    Create(UserCreateForm),
    Edit(UserEditForm),
}

#[derive(Debug, Clone, Default)]
pub struct UserCreateForm {
    pub email: TextField,
    pub username: TextField,
    pub password: TextField,
    pub role: UserRole,
    pub focus: usize,
    pub phase: DialogPhase,
}

impl UserCreateForm {
    pub const FIELDS: usize = 4;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused_text(&mut self) -> Option<&mut TextField> {
        match self.focus {
            0 => Some(&mut self.email),
            1 => Some(&mut self.username),
            2 => Some(&mut self.password),
            _ => None,
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        if self.focus == 3 {
            self.role = cycle(ROLES, self.role, forward);
        }
    }

    pub fn build(&mut self) -> Option<UserCreate> {
        let email = self.email.validate(validate_email);
        let username = self.username.validate(require);
        let password = self.password.validate(validate_password);
        Some(UserCreate {
            email: email?,
            username: username?,
            password: password?,
            role: self.role,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UserEditForm {
    pub original: UserRow,
    pub username: TextField,
    pub role: UserRole,
    pub status: UserStatus,
    pub focus: usize,
    pub phase: DialogPhase,
}

impl UserEditForm {
    pub const FIELDS: usize = 3;

    pub fn from_row(row: &UserRow) -> Self {
        Self {
            username: TextField::new(&row.username),
            role: row.role,
            status: row.status,
            focus: 0,
            phase: DialogPhase::Open,
            original: row.clone(),
        }
    }

    pub fn focused_text(&mut self) -> Option<&mut TextField> {
        (self.focus == 0).then_some(&mut self.username)
    }

    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            1 => self.role = cycle(ROLES, self.role, forward),
            2 => self.status = cycle(STATUSES, self.status, forward),
            _ => {}
        }
    }

    pub fn validate_and_diff(&mut self) -> Option<Option<JsonPatch>> {
        let username = self.username.validate(require)?;
        let patch = DiffBuilder::new()
            .field("username", &username, &self.original.username)
            .field("role", &self.role, &self.original.role)
            .field("status", &self.status, &self.original.status)
            .build();
        Some(patch)
    }
}

// ─────────────────────────────────────────────────────────────────
// Resource presets
// ─────────────────────────────────────────────────────────────────

/// Result of validating a preset form.
#[derive(Debug, Clone, PartialEq)]
pub enum PresetValidation {
    Valid(PresetPayload),
    /// shared_memory >= total memory; rejected locally with a notification
    SharedMemoryTooLarge,
    /// Inline field errors were set
    Invalid,
}

#[derive(Debug, Clone, Default)]
pub struct PresetForm {
    /// `None` for creation; `Some` seeds an edit
    pub original: Option<ResourcePreset>,
    pub name: TextField,
    pub cpu: TextField,
    pub mem: TextField,
    pub shared_memory: TextField,
    pub focus: usize,
    pub phase: DialogPhase,
}

impl PresetForm {
    pub const FIELDS: usize = 4;

    pub fn new() -> Self {
        Self {
            cpu: TextField::new("1"),
            mem: TextField::new("1g"),
            ..Self::default()
        }
    }

    pub fn from_preset(preset: &ResourcePreset) -> Self {
        let display = |v: Option<&SlotValue>| v.map(SlotValue::display).unwrap_or_default();
        Self {
            name: TextField::new(&preset.name),
            cpu: TextField::new(display(preset.resource_slots.cpu.as_ref())),
            mem: TextField::new(display(preset.resource_slots.mem.as_ref())),
            shared_memory: TextField::new(
                preset
                    .shared_memory
                    .map(|b| b.to_string())
                    .unwrap_or_default(),
            ),
            focus: 0,
            phase: DialogPhase::Open,
            original: Some(preset.clone()),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.original.is_some()
    }

    pub fn focused_text(&mut self) -> Option<&mut TextField> {
        match self.focus {
            // The name keys the preset; it is only editable on create
            0 if !self.is_edit() => Some(&mut self.name),
            1 => Some(&mut self.cpu),
            2 => Some(&mut self.mem),
            3 => Some(&mut self.shared_memory),
            _ => None,
        }
    }

    /// Validate; the shared-memory constraint is checked after the field
    /// parses so the caller can surface it as a notification.
    pub fn validate(&mut self) -> PresetValidation {
        let name = self.name.validate(require);
        let cpu = self.cpu.validate(forms::validate_cpu_count);
        let mem = self.mem.validate(parse_mem_field);
        let shared = if self.shared_memory.value.trim().is_empty() {
            Some(None)
        } else {
            self.shared_memory.validate(parse_mem_field).map(Some)
        };
        let (name, cpu, mem, shared) = match (name, cpu, mem, shared) {
            (Some(n), Some(c), Some(m), Some(s)) => (n, c, m, s),
            _ => return PresetValidation::Invalid,
        };

        if let Some(shared) = shared {
            if shared >= mem {
                return PresetValidation::SharedMemoryTooLarge;
            }
        }

        let mut slots = serde_json::Map::new();
        slots.insert("cpu".to_string(), serde_json::json!(cpu));
        slots.insert("mem".to_string(), serde_json::json!(mem));
        PresetValidation::Valid(PresetPayload {
            name,
            resource_slots: slots,
            shared_memory: shared,
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// Registries
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RegistryForm {
    /// `None` for creation; `Some` seeds an edit
    pub original: Option<RegistryRow>,
    pub hostname: TextField,
    pub url: TextField,
    pub username: TextField,
    pub password: TextField,
    pub kind: RegistryKind,
    pub project: TextField,
    pub focus: usize,
    pub phase: DialogPhase,
}

impl RegistryForm {
    pub const FIELDS: usize = 6;

    pub fn new() -> Self {
        Self {
            original: None,
            hostname: TextField::default(),
            url: TextField::default(),
            username: TextField::default(),
            password: TextField::default(),
            kind: RegistryKind::Docker,
            project: TextField::default(),
            focus: 0,
            phase: DialogPhase::Open,
        }
    }

    pub fn from_row(row: &RegistryRow) -> Self {
        Self {
            hostname: TextField::new(&row.hostname),
            url: TextField::new(&row.url),
            username: TextField::new(row.username.clone().unwrap_or_default()),
            password: TextField::default(),
            kind: row.kind,
            project: TextField::new(row.project.clone().unwrap_or_default()),
            focus: 0,
            phase: DialogPhase::Open,
            original: Some(row.clone()),
        }
    }

    pub fn is_edit(&self) -> bool {
        self.original.is_some()
    }

    pub fn focused_text(&mut self) -> Option<&mut TextField> {
        match self.focus {
            // Hostname keys the entry; it is only editable on create
            0 if !self.is_edit() => Some(&mut self.hostname),
            1 => Some(&mut self.url),
            2 => Some(&mut self.username),
            3 => Some(&mut self.password),
            5 => Some(&mut self.project),
            _ => None,
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        if self.focus == 4 {
            self.kind = cycle(REGISTRY_KINDS, self.kind, forward);
        }
    }

    /// Validate and build the upsert payload. Harbor-family registries
    /// require a project name; an empty one blocks submission.
    pub fn build(&mut self) -> Option<RegistryPayload> {
        let hostname = self.hostname.validate(validate_hostname);
        let url = self.url.validate(validate_registry_url);
        let project = if self.kind.requires_project() {
            self.project.validate(require).map(Some)
        } else {
            self.project.error = None;
            Some(None)
        };
        let (hostname, url, project) = (hostname?, url?, project?);

        let username = require(&self.username.value).ok();
        let password = require(&self.password.value).ok();
        Some(RegistryPayload {
            hostname,
            url,
            username,
            password,
            kind: self.kind,
            project,
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// Environment images
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ImageLimitsForm {
    pub reference: String,
    pub cpu_min: TextField,
    pub mem_min: TextField,
    pub focus: usize,
    pub phase: DialogPhase,
}

impl ImageLimitsForm {
    pub const FIELDS: usize = 2;

    pub fn from_limits(reference: String, limits: &[ResourceLimit]) -> Self {
        let min_of = |key: &str| {
            limits
                .iter()
                .find(|l| l.key == key)
                .map(|l| l.min.display())
                .unwrap_or_default()
        };
        Self {
            reference,
            cpu_min: TextField::new(min_of("cpu")),
            mem_min: TextField::new(min_of("mem")),
            focus: 0,
            phase: DialogPhase::Open,
        }
    }

    pub fn focused_text(&mut self) -> Option<&mut TextField> {
        match self.focus {
            0 => Some(&mut self.cpu_min),
            1 => Some(&mut self.mem_min),
            _ => None,
        }
    }

    pub fn build(&mut self) -> Option<Vec<ResourceLimit>> {
        let cpu = self.cpu_min.validate(forms::validate_cpu_count);
        let mem = self.mem_min.validate(parse_mem_field);
        let (cpu, mem) = (cpu?, mem?);
        Some(vec![
            ResourceLimit {
                key: "cpu".to_string(),
                min: SlotValue::Number(cpu),
                max: SlotValue::Number(0.0),
            },
            ResourceLimit {
                key: "mem".to_string(),
                min: SlotValue::Number(mem as f64),
                max: SlotValue::Number(0.0),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admiral_client::test_utils::{test_keypair, test_registry};

    #[test]
    fn test_keypair_edit_seeds_from_row() {
        let row = test_keypair("AK1", "a@example.com", true);
        let form = KeypairEditForm::from_row(&row);
        assert_eq!(form.rate_limit.value, "5000");
        assert_eq!(form.resource_policy.value, "default");
        assert!(form.is_active);
        assert!(!form.rate_limit_confirmed);
    }

    #[test]
    fn test_keypair_create_char_routing() {
        let mut form = KeypairCreateForm::new();
        form.input_char('a');
        assert_eq!(form.user_id.value, "a");

        // Space on a boolean field toggles it instead of typing
        form.focus = 3;
        form.input_char(' ');
        assert!(form.is_admin);
        form.input_char('x');
        assert!(form.is_admin);
    }

    #[test]
    fn test_keypair_edit_empty_diff() {
        let row = test_keypair("AK1", "a@example.com", true);
        let mut form = KeypairEditForm::from_row(&row);
        let (patch, rate) = form.validate_and_diff().unwrap();
        assert!(patch.is_none());
        assert_eq!(rate, 5000);
    }

    #[test]
    fn test_keypair_edit_diff_contains_only_changes() {
        let row = test_keypair("AK1", "a@example.com", true);
        let mut form = KeypairEditForm::from_row(&row);
        form.rate_limit = TextField::new("50");
        let (patch, rate) = form.validate_and_diff().unwrap();
        let patch = patch.unwrap();
        assert_eq!(rate, 50);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.get("rate_limit"), Some(&serde_json::json!(50)));
    }

    #[test]
    fn test_keypair_edit_invalid_rate_limit_blocks() {
        let row = test_keypair("AK1", "a@example.com", true);
        let mut form = KeypairEditForm::from_row(&row);
        form.rate_limit = TextField::new("lots");
        assert!(form.validate_and_diff().is_none());
        assert!(!form.rate_limit.is_valid());
    }

    #[test]
    fn test_preset_shared_memory_constraint() {
        let mut form = PresetForm::new();
        form.name = TextField::new("large");
        form.cpu = TextField::new("4");
        form.mem = TextField::new("1g");
        form.shared_memory = TextField::new("1g");
        assert_eq!(form.validate(), PresetValidation::SharedMemoryTooLarge);

        form.shared_memory = TextField::new("512m");
        assert!(matches!(form.validate(), PresetValidation::Valid(_)));
    }

    #[test]
    fn test_registry_harbor_requires_project() {
        let mut form = RegistryForm::new();
        form.hostname = TextField::new("harbor.example.io");
        form.url = TextField::new("https://harbor.example.io");
        form.kind = RegistryKind::Harbor;
        assert!(form.build().is_none());
        assert!(!form.project.is_valid());

        form.project = TextField::new("team");
        let payload = form.build().unwrap();
        assert_eq!(payload.project.as_deref(), Some("team"));
    }

    #[test]
    fn test_registry_docker_ignores_project() {
        let mut form = RegistryForm::new();
        form.hostname = TextField::new("cr.example.io");
        form.url = TextField::new("https://cr.example.io");
        let payload = form.build().unwrap();
        assert_eq!(payload.project, None);
    }

    #[test]
    fn test_registry_edit_seeds_from_row() {
        let row = test_registry("harbor.example.io", RegistryKind::Harbor);
        let form = RegistryForm::from_row(&row);
        assert_eq!(form.url.value, "https://harbor.example.io");
        assert_eq!(form.project.value, "team");
        assert!(form.is_edit());
    }

    #[test]
    fn test_user_edit_diff() {
        let row = admiral_client::test_utils::test_user("dev@example.com", "dev");
        let mut form = UserEditForm::from_row(&row);
        form.status = UserStatus::Inactive;
        let patch = form.validate_and_diff().unwrap().unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(
            patch.get("status"),
            Some(&serde_json::json!("inactive"))
        );
    }

    #[test]
    fn test_enum_cycling_wraps() {
        let mut form = RegistryForm::new();
        form.focus = 4;
        form.cycle(true);
        assert_eq!(form.kind, RegistryKind::Harbor);
        form.cycle(true);
        assert_eq!(form.kind, RegistryKind::Harbor2);
        form.cycle(true);
        assert_eq!(form.kind, RegistryKind::Docker);
        form.cycle(false);
        assert_eq!(form.kind, RegistryKind::Harbor2);
    }
}
