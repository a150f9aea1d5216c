//! Pure row-cell builders
//!
//! Each function maps a row view model (plus read-only display flags) to
//! its table cells. No state is touched; given the same row and flags the
//! cells are always identical. Masking preserves string length so columns
//! stay put when the preference is toggled.

use chrono::{DateTime, Utc};

use admiral_core::format::{format_bytes, mask_keep_edges, mask_keep_prefix, timestamp_display};
use admiral_core::{ImageRow, KeypairRow, RegistryRow, ResourcePreset, SlotValue, UserRow};

/// Visible prefix length for masked user ids.
pub const USER_ID_VISIBLE_PREFIX: usize = 5;
/// Visible prefix/suffix length for masked access keys.
pub const ACCESS_KEY_VISIBLE_EDGES: usize = 4;

pub fn mask_user_id(user_id: &str, masked: bool) -> String {
    if masked {
        mask_keep_prefix(user_id, USER_ID_VISIBLE_PREFIX)
    } else {
        user_id.to_string()
    }
}

pub fn mask_access_key(access_key: &str, masked: bool) -> String {
    if masked {
        mask_keep_edges(
            access_key,
            ACCESS_KEY_VISIBLE_EDGES,
            ACCESS_KEY_VISIBLE_EDGES,
        )
    } else {
        access_key.to_string()
    }
}

/// Memory slot values are byte counts when numeric.
fn mem_display(value: &SlotValue) -> String {
    match value.as_number() {
        Some(n) if n >= 1.0 => format_bytes(n as u64),
        _ => value.display(),
    }
}

pub const KEYPAIR_HEADER: [&str; 8] = [
    "User ID",
    "Access Key",
    "Policy",
    "CPU",
    "Mem",
    "Rate Limit",
    "Sessions",
    "Created",
];

pub fn keypair_cells(row: &KeypairRow, masked: bool, now: DateTime<Utc>) -> Vec<String> {
    let (cpu, mem) = match &row.total_slots {
        Some(slots) => (
            slots.display_slot("cpu"),
            slots
                .mem
                .as_ref()
                .map(mem_display)
                .unwrap_or_else(|| "-".to_string()),
        ),
        // Unresolved policy name: resource fields stay unset
        None => ("-".to_string(), "-".to_string()),
    };
    let concurrency = match &row.max_concurrent_sessions {
        Some(limit) => format!("{}/{}", row.concurrency_used, limit.display()),
        None => format!("{}/-", row.concurrency_used),
    };
    let mut main_marker = String::new();
    if row.is_main == Some(true) {
        main_marker.push_str(" *");
    }
    vec![
        format!("{}{}", mask_user_id(&row.user_id, masked), main_marker),
        mask_access_key(&row.access_key, masked),
        row.resource_policy.clone(),
        cpu,
        mem,
        row.rate_limit.to_string(),
        concurrency,
        format!(
            "{} ({}d)",
            timestamp_display(row.created_at),
            row.elapsed_days(now)
        ),
    ]
}

pub const USER_HEADER: [&str; 6] = ["Email", "Username", "Role", "Status", "Groups", "2FA"];

pub fn user_cells(row: &UserRow, masked: bool) -> Vec<String> {
    let totp = match row.totp_activated {
        Some(true) => "on",
        Some(false) => "off",
        None => "-",
    };
    vec![
        mask_user_id(&row.email, masked),
        row.username.clone(),
        row.role.as_str().to_string(),
        row.status.as_str().to_string(),
        row.groups.join(", "),
        totp.to_string(),
    ]
}

pub const IMAGE_HEADER: [&str; 6] = [
    "Registry",
    "Namespace",
    "Language",
    "Version",
    "Requirements",
    "Arch",
];

pub fn image_cells(row: &ImageRow) -> Vec<String> {
    vec![
        row.registry.clone(),
        row.namespace.clone().unwrap_or_else(|| "-".to_string()),
        row.lang.clone(),
        row.base_version.clone(),
        row.requirements.join(", "),
        row.architecture.clone(),
    ]
}

pub const PRESET_HEADER: [&str; 4] = ["Name", "CPU", "Memory", "Shared Memory"];

pub fn preset_cells(row: &ResourcePreset) -> Vec<String> {
    vec![
        row.name.clone(),
        row.resource_slots.display_slot("cpu"),
        row.resource_slots
            .mem
            .as_ref()
            .map(mem_display)
            .unwrap_or_else(|| "-".to_string()),
        row.shared_memory
            .map(format_bytes)
            .unwrap_or_else(|| "-".to_string()),
    ]
}

pub const REGISTRY_HEADER: [&str; 6] = ["Hostname", "URL", "Type", "Project", "Username", "State"];

pub fn registry_cells(row: &RegistryRow) -> Vec<String> {
    vec![
        row.hostname.clone(),
        row.url.clone(),
        row.kind.as_str().to_string(),
        row.project.clone().unwrap_or_else(|| "-".to_string()),
        row.username.clone().unwrap_or_else(|| "-".to_string()),
        if row.enabled { "enabled" } else { "disabled" }.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use admiral_client::test_utils::{test_keypair, test_user};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 11, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_keypair_cells_deterministic() {
        let row = test_keypair("AKIATESTKEY12345678", "admin@example.com", true);
        let a = keypair_cells(&row, true, now());
        let b = keypair_cells(&row, true, now());
        assert_eq!(a, b);
    }

    #[test]
    fn test_masked_cells_preserve_length() {
        let row = test_keypair("AKIATESTKEY12345678", "admin@example.com", true);
        let cells = keypair_cells(&row, true, now());
        assert_eq!(cells[0].len(), "admin@example.com".len());
        assert!(cells[0].starts_with("admin"));
        assert!(cells[0].contains('*'));
        assert_eq!(cells[1].len(), "AKIATESTKEY12345678".len());
        assert!(cells[1].starts_with("AKIA"));
        assert!(cells[1].ends_with("5678"));
    }

    #[test]
    fn test_unmasked_cells_pass_through() {
        let row = test_keypair("AKIATESTKEY12345678", "admin@example.com", true);
        let cells = keypair_cells(&row, false, now());
        assert_eq!(cells[0], "admin@example.com");
        assert_eq!(cells[1], "AKIATESTKEY12345678");
    }

    #[test]
    fn test_unresolved_policy_shows_unset_slots() {
        let mut row = test_keypair("AK1", "a@example.com", true);
        row.total_slots = None;
        let cells = keypair_cells(&row, false, now());
        assert_eq!(cells[3], "-");
        assert_eq!(cells[4], "-");
    }

    #[test]
    fn test_main_access_key_marker() {
        let mut row = test_keypair("AK1", "a@example.com", true);
        row.is_main = Some(true);
        let cells = keypair_cells(&row, false, now());
        assert!(cells[0].ends_with(" *"));
    }

    #[test]
    fn test_user_cells_totp_states() {
        let mut row = test_user("dev@example.com", "dev");
        assert_eq!(user_cells(&row, false)[5], "-");
        row.totp_activated = Some(true);
        assert_eq!(user_cells(&row, false)[5], "on");
        row.totp_activated = Some(false);
        assert_eq!(user_cells(&row, false)[5], "off");
    }
}
