//! Display formatting helpers shared by every list view
//!
//! Masking keeps the total string length intact so table columns do not
//! shift when the masking preference is toggled.

use chrono::{DateTime, Utc};

/// Mask all but the first `visible` characters of `s` with `*`.
///
/// Used for user ids / emails. The output always has the same character
/// count as the input.
pub fn mask_keep_prefix(s: &str, visible: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= visible {
        return s.to_string();
    }
    let mut out: String = chars[..visible].iter().collect();
    out.extend(std::iter::repeat('*').take(chars.len() - visible));
    out
}

/// Mask the middle of `s`, keeping `prefix` leading and `suffix` trailing
/// characters. Used for access keys. Length-preserving; strings too short
/// to have a middle are returned unchanged.
pub fn mask_keep_edges(s: &str, prefix: usize, suffix: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= prefix + suffix {
        return s.to_string();
    }
    let mut out: String = chars[..prefix].iter().collect();
    out.extend(std::iter::repeat('*').take(chars.len() - prefix - suffix));
    out.extend(chars[chars.len() - suffix..].iter());
    out
}

/// Whole days elapsed between `from` and `now`.
pub fn elapsed_days(from: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - from).num_days()
}

/// Fixed-format timestamp for table cells.
pub fn timestamp_display(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Human-readable byte count (GiB above 1 GiB, MiB below).
pub fn format_bytes(bytes: u64) -> String {
    let b = bytes as f64;
    if b >= GIB {
        format!("{:.1} GiB", b / GIB)
    } else if b >= MIB {
        format!("{:.1} MiB", b / MIB)
    } else {
        format!("{bytes} B")
    }
}

/// Parse a human memory size (`"32g"`, `"512m"`, `"2048"`) into bytes.
///
/// Bare numbers are bytes. Returns `None` for unparseable input.
pub fn parse_mem_size(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let lower = s.to_ascii_lowercase();
    let (digits, multiplier) = match lower.as_bytes().last() {
        Some(b'g') => (&lower[..lower.len() - 1], GIB),
        Some(b'm') => (&lower[..lower.len() - 1], MIB),
        Some(b'k') => (&lower[..lower.len() - 1], 1024.0),
        _ => (lower.as_str(), 1.0),
    };
    let value: f64 = digits.trim().parse().ok()?;
    if value < 0.0 {
        return None;
    }
    Some((value * multiplier) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mask_prefix_preserves_length() {
        let masked = mask_keep_prefix("admin@cluster.example", 5);
        assert_eq!(masked.len(), "admin@cluster.example".len());
        assert_eq!(&masked[..5], "admin");
        assert!(masked[5..].chars().all(|c| c == '*'));
    }

    #[test]
    fn test_mask_prefix_short_string_unchanged() {
        assert_eq!(mask_keep_prefix("abc", 5), "abc");
    }

    #[test]
    fn test_mask_edges_preserves_length_and_ends() {
        let key = "AKIATESTKEY12345678";
        let masked = mask_keep_edges(key, 4, 4);
        assert_eq!(masked.len(), key.len());
        assert!(masked.starts_with("AKIA"));
        assert!(masked.ends_with("5678"));
        assert!(masked[4..masked.len() - 4].chars().all(|c| c == '*'));
    }

    #[test]
    fn test_mask_edges_short_string_unchanged() {
        assert_eq!(mask_keep_edges("short", 4, 4), "short");
    }

    #[test]
    fn test_elapsed_days() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 31, 12, 0, 0).unwrap();
        assert_eq!(elapsed_days(from, now), 30);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.0 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn test_parse_mem_size() {
        assert_eq!(parse_mem_size("1g"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_mem_size("512m"), Some(512 * 1024 * 1024));
        assert_eq!(parse_mem_size("2048"), Some(2048));
        assert_eq!(parse_mem_size(""), None);
        assert_eq!(parse_mem_size("abc"), None);
        assert_eq!(parse_mem_size("-1g"), None);
    }

    #[test]
    fn test_timestamp_display() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(timestamp_display(ts), "2026-03-14 09:26:53");
    }
}
