//! Resource slot values and the unlimited-sentinel rule
//!
//! The cluster manager reports slot limits as either numbers or strings
//! depending on the field and server version. `SlotValue` models that
//! union and applies the display rule used uniformly across every list
//! view: a value is "unlimited" iff it is one of `"-"`, `0`, `"Unlimited"`,
//! `Infinity` or the literal string `"Infinity"`, and renders as `"∞"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The glyph shown for unlimited slot values
pub const UNLIMITED: &str = "∞";

/// A resource slot limit as reported on the wire: number or string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Number(f64),
    Text(String),
}

impl SlotValue {
    /// Whether this value means "no limit" under the shared sentinel rule.
    pub fn is_unlimited(&self) -> bool {
        match self {
            SlotValue::Number(n) => *n == 0.0 || n.is_infinite(),
            SlotValue::Text(s) => matches!(s.as_str(), "-" | "Unlimited" | "Infinity"),
        }
    }

    /// Render for display: `"∞"` for sentinels, the value unchanged otherwise.
    ///
    /// Whole numbers drop their fractional part (`4.0` renders as `"4"`).
    pub fn display(&self) -> String {
        if self.is_unlimited() {
            return UNLIMITED.to_string();
        }
        match self {
            SlotValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            SlotValue::Number(n) => format!("{n}"),
            SlotValue::Text(s) => s.clone(),
        }
    }

    /// Numeric view of the value, if it has one. Sentinels return `None`.
    pub fn as_number(&self) -> Option<f64> {
        if self.is_unlimited() {
            return None;
        }
        match self {
            SlotValue::Number(n) => Some(*n),
            SlotValue::Text(s) => s.parse().ok(),
        }
    }
}

impl From<f64> for SlotValue {
    fn from(n: f64) -> Self {
        SlotValue::Number(n)
    }
}

impl From<u64> for SlotValue {
    fn from(n: u64) -> Self {
        SlotValue::Number(n as f64)
    }
}

impl From<&str> for SlotValue {
    fn from(s: &str) -> Self {
        SlotValue::Text(s.to_string())
    }
}

/// A bundle of slot limits: cpu, memory, and per-accelerator counts.
///
/// Accelerator keys are device identifiers like `"cuda.device"` or
/// `"rocm.device"`; anything that is not `cpu` or `mem` lands there.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSlots {
    pub cpu: Option<SlotValue>,
    pub mem: Option<SlotValue>,
    #[serde(default)]
    pub accelerators: BTreeMap<String, SlotValue>,
}

impl ResourceSlots {
    /// Build from a flat wire map (`{"cpu": 8, "mem": "32g", "cuda.device": 2}`).
    pub fn from_map(map: BTreeMap<String, SlotValue>) -> Self {
        let mut slots = ResourceSlots::default();
        for (key, value) in map {
            match key.as_str() {
                "cpu" => slots.cpu = Some(value),
                "mem" => slots.mem = Some(value),
                _ => {
                    slots.accelerators.insert(key, value);
                }
            }
        }
        slots
    }

    pub fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.mem.is_none() && self.accelerators.is_empty()
    }

    /// Display string for one named slot, `"-"` when the slot is absent.
    pub fn display_slot(&self, key: &str) -> String {
        let value = match key {
            "cpu" => self.cpu.as_ref(),
            "mem" => self.mem.as_ref(),
            _ => self.accelerators.get(key),
        };
        match value {
            Some(v) => v.display(),
            None => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_sentinel_displays_as_infinity() {
        let sentinels = [
            SlotValue::Text("-".to_string()),
            SlotValue::Number(0.0),
            SlotValue::Text("Unlimited".to_string()),
            SlotValue::Number(f64::INFINITY),
            SlotValue::Text("Infinity".to_string()),
        ];
        for value in sentinels {
            assert!(value.is_unlimited(), "{value:?} should be unlimited");
            assert_eq!(value.display(), UNLIMITED);
        }
    }

    #[test]
    fn test_ordinary_numbers_display_unchanged() {
        assert_eq!(SlotValue::Number(8.0).display(), "8");
        assert_eq!(SlotValue::Number(0.5).display(), "0.5");
        assert_eq!(SlotValue::Text("32g".to_string()).display(), "32g");
    }

    #[test]
    fn test_negative_infinity_is_unlimited() {
        assert!(SlotValue::Number(f64::NEG_INFINITY).is_unlimited());
    }

    #[test]
    fn test_as_number_skips_sentinels() {
        assert_eq!(SlotValue::Number(0.0).as_number(), None);
        assert_eq!(SlotValue::Number(4.0).as_number(), Some(4.0));
        assert_eq!(SlotValue::Text("16".to_string()).as_number(), Some(16.0));
        assert_eq!(SlotValue::Text("Unlimited".to_string()).as_number(), None);
    }

    #[test]
    fn test_from_map_splits_known_keys() {
        let mut map = BTreeMap::new();
        map.insert("cpu".to_string(), SlotValue::Number(8.0));
        map.insert("mem".to_string(), SlotValue::Text("32g".to_string()));
        map.insert("cuda.device".to_string(), SlotValue::Number(2.0));

        let slots = ResourceSlots::from_map(map);
        assert_eq!(slots.cpu, Some(SlotValue::Number(8.0)));
        assert_eq!(slots.mem, Some(SlotValue::Text("32g".to_string())));
        assert_eq!(
            slots.accelerators.get("cuda.device"),
            Some(&SlotValue::Number(2.0))
        );
    }

    #[test]
    fn test_display_slot_absent_is_dash() {
        let slots = ResourceSlots::default();
        assert_eq!(slots.display_slot("cpu"), "-");
        assert_eq!(slots.display_slot("cuda.device"), "-");
    }

    #[test]
    fn test_untagged_deserialization() {
        let v: SlotValue = serde_json::from_str("8").unwrap();
        assert_eq!(v, SlotValue::Number(8.0));
        let v: SlotValue = serde_json::from_str("\"Unlimited\"").unwrap();
        assert_eq!(v, SlotValue::Text("Unlimited".to_string()));
    }
}
