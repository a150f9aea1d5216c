//! Partial-update payload construction
//!
//! Mutations send only the fields that differ from the current view model.
//! An empty diff means "no changes" and must short-circuit before any
//! network call.

use serde::Serialize;
use serde_json::Value;

use admiral_client::JsonPatch;

/// Builds a patch of changed fields by comparing candidates against the
/// current view model.
#[derive(Debug, Default)]
pub struct DiffBuilder {
    patch: JsonPatch,
}

impl DiffBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include `key` only when the new value differs from the current one.
    pub fn field<T: PartialEq + Serialize>(mut self, key: &str, new: &T, current: &T) -> Self {
        if new != current {
            let value = serde_json::to_value(new).unwrap_or(Value::Null);
            self.patch.insert(key.to_string(), value);
        }
        self
    }

    /// The finished patch, or `None` when nothing changed.
    pub fn build(self) -> Option<JsonPatch> {
        if self.patch.is_empty() {
            None
        } else {
            Some(self.patch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_fields_produce_empty_diff() {
        let diff = DiffBuilder::new()
            .field("is_active", &true, &true)
            .field("rate_limit", &5000u32, &5000u32)
            .field("resource_policy", &"default", &"default")
            .build();
        assert!(diff.is_none());
    }

    #[test]
    fn test_changed_fields_only() {
        let patch = DiffBuilder::new()
            .field("is_active", &false, &true)
            .field("rate_limit", &5000u32, &5000u32)
            .build()
            .unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.get("is_active"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_optional_fields() {
        let patch = DiffBuilder::new()
            .field("shared_memory", &Some(1024u64), &None)
            .build()
            .unwrap();
        assert_eq!(patch.get("shared_memory"), Some(&Value::from(1024u64)));
    }
}
