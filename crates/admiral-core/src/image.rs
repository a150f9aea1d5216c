//! Environment image rows and name/tag parsing conventions
//!
//! Image identity is the composite key (registry, name, tag, architecture).
//! Display fields are derived by string-splitting conventions: the name's
//! path segments yield namespace and language, the tag splits on `-` into a
//! base version followed by requirement tokens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::slot::SlotValue;

/// Per-image resource limit (key, min, max).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimit {
    pub key: String,
    pub min: SlotValue,
    pub max: SlotValue,
}

/// An environment image row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRow {
    pub registry: String,
    pub name: String,
    pub tag: String,
    pub architecture: String,
    pub digest: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub resource_limits: Vec<ResourceLimit>,
    pub installed: bool,
    // Derived display fields
    pub namespace: Option<String>,
    pub lang: String,
    pub base_version: String,
    pub requirements: Vec<String>,
}

impl ImageRow {
    /// Build a row, deriving the display fields from name and tag.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: impl Into<String>,
        name: impl Into<String>,
        tag: impl Into<String>,
        architecture: impl Into<String>,
        digest: Option<String>,
        labels: BTreeMap<String, String>,
        resource_limits: Vec<ResourceLimit>,
        installed: bool,
    ) -> Self {
        let name = name.into();
        let tag = tag.into();
        let (namespace, lang) = parse_image_name(&name);
        let (base_version, requirements) = parse_image_tag(&tag);
        Self {
            registry: registry.into(),
            name,
            tag,
            architecture: architecture.into(),
            digest,
            labels,
            resource_limits,
            installed,
            namespace,
            lang,
            base_version,
            requirements,
        }
    }

    /// Full reference, `registry/name:tag`.
    pub fn reference(&self) -> String {
        format!("{}/{}:{}", self.registry, self.name, self.tag)
    }
}

/// Split an image name into (namespace, language).
///
/// `"stable/python"` → `(Some("stable"), "python")`; a bare `"python"` has
/// no namespace. Deeper paths keep everything before the last segment as
/// the namespace.
pub fn parse_image_name(name: &str) -> (Option<String>, String) {
    match name.rsplit_once('/') {
        Some((namespace, lang)) => (Some(namespace.to_string()), lang.to_string()),
        None => (None, name.to_string()),
    }
}

/// Split a tag on `-` into (base version, requirement tokens).
///
/// `"3.9-ubuntu20.04-cuda11.3"` → `("3.9", ["ubuntu20.04", "cuda11.3"])`.
/// An empty tag yields an empty base version and no tokens.
pub fn parse_image_tag(tag: &str) -> (String, Vec<String>) {
    let mut parts = tag.split('-').filter(|p| !p.is_empty());
    let base_version = parts.next().unwrap_or("").to_string();
    let requirements = parts.map(str::to_string).collect();
    (base_version, requirements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_with_namespace() {
        assert_eq!(
            parse_image_name("stable/python"),
            (Some("stable".to_string()), "python".to_string())
        );
    }

    #[test]
    fn test_parse_name_bare() {
        assert_eq!(parse_image_name("python"), (None, "python".to_string()));
    }

    #[test]
    fn test_parse_name_deep_path() {
        assert_eq!(
            parse_image_name("lab/nightly/tensorflow"),
            (Some("lab/nightly".to_string()), "tensorflow".to_string())
        );
    }

    #[test]
    fn test_parse_tag_with_requirements() {
        let (base, reqs) = parse_image_tag("3.9-ubuntu20.04-cuda11.3");
        assert_eq!(base, "3.9");
        assert_eq!(reqs, vec!["ubuntu20.04", "cuda11.3"]);
    }

    #[test]
    fn test_parse_tag_plain_version() {
        let (base, reqs) = parse_image_tag("latest");
        assert_eq!(base, "latest");
        assert!(reqs.is_empty());
    }

    #[test]
    fn test_parse_tag_empty() {
        let (base, reqs) = parse_image_tag("");
        assert_eq!(base, "");
        assert!(reqs.is_empty());
    }

    #[test]
    fn test_row_derivation_and_reference() {
        let row = ImageRow::new(
            "cr.example.io",
            "stable/python",
            "3.11-ubuntu22.04",
            "x86_64",
            None,
            BTreeMap::new(),
            vec![],
            true,
        );
        assert_eq!(row.namespace.as_deref(), Some("stable"));
        assert_eq!(row.lang, "python");
        assert_eq!(row.base_version, "3.11");
        assert_eq!(row.requirements, vec!["ubuntu22.04"]);
        assert_eq!(row.reference(), "cr.example.io/stable/python:3.11-ubuntu22.04");
    }
}
