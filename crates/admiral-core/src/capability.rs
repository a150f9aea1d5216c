//! Server capability probing
//!
//! The cluster manager advertises optional features by name. The set is
//! resolved once at connect time and carried on the application state;
//! views read it instead of probing the client ad hoc.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A server feature the console can take advantage of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Users can designate one keypair as their main access key
    MainAccessKey,
    /// TOTP-based two-factor authentication
    TwoFactorAuth,
    /// Per-session lifetime limits in resource policies
    SessionLifetime,
    /// Legacy max-vfolder-count field still present in keypair policies
    DeprecatedMaxVfolderCount,
}

impl Capability {
    /// Parse a wire feature name. Unknown names are ignored by the caller.
    pub fn from_feature(name: &str) -> Option<Self> {
        match name {
            "main-access-key" => Some(Capability::MainAccessKey),
            "2fa" => Some(Capability::TwoFactorAuth),
            "session-lifetime" => Some(Capability::SessionLifetime),
            "deprecated-max-vfolder-count-in-keypair-resource-policy" => {
                Some(Capability::DeprecatedMaxVfolderCount)
            }
            _ => None,
        }
    }

    pub fn feature_name(&self) -> &'static str {
        match self {
            Capability::MainAccessKey => "main-access-key",
            Capability::TwoFactorAuth => "2fa",
            Capability::SessionLifetime => "session-lifetime",
            Capability::DeprecatedMaxVfolderCount => {
                "deprecated-max-vfolder-count-in-keypair-resource-policy"
            }
        }
    }
}

/// Role flags plus the feature set, resolved once per connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    pub is_admin: bool,
    pub is_superadmin: bool,
    caps: HashSet<Capability>,
}

impl CapabilitySet {
    /// Build from role flags and the advertised feature names.
    /// Unrecognized names are dropped.
    pub fn resolve<'a>(
        is_admin: bool,
        is_superadmin: bool,
        features: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let caps = features
            .into_iter()
            .filter_map(Capability::from_feature)
            .collect();
        Self {
            is_admin,
            is_superadmin,
            caps,
        }
    }

    pub fn supports(&self, cap: Capability) -> bool {
        self.caps.contains(&cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_and_unknown_features() {
        let caps = CapabilitySet::resolve(true, false, ["main-access-key", "2fa", "warp-drive"]);
        assert!(caps.is_admin);
        assert!(!caps.is_superadmin);
        assert!(caps.supports(Capability::MainAccessKey));
        assert!(caps.supports(Capability::TwoFactorAuth));
        assert!(!caps.supports(Capability::SessionLifetime));
    }

    #[test]
    fn test_feature_name_roundtrip() {
        for cap in [
            Capability::MainAccessKey,
            Capability::TwoFactorAuth,
            Capability::SessionLifetime,
            Capability::DeprecatedMaxVfolderCount,
        ] {
            assert_eq!(Capability::from_feature(cap.feature_name()), Some(cap));
        }
    }

    #[test]
    fn test_default_set_supports_nothing() {
        let caps = CapabilitySet::default();
        assert!(!caps.supports(Capability::MainAccessKey));
        assert!(!caps.is_admin);
    }
}
