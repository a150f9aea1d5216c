//! Cross-view data-change topics
//!
//! When an action handler mutates an entity it publishes one of these on
//! the event bus instead of poking sibling views directly. Any view whose
//! data depends on the topic re-runs its refresh controller.

use serde::{Deserialize, Serialize};

/// What kind of data changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataTopic {
    /// Keypairs were created, modified or deleted
    Credentials,
    /// User accounts changed
    Users,
    /// Images changed (e.g. a registry rescan completed)
    Images,
    /// Resource presets changed
    Presets,
    /// Registry entries or their enablement changed
    Registries,
    /// Resource policies changed
    Policies,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_are_distinct() {
        assert_ne!(DataTopic::Credentials, DataTopic::Users);
        assert_ne!(DataTopic::Images, DataTopic::Registries);
    }
}
