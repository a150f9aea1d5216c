//! # admiral-core - Core Domain Types
//!
//! Foundation crate for Admiral. Provides the view-model types shown in the
//! console, value normalization and masking helpers, the capability set
//! resolved at connect time, error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, chrono, thiserror, tracing).
//!
//! All entity types here are *view models*: ephemeral, in-memory copies of
//! data owned by the cluster manager. They are created by a list refresh and
//! discarded on the next refresh or view teardown; nothing is persisted.

pub mod capability;
pub mod error;
pub mod events;
pub mod format;
pub mod image;
pub mod logging;
pub mod slot;
pub mod types;

/// Prelude for common imports used throughout all Admiral crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use capability::{Capability, CapabilitySet};
pub use error::{Error, Result, ResultExt};
pub use events::DataTopic;
pub use format::{elapsed_days, format_bytes, mask_keep_edges, mask_keep_prefix, timestamp_display};
pub use image::{parse_image_name, parse_image_tag, ImageRow, ResourceLimit};
pub use slot::{ResourceSlots, SlotValue};
pub use types::{
    ClusterUsage, KeypairRow, ListCondition, RegistryKind, RegistryRow, ResourcePolicy,
    ResourcePreset, SessionCounts, SlotUsage, UserRole, UserRow, UserStatus,
};
