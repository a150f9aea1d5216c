//! # admiral-client - Cluster Manager API Client
//!
//! The external collaborator behind every view: a trait-shaped API client
//! (`ClusterApi`) with an HTTP implementation, wire DTO decoding, the
//! uniform `{ok, msg}` mutation outcome, and the background-task event
//! stream used by long-running server jobs (registry rescans).
//!
//! The client is constructed once at process start and passed down as
//! `Arc<dyn ClusterApi>`; nothing in the application reaches for a global.

pub mod api;
pub mod bgtask;
pub mod http;
pub mod protocol;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use api::{
    ClusterApi, ConnectInfo, Credentials, JsonPatch, KeypairCreate, PresetPayload, RegistryPayload,
    UserCreate,
};
pub use bgtask::{BgTaskEvent, BgTaskStream};
pub use http::HttpClusterApi;
pub use protocol::MutationOutcome;
