//! admiral-app - Application state and orchestration for Admiral
//!
//! This crate implements the TEA (The Elm Architecture) pattern for state
//! management: a `Message` enum, a pure-ish `update()` function, and an
//! `Engine` that owns the message channel, the API client handle, the
//! cross-view event bus, and the summary poller. Every API call runs in a
//! spawned task whose completion comes back as a message; view state is
//! only ever touched inside `update()`.

pub mod bus;
pub mod config;
pub mod confirm_dialog;
pub mod dialogs;
pub mod diff;
pub mod engine;
pub mod forms;
pub mod handler;
pub mod input_key;
pub mod message;
pub mod poll;
pub mod process;
pub mod state;
pub mod toast;

// Re-export primary types
pub use bus::EventBus;
pub use engine::Engine;
pub use handler::{update, UpdateAction, UpdateResult};
pub use input_key::InputKey;
pub use message::Message;
pub use state::{AppState, Phase, View};
pub use toast::{Toast, ToastSeverity};
