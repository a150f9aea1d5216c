//! admiral-tui - Terminal UI for Admiral
//!
//! The ratatui-based frontend. It drives an `Engine` from admiral-app:
//! terminal events become messages, messages run through the TEA update
//! loop, and the resulting state renders every frame. Row renderers are
//! pure functions over view models.

pub mod event;
pub mod layout;
pub mod render;
pub mod runner;
pub mod terminal;
pub mod theme;
pub mod widgets;

// Re-export main entry point
pub use runner::run;
