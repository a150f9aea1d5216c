//! Configuration file parsing for Admiral
//!
//! Supports `~/.config/admiral/config.toml` with connection, UI and
//! polling sections. Missing or unparseable files fall back to defaults.

pub mod settings;

pub use settings::{
    config_file_path, init_config_dir, load_settings, save_settings, ConnectionSettings,
    PollingSettings, Settings, UiSettings,
};
