//! Settings parser for config.toml

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use admiral_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const ADMIRAL_DIR: &str = "admiral";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub ui: UiSettings,
    pub polling: PollingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Base URL of the cluster manager API
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8091/".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Mask user ids and access keys in table cells
    pub mask_sensitive: bool,
    /// Ask before quitting
    pub confirm_quit: bool,
    /// Preferred host port suggested for session services
    pub preferred_port: u16,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            mask_sensitive: true,
            confirm_quit: true,
            preferred_port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Summary panel re-poll cadence in seconds
    pub summary_interval_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            summary_interval_secs: 15,
        }
    }
}

/// Default config file location under the user config dir.
pub fn config_file_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(ADMIRAL_DIR).join(CONFIG_FILENAME)
}

/// Load settings from the given path (or the default location).
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Persist settings (used when UI preferences change).
pub fn save_settings(settings: &Settings, path: Option<&Path>) -> Result<()> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::config(format!("Failed to create config dir: {e}")))?;
    }
    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::config(format!("Failed to serialize settings: {e}")))?;
    std::fs::write(&config_path, content)
        .map_err(|e| Error::config(format!("Failed to write config.toml: {e}")))?;
    Ok(())
}

/// Create a commented default config file if none exists.
pub fn init_config_dir(path: Option<&Path>) -> Result<()> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    if config_path.exists() {
        return Ok(());
    }
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::config(format!("Failed to create config dir: {e}")))?;
    }

    let default_content = r#"# Admiral Configuration

[connection]
endpoint = "http://127.0.0.1:8091/"
access_key = ""
secret_key = ""

[ui]
mask_sensitive = true   # Mask user ids and access keys in tables
confirm_quit = true     # Ask before quitting
preferred_port = 8080

[polling]
summary_interval_secs = 15
"#;
    std::fs::write(&config_path, default_content)
        .map_err(|e| Error::config(format!("Failed to write config.toml: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_defaults() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("config.toml");
        let settings = load_settings(Some(&missing));

        assert!(settings.ui.mask_sensitive);
        assert!(settings.ui.confirm_quit);
        assert_eq!(settings.polling.summary_interval_secs, 15);
        assert_eq!(settings.connection.endpoint, "http://127.0.0.1:8091/");
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[connection]
endpoint = "https://cluster.example.io/"
access_key = "AKIAFAKE"

[ui]
mask_sensitive = false
preferred_port = 9000
"#,
        )
        .unwrap();

        let settings = load_settings(Some(&path));
        assert_eq!(settings.connection.endpoint, "https://cluster.example.io/");
        assert_eq!(settings.connection.access_key, "AKIAFAKE");
        assert!(!settings.ui.mask_sensitive);
        assert_eq!(settings.ui.preferred_port, 9000);
        // Unset sections fall back to defaults
        assert_eq!(settings.polling.summary_interval_secs, 15);
    }

    #[test]
    fn test_load_settings_malformed_falls_back() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "not valid toml [[[").unwrap();
        assert_eq!(load_settings(Some(&path)), Settings::default());
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.ui.mask_sensitive = false;
        settings.ui.preferred_port = 2222;
        save_settings(&settings, Some(&path)).unwrap();

        let reloaded = load_settings(Some(&path));
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_init_config_dir_writes_once() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        init_config_dir(Some(&path)).unwrap();
        assert!(path.exists());

        // A second init leaves the file alone
        std::fs::write(&path, "[ui]\nmask_sensitive = false\n").unwrap();
        init_config_dir(Some(&path)).unwrap();
        let settings = load_settings(Some(&path));
        assert!(!settings.ui.mask_sensitive);
    }
}
