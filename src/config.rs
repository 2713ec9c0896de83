//! TOML-based configuration system.
//!
//! Loads settings from a `config.toml` file, falling back to defaults.
//! Every struct implements `Default` so a missing or partial config file
//! behaves the same as no file at all. The loaded config seeds the
//! in-memory preference store
//! ([`MemoryPrefStore::from_config`](crate::prefs::MemoryPrefStore::from_config))
//! for embedders without a host preference service.
//!
//! ## Config file search order
//!
//! 1. `SURIVEIL_CONFIG` environment variable (explicit override)
//! 2. Next to the executable (`<exe_dir>/config.toml`)
//! 3. Platform config directory (`%APPDATA%\SuriVeil\config.toml` on Windows)
//! 4. Current working directory (`./config.toml`)
//! 5. No file found → `Config::default()`

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub privacy: PrivacyPrefs,
}

/// Private-mode behavior toggles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyPrefs {
    /// Enter private mode automatically at startup.
    pub autostart: bool,
    /// Keep the current session when entering private mode instead of
    /// snapshotting it and loading the placeholder sessions.
    pub keep_current_session: bool,
}

impl Config {
    /// Loads configuration from a TOML file. Never panics — returns
    /// defaults if no file is found or if parsing fails.
    pub fn load() -> Self {
        match find_config_path() {
            Some(path) => match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str::<Config>(&content) {
                    Ok(config) => {
                        info!(path = %path.display(), "Configuration loaded");
                        config
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                        Config::default()
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
                    Config::default()
                }
            },
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        }
    }

    /// Saves configuration to the platform config directory.
    /// Creates the directory if it doesn't exist.
    pub fn save(&self) -> io::Result<()> {
        let path = save_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(&path, content)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }
}

/// Searches for a config file in the standard locations.
fn find_config_path() -> Option<PathBuf> {
    // 1. Explicit env var override
    if let Ok(path) = std::env::var("SURIVEIL_CONFIG") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
    }

    // 2. Next to the executable
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 3. Platform config directory
    if let Some(dir) = platform_config_dir() {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 4. Current working directory
    let p = PathBuf::from("config.toml");
    if p.is_file() {
        return Some(p);
    }

    None
}

/// Returns the platform-specific save path for the config file.
fn save_path() -> PathBuf {
    platform_config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

/// Returns the platform config directory without adding a dependency.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join("SuriVeil"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .or_else(|| std::env::var("HOME").ok().map(|h| format!("{h}/.config")))
            .map(|dir| PathBuf::from(dir).join("suriveil"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert!(!c.privacy.autostart);
        assert!(!c.privacy.keep_current_session);
    }

    #[test]
    fn test_empty_toml_returns_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(!config.privacy.autostart);
        assert!(!config.privacy.keep_current_session);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
[privacy]
autostart = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.privacy.autostart);
        assert!(!config.privacy.keep_current_session); // default
    }

    #[test]
    fn test_full_toml_roundtrip() {
        let mut config = Config::default();
        config.privacy.keep_current_session = true;
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert!(deserialized.privacy.keep_current_session);
        assert!(!deserialized.privacy.autostart);
    }

    #[test]
    fn test_save_path_not_empty() {
        let path = save_path();
        assert!(!path.as_os_str().is_empty());
    }
}
