//! Configuration loading from file system
//!
//! Reads and writes `~/.hotkey-bridge/config.json`.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use super::types::Config;
use crate::error::HotkeyError;

/// `~/.hotkey-bridge/config.json`, or a temp-dir fallback without a home.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Load and validate configuration from `path`.
pub fn try_load_config(path: &Path) -> Result<Config, HotkeyError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| HotkeyError::Config(format!("cannot read {}: {}", path.display(), e)))?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| {
        // Point at the usual mistake in hand-written shortcut entries
        let hint = if e.to_string().contains("missing field `key`") {
            " (each shortcut needs \"name\" and \"key\", e.g. {\"name\": \"quick-note\", \"key\": \"N\", \"modifiers\": [\"ctrl\", \"alt\"]})"
        } else {
            ""
        };
        HotkeyError::Config(format!("invalid JSON in {}: {}{}", path.display(), e, hint))
    })?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from `path`.
///
/// Returns `Config::default()` when the file is missing or invalid.
#[instrument(name = "load_config", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    match try_load_config(path) {
        Ok(config) => {
            info!(shortcuts = config.shortcuts.len(), "Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    }
}

/// Write `config` as pretty JSON, creating parent directories.
pub fn save_config(path: &Path, config: &Config) -> Result<(), HotkeyError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            HotkeyError::Config(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| HotkeyError::Config(format!("cannot serialize config: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| HotkeyError::Config(format!("cannot write {}: {}", path.display(), e)))?;
    info!(path = %path.display(), "Saved config");
    Ok(())
}
