//! Configuration module - slot range, activation buffer and default shortcuts
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.hotkey-bridge/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, SlotConfig, ShortcutBinding)
//! - `loader` - File system loading and saving

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_EVENT_BUFFER, DEFAULT_SHORTCUTS};

pub use types::{Config, ShortcutBinding, SlotConfig};

pub use loader::{default_config_path, load_config, save_config, try_load_config};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
