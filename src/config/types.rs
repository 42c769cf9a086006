//! Configuration type definitions
//!
//! This module contains all the struct definitions for configuration.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::defaults::*;
use crate::error::HotkeyError;
use crate::hotkeys::{SlotAllocator, SlotPolicy, LAST_SLOT};
use crate::shortcuts::{encode, KeyDescriptor, ModifierSet};

// ============================================
// SLOT CONFIG
// ============================================

/// Range and reuse policy of hotkey slot ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotConfig {
    /// First id handed out (default: 1)
    #[serde(default = "default_first_slot")]
    pub first: u16,
    /// Last id handed out (default: 0xBFFF)
    #[serde(default = "default_last_slot")]
    pub last: u16,
    /// Reuse freed ids, lowest first (default: false)
    #[serde(default = "default_recycle_slots")]
    pub recycle: bool,
}

fn default_first_slot() -> u16 {
    DEFAULT_FIRST_SLOT
}
fn default_last_slot() -> u16 {
    DEFAULT_LAST_SLOT
}
fn default_recycle_slots() -> bool {
    DEFAULT_RECYCLE_SLOTS
}

impl Default for SlotConfig {
    fn default() -> Self {
        SlotConfig {
            first: DEFAULT_FIRST_SLOT,
            last: DEFAULT_LAST_SLOT,
            recycle: DEFAULT_RECYCLE_SLOTS,
        }
    }
}

impl SlotConfig {
    pub fn policy(&self) -> SlotPolicy {
        if self.recycle {
            SlotPolicy::Recycle
        } else {
            SlotPolicy::Monotonic
        }
    }

    pub fn allocator(&self) -> SlotAllocator {
        SlotAllocator::from_config(self)
    }
}

// ============================================
// SHORTCUT BINDING
// ============================================

/// A named shortcut as written in the config file
///
/// ```json
/// { "name": "quick-note", "key": "N", "modifiers": ["ctrl", "alt"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutBinding {
    pub name: String,
    /// Single letter or digit
    pub key: String,
    /// Modifier names: "ctrl", "shift", "alt", "meta" (and aliases)
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ShortcutBinding {
    pub fn new(name: &str, key: &str, modifiers: &[&str]) -> Self {
        ShortcutBinding {
            name: name.to_string(),
            key: key.to_string(),
            modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
            description: None,
        }
    }

    pub fn modifier_set(&self) -> Result<ModifierSet, HotkeyError> {
        ModifierSet::from_names(self.modifiers.as_slice())
    }

    /// Encode the binding into the descriptor the registry binds.
    pub fn descriptor(&self) -> Result<KeyDescriptor, HotkeyError> {
        encode(self.modifier_set()?, &self.key)
    }
}

fn default_shortcuts() -> Vec<ShortcutBinding> {
    DEFAULT_SHORTCUTS
        .iter()
        .map(|(name, key, modifiers, description)| ShortcutBinding {
            description: Some(description.to_string()),
            ..ShortcutBinding::new(name, key, modifiers)
        })
        .collect()
}

// ============================================
// MAIN CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub slots: SlotConfig,
    /// Capacity of the activation channel (default: 32)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// tracing filter directive; RUST_LOG overrides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    #[serde(default = "default_shortcuts")]
    pub shortcuts: Vec<ShortcutBinding>,
}

fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}

impl Default for Config {
    fn default() -> Self {
        Config {
            slots: SlotConfig::default(),
            event_buffer: DEFAULT_EVENT_BUFFER,
            log_filter: None,
            shortcuts: default_shortcuts(),
        }
    }
}

impl Config {
    /// Check the config for values the subsystem cannot run with.
    pub fn validate(&self) -> Result<(), HotkeyError> {
        let SlotConfig { first, last, .. } = self.slots;
        if first == 0 {
            return Err(HotkeyError::Config("slot 0 is reserved".to_string()));
        }
        if first > last {
            return Err(HotkeyError::Config(format!(
                "slot range {}..={} is empty",
                first, last
            )));
        }
        if last > LAST_SLOT {
            return Err(HotkeyError::Config(format!(
                "slot {:#06X} is beyond the application range (max {:#06X})",
                last, LAST_SLOT
            )));
        }
        if self.event_buffer == 0 {
            return Err(HotkeyError::Config(
                "eventBuffer must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut combinations: HashMap<KeyDescriptor, &str> = HashMap::new();
        for binding in &self.shortcuts {
            if !seen.insert(binding.name.as_str()) {
                return Err(HotkeyError::Config(format!(
                    "shortcut '{}' is defined more than once",
                    binding.name
                )));
            }
            let descriptor = binding.descriptor().map_err(|e| {
                HotkeyError::Config(format!("shortcut '{}': {}", binding.name, e))
            })?;
            // Registering both would silently evict the earlier one
            if let Some(first) = combinations.insert(descriptor, binding.name.as_str()) {
                return Err(HotkeyError::Config(format!(
                    "shortcuts '{}' and '{}' both use {}",
                    first, binding.name, descriptor
                )));
            }
        }
        Ok(())
    }
}
