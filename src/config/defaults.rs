//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

use crate::hotkeys::{FIRST_SLOT, LAST_SLOT};

/// Default slot range: the whole application hotkey id space
pub const DEFAULT_FIRST_SLOT: u16 = FIRST_SLOT;
pub const DEFAULT_LAST_SLOT: u16 = LAST_SLOT;

/// Freed slots are not reused unless the config opts in
pub const DEFAULT_RECYCLE_SLOTS: bool = false;

/// Capacity of the activation channel handed to subscribers
pub const DEFAULT_EVENT_BUFFER: usize = 32;

/// Config file location, relative to the home directory
pub const CONFIG_DIR_NAME: &str = ".hotkey-bridge";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Shortcuts registered at startup: (name, key, modifiers, description).
pub const DEFAULT_SHORTCUTS: &[(&str, &str, &[&str], &str)] = &[
    ("overlay:show", "Q", &["ctrl", "shift"], "Show the overlay"),
    ("rotation:next", "N", &["ctrl", "shift"], "Advance to the next item"),
    ("rotation:toggle", "P", &["ctrl", "shift"], "Pause or resume rotation"),
    ("settings:open", "S", &["ctrl", "shift"], "Open settings"),
    ("window:toggle", "W", &["ctrl", "shift"], "Show or hide the main window"),
];
