//! hotkey-bridge - global keyboard shortcuts for desktop applications
//!
//! This library registers application-defined shortcuts with the OS so they
//! fire without window focus, and routes each activation back to the host as
//! an event carrying the shortcut's name.

pub mod config;
pub mod error;
pub mod hotkeys;
pub mod logging;
pub mod shortcuts;

pub use error::{HotkeyError, Result};
pub use hotkeys::{ActivationEvent, HotkeyService, Registration, SlotId};
pub use shortcuts::{encode, KeyDescriptor, ModifierSet, ShortcutName};
