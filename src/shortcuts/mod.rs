//! Shortcut descriptions and the key symbol codec.
//!
//! This module provides:
//! - Shortcut names and modifier sets
//! - The codec that validates a key symbol and produces a `KeyDescriptor`
//! - Platform-aware display formatting
//!
//! # Example
//!
//! ```
//! use hotkey_bridge::shortcuts::{encode, ModifierSet};
//!
//! let descriptor = encode(ModifierSet::CONTROL | ModifierSet::ALT, "n").unwrap();
//! assert_eq!(descriptor.to_string(), "Ctrl+Alt+N");
//! ```

mod codec;
mod types;

pub use codec::{encode, key_code_for};
pub use types::{KeyDescriptor, ModifierSet, Platform, ShortcutName};
