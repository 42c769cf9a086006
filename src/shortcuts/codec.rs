//! Key symbol codec.
//!
//! Turns a (modifiers, key symbol) request into a [`KeyDescriptor`]. The
//! vocabulary is one ASCII letter (any case) or one digit.
//! Function keys, punctuation and numpad keys are rejected, not guessed.

use crate::error::HotkeyError;

use super::types::{KeyDescriptor, ModifierSet};

/// Encode a symbolic hotkey request.
///
/// Letters are upper-cased before mapping, so `"n"` and `"N"` produce the same
/// descriptor. `NO_REPEAT` is always added so holding the key fires once.
pub fn encode(modifiers: ModifierSet, key_symbol: &str) -> Result<KeyDescriptor, HotkeyError> {
    let key_code =
        key_code_for(key_symbol).ok_or_else(|| HotkeyError::InvalidKey(key_symbol.to_string()))?;
    Ok(KeyDescriptor::from_parts(modifiers, key_code))
}

/// Map a key symbol to its Win32 virtual-key code.
///
/// `VK_A`..`VK_Z` are 0x41..0x5A and `VK_0`..`VK_9` are 0x30..0x39, i.e. the
/// upper-case ASCII code of the symbol.
pub fn key_code_for(key_symbol: &str) -> Option<u32> {
    let mut chars = key_symbol.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };

    if c.is_ascii_alphabetic() {
        Some(c.to_ascii_uppercase() as u32)
    } else if c.is_ascii_digit() {
        Some(c as u32)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
