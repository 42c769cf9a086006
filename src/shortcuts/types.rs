//! Core shortcut types and platform-aware display.
//!
//! This module provides:
//! - `ShortcutName` - the caller-chosen identifier of a shortcut
//! - `ModifierSet` - modifier flags, encoded with the Win32 `RegisterHotKey` bits
//! - `KeyDescriptor` - a validated (modifiers, virtual-key code) pair
//! - Platform-aware display (⌃⌥N on macOS, Ctrl+Alt+N on Windows/Linux)

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::HotkeyError;

/// Opaque, caller-chosen identifier of a shortcut (e.g. `"quick-note"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortcutName(String);

impl ShortcutName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ShortcutName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ShortcutName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShortcutName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ShortcutName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for ShortcutName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ShortcutName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for ShortcutName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

bitflags! {
    /// Modifier keys of a global hotkey.
    ///
    /// Bit values match the Win32 `RegisterHotKey` `fsModifiers` argument.
    /// `NO_REPEAT` is never chosen by callers; the codec always adds it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModifierSet: u32 {
        const ALT = 0x0001;
        const CONTROL = 0x0002;
        const SHIFT = 0x0004;
        /// Windows key on Windows, Command (⌘) on macOS, Super on Linux
        const META = 0x0008;
        const NO_REPEAT = 0x4000;
    }
}

impl ModifierSet {
    /// Build a set from the four boolean flags of the host-facing API.
    pub fn from_flags(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut set = Self::empty();
        set.set(Self::CONTROL, ctrl);
        set.set(Self::SHIFT, shift);
        set.set(Self::ALT, alt);
        set.set(Self::META, meta);
        set
    }

    /// Build a set from modifier names as they appear in configuration files.
    ///
    /// Names are case-insensitive. Unknown names are rejected rather than ignored.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, HotkeyError> {
        let mut set = Self::empty();
        for name in names {
            let name = name.as_ref();
            set |= match name.trim().to_lowercase().as_str() {
                "ctrl" | "control" | "ctl" | "^" => Self::CONTROL,
                "shift" | "shft" | "⇧" => Self::SHIFT,
                "alt" | "opt" | "option" | "⌥" => Self::ALT,
                "meta" | "cmd" | "command" | "super" | "win" | "⌘" => Self::META,
                _ => return Err(HotkeyError::InvalidModifier(name.to_string())),
            };
        }
        Ok(set)
    }

}

/// Platform enum for display formatting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        {
            Platform::MacOS
        }
        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Platform::Linux
        }
    }
}

/// A codec-validated hotkey: modifier set plus platform virtual-key code.
///
/// Only [`crate::shortcuts::encode`] constructs these, so every descriptor
/// carries `NO_REPEAT` and a key code inside the supported vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyDescriptor {
    modifiers: ModifierSet,
    key_code: u32,
}

impl KeyDescriptor {
    pub(crate) fn from_parts(modifiers: ModifierSet, key_code: u32) -> Self {
        Self {
            modifiers: modifiers | ModifierSet::NO_REPEAT,
            key_code,
        }
    }

    /// Full modifier encoding, including `NO_REPEAT`.
    pub fn modifiers(&self) -> ModifierSet {
        self.modifiers
    }

    /// Win32 virtual-key code (`VK_A`..`VK_Z`, `VK_0`..`VK_9`).
    pub fn key_code(&self) -> u32 {
        self.key_code
    }

    /// The key as the upper-case character it was encoded from.
    pub fn key_char(&self) -> char {
        char::from_u32(self.key_code).unwrap_or('?')
    }

    pub fn display_for_platform(&self, platform: Platform) -> String {
        match platform {
            Platform::MacOS => self.display_macos(),
            Platform::Windows | Platform::Linux => self.display_other(platform),
        }
    }

    fn display_macos(&self) -> String {
        let mut s = String::new();
        if self.modifiers.contains(ModifierSet::CONTROL) {
            s.push('⌃');
        }
        if self.modifiers.contains(ModifierSet::ALT) {
            s.push('⌥');
        }
        if self.modifiers.contains(ModifierSet::SHIFT) {
            s.push('⇧');
        }
        if self.modifiers.contains(ModifierSet::META) {
            s.push('⌘');
        }
        s.push(self.key_char());
        s
    }

    fn display_other(&self, platform: Platform) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.contains(ModifierSet::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(ModifierSet::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(ModifierSet::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.modifiers.contains(ModifierSet::META) {
            let meta = match platform {
                Platform::Windows => "Win",
                _ => "Super",
            };
            parts.push(meta.to_string());
        }
        parts.push(self.key_char().to_string());
        parts.join("+")
    }
}

/// Platform-neutral text form used in logs and errors: `Ctrl+Alt+Shift+Meta+N`.
impl fmt::Display for KeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = [
            (ModifierSet::CONTROL, "Ctrl"),
            (ModifierSet::ALT, "Alt"),
            (ModifierSet::SHIFT, "Shift"),
            (ModifierSet::META, "Meta"),
        ];
        for (flag, label) in labels {
            if self.modifiers.contains(flag) {
                write!(f, "{}+", label)?;
            }
        }
        write!(f, "{}", self.key_char())
    }
}
