use super::*;
use crate::shortcuts::Platform;

#[test]
fn letters_are_case_insensitive() {
    let mods = ModifierSet::CONTROL | ModifierSet::SHIFT;
    for (lower, upper) in ('a'..='z').zip('A'..='Z') {
        let a = encode(mods, &lower.to_string()).unwrap();
        let b = encode(mods, &upper.to_string()).unwrap();
        assert_eq!(a, b, "{} vs {}", lower, upper);
        assert_eq!(a.key_code(), upper as u32);
    }
}

#[test]
fn encode_is_deterministic() {
    let mods = ModifierSet::ALT;
    assert_eq!(encode(mods, "q").unwrap(), encode(mods, "q").unwrap());
}

#[test]
fn digits_map_to_virtual_key_codes() {
    assert_eq!(key_code_for("0"), Some(0x30));
    assert_eq!(key_code_for("9"), Some(0x39));
    assert_eq!(encode(ModifierSet::empty(), "5").unwrap().key_code(), 0x35);
}

#[test]
fn letters_map_to_virtual_key_codes() {
    assert_eq!(key_code_for("a"), Some(0x41));
    assert_eq!(key_code_for("Z"), Some(0x5A));
}

#[test]
fn no_repeat_is_always_added() {
    let plain = encode(ModifierSet::empty(), "k").unwrap();
    assert!(plain.modifiers().contains(ModifierSet::NO_REPEAT));

    let already = encode(ModifierSet::CONTROL | ModifierSet::NO_REPEAT, "k").unwrap();
    let without = encode(ModifierSet::CONTROL, "k").unwrap();
    assert_eq!(already, without);
    assert_eq!(without.modifiers().bits(), 0x4000 | 0x0002);
}

#[test]
fn modifiers_take_part_in_equality() {
    let ctrl = encode(ModifierSet::CONTROL, "n").unwrap();
    let alt = encode(ModifierSet::ALT, "n").unwrap();
    assert_ne!(ctrl, alt);
}

#[test]
fn rejects_symbols_outside_vocabulary() {
    for symbol in ["", "AB", "F1", "f12", "space", ";", "-", " ", " a", "é", "ß", "\n"] {
        match encode(ModifierSet::CONTROL, symbol) {
            Err(HotkeyError::InvalidKey(s)) => assert_eq!(s, symbol),
            other => panic!("expected InvalidKey for {:?}, got {:?}", symbol, other),
        }
        assert!(key_code_for(symbol).is_none());
    }
}

#[test]
fn modifier_flags_use_win32_bits() {
    assert_eq!(ModifierSet::ALT.bits(), 0x0001);
    assert_eq!(ModifierSet::CONTROL.bits(), 0x0002);
    assert_eq!(ModifierSet::SHIFT.bits(), 0x0004);
    assert_eq!(ModifierSet::META.bits(), 0x0008);
    assert_eq!(ModifierSet::NO_REPEAT.bits(), 0x4000);
}

#[test]
fn from_flags_matches_host_arguments() {
    let set = ModifierSet::from_flags(true, false, true, false);
    assert_eq!(set, ModifierSet::CONTROL | ModifierSet::ALT);
    assert!(ModifierSet::from_flags(false, false, false, false).is_empty());
}

#[test]
fn from_names_accepts_aliases() {
    let set = ModifierSet::from_names(&["Ctrl", "option", "CMD", "shift"]).unwrap();
    assert_eq!(
        set,
        ModifierSet::CONTROL | ModifierSet::ALT | ModifierSet::META | ModifierSet::SHIFT
    );
}

#[test]
fn from_names_rejects_unknown() {
    assert_eq!(
        ModifierSet::from_names(&["ctrl", "hyper"]),
        Err(HotkeyError::InvalidModifier("hyper".to_string()))
    );
}

#[test]
fn display_forms() {
    let descriptor = encode(ModifierSet::CONTROL | ModifierSet::ALT, "n").unwrap();
    assert_eq!(descriptor.to_string(), "Ctrl+Alt+N");
    assert_eq!(descriptor.display_for_platform(Platform::MacOS), "⌃⌥N");
    assert_eq!(descriptor.display_for_platform(Platform::Windows), "Ctrl+Alt+N");

    let meta = encode(ModifierSet::META | ModifierSet::SHIFT, "7").unwrap();
    assert_eq!(meta.to_string(), "Shift+Meta+7");
    assert_eq!(meta.display_for_platform(Platform::Windows), "Shift+Win+7");
    assert_eq!(meta.display_for_platform(Platform::Linux), "Shift+Super+7");
    assert_eq!(meta.display_for_platform(Platform::MacOS), "⇧⌘7");
}
