use super::*;
use crate::error::HotkeyError;
use crate::hotkeys::SlotPolicy;
use crate::shortcuts::ModifierSet;
use std::fs;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.slots.first, 1);
    assert_eq!(config.slots.last, 0xBFFF);
    assert!(!config.slots.recycle);
    assert_eq!(config.event_buffer, DEFAULT_EVENT_BUFFER);
    assert_eq!(config.log_filter, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_shortcuts() {
    let config = Config::default();
    let names: Vec<&str> = config.shortcuts.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "overlay:show",
            "rotation:next",
            "rotation:toggle",
            "settings:open",
            "window:toggle"
        ]
    );

    let overlay = config
        .shortcuts
        .iter()
        .find(|binding| binding.name == "overlay:show")
        .unwrap();
    let descriptor = overlay.descriptor().unwrap();
    assert_eq!(descriptor.key_code(), 0x51);
    assert_eq!(
        descriptor.modifiers() - ModifierSet::NO_REPEAT,
        ModifierSet::CONTROL | ModifierSet::SHIFT
    );
}

#[test]
fn test_empty_json_uses_defaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_camel_case_fields() {
    let json = r#"{
        "slots": { "first": 256, "last": 511, "recycle": true },
        "eventBuffer": 4,
        "logFilter": "hotkey_bridge=debug",
        "shortcuts": [
            { "name": "quick-note", "key": "n", "modifiers": ["ctrl", "alt"] }
        ]
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.slots.first, 256);
    assert_eq!(config.slots.last, 511);
    assert_eq!(config.slots.policy(), SlotPolicy::Recycle);
    assert_eq!(config.event_buffer, 4);
    assert_eq!(config.log_filter.as_deref(), Some("hotkey_bridge=debug"));
    assert_eq!(config.shortcuts.len(), 1);
    assert_eq!(config.shortcuts[0].description, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_slot_config() {
    let config: Config = serde_json::from_str(r#"{"slots": {"last": 16}}"#).unwrap();
    assert_eq!(config.slots.first, 1);
    assert_eq!(config.slots.last, 16);
    let mut slots = config.slots.allocator();
    for expected in 1..=16u16 {
        assert_eq!(slots.allocate().unwrap().get(), expected);
    }
    assert!(slots.allocate().is_err());
}

#[test]
fn test_serialization_skips_empty_options() {
    let json = serde_json::to_string(&Config::default()).unwrap();
    assert!(json.contains("\"eventBuffer\":32"));
    assert!(!json.contains("logFilter"));
}

// ============================================
// validate
// ============================================

fn config_with_slots(first: u16, last: u16) -> Config {
    Config {
        slots: SlotConfig {
            first,
            last,
            recycle: false,
        },
        ..Config::default()
    }
}

#[test]
fn test_validate_rejects_bad_slot_ranges() {
    assert!(config_with_slots(0, 10).validate().is_err());
    assert!(config_with_slots(10, 9).validate().is_err());
    assert!(config_with_slots(1, 0xC000).validate().is_err());
    assert!(config_with_slots(5, 5).validate().is_ok());
}

#[test]
fn test_validate_rejects_zero_event_buffer() {
    let config = Config {
        event_buffer: 0,
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(HotkeyError::Config(_))));
}

#[test]
fn test_validate_rejects_duplicate_names() {
    let config = Config {
        shortcuts: vec![
            ShortcutBinding::new("a", "a", &["ctrl"]),
            ShortcutBinding::new("a", "b", &["ctrl"]),
        ],
        ..Config::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn test_validate_rejects_shared_combinations() {
    let config = Config {
        shortcuts: vec![
            ShortcutBinding::new("a", "n", &["ctrl", "alt"]),
            ShortcutBinding::new("b", "N", &["alt", "control"]),
        ],
        ..Config::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, HotkeyError::Config(_)));
    let text = err.to_string();
    assert!(text.contains("'a'"));
    assert!(text.contains("'b'"));
    assert!(text.contains("Ctrl+Alt+N"));
}

#[test]
fn test_validate_rejects_unencodable_bindings() {
    let bad_key = Config {
        shortcuts: vec![ShortcutBinding::new("a", "F5", &["ctrl"])],
        ..Config::default()
    };
    assert!(bad_key.validate().is_err());

    let bad_modifier = Config {
        shortcuts: vec![ShortcutBinding::new("a", "a", &["hyper"])],
        ..Config::default()
    };
    let err = bad_modifier.validate().unwrap_err();
    assert!(err.to_string().contains("hyper"));
}

// ============================================
// loader
// ============================================

#[test]
fn test_load_missing_file_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(&dir.path().join("missing.json"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_invalid_json_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    assert_eq!(load_config(&path), Config::default());
    assert!(matches!(try_load_config(&path), Err(HotkeyError::Config(_))));
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"eventBuffer": 0}"#).unwrap();

    assert!(try_load_config(&path).is_err());
    assert_eq!(load_config(&path), Config::default());
}

#[test]
fn test_missing_key_error_has_hint() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"shortcuts": [{"name": "a"}]}"#).unwrap();

    let err = try_load_config(&path).unwrap_err();
    assert!(err.to_string().contains("quick-note"));
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let mut config = Config::default();
    config.log_filter = Some("debug".to_string());
    config.shortcuts.push(ShortcutBinding::new("quick-note", "N", &["ctrl", "alt"]));

    save_config(&path, &config).unwrap();
    assert_eq!(try_load_config(&path).unwrap(), config);
}

#[test]
fn test_default_config_path() {
    let path = default_config_path();
    assert!(path.ends_with(".hotkey-bridge/config.json"));
}
