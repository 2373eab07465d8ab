use std::fs;
use std::time::Duration;

use codepanel_settings::{LanguageCatalog, PanelConfig};
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("config.json");

    let config = PanelConfig::load(&path).expect("load defaults");
    assert_eq!(config.origin, "localhost");
    assert_eq!(config.save_delay(), Duration::from_millis(1000));
    assert_eq!(config.default_font_size, 16);
    assert_eq!(config.default_language, "javascript");
    assert_eq!(config.default_theme, "vs-dark");
}

#[test]
fn load_reads_overrides_and_builds_initial_preferences() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("config.json");
    fs::write(
        &path,
        r#"{ "origin": "play.example", "save_delay_ms": 250, "default_language": "rust" }"#,
    )
    .expect("write config");

    let config = PanelConfig::load(&path).expect("load");
    assert_eq!(config, PanelConfig {
        origin: "play.example".to_string(),
        save_delay_ms: 250,
        default_language: "rust".to_string(),
        ..PanelConfig::default()
    });
    let prefs = config.initial_preferences();
    assert_eq!(prefs.language, "rust");
    assert_eq!(prefs.font_size, 16);
}

#[test]
fn partial_legacy_file_is_sanitised_on_load() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "version": 0,
            "save_delay_ms": 0,
            "default_font_size": 3,
            "default_theme": ""
        }"#,
    )
    .expect("write legacy config");

    let config = PanelConfig::load(&path).expect("load legacy config");
    assert_eq!(config.version, 1, "legacy config should be upgraded to version 1");
    assert_eq!(
        config.save_delay_ms, 1000,
        "zero delay should fall back to the default quiet interval"
    );
    assert_eq!(config.default_font_size, 12, "font size should be clamped");
    assert_eq!(config.default_theme, "vs-dark");
}

#[test]
fn language_catalog_loads_from_file() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("languages.json");
    fs::write(
        &path,
        r#"[
            { "id": "lua", "label": "Lua", "mode": "lua", "default_code": "print('hello')\n" },
            { "id": "zig", "label": "Zig", "logo_path": "/img/zig.svg" }
        ]"#,
    )
    .expect("write catalog");

    let catalog = LanguageCatalog::load(&path).expect("load catalog");
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.default_code("lua"), "print('hello')\n");
    assert_eq!(catalog.default_code("zig"), "");
    assert_eq!(catalog.get("zig").expect("zig").logo_path, "/img/zig.svg");
}
