//! Unit tests for the JSON settings engine.

use serde_json::json;
use smart_bookmarks::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use smart_bookmarks::types::errors::SettingsError;
use smart_bookmarks::types::settings::AppSettings;
use tempfile::TempDir;

fn engine(dir: &TempDir) -> SettingsEngine {
    let path = dir.path().join("settings.json").to_string_lossy().to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_missing_file_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.store.database_path, None);
    assert_eq!(settings.realtime.channel, "realtime-dashboard");
    assert_eq!(settings.auth.provider, "google");
    assert_eq!(settings.auth.redirect_path, "/auth/callback");
    assert_eq!(settings.logging.level, "info");
    assert!(!std::path::Path::new(engine.get_config_path()).exists());
}

#[test]
fn test_set_value_writes_file() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.load().unwrap();

    engine.set_value("logging.level", json!("debug")).unwrap();

    let written = std::fs::read_to_string(engine.get_config_path()).unwrap();
    let parsed: AppSettings = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed.logging.level, "debug");
}

#[test]
fn test_rejected_value_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.load().unwrap();
    engine.save().unwrap();
    let before = std::fs::read_to_string(engine.get_config_path()).unwrap();

    let err = engine.set_value("auth.redirect_path", json!(["not", "a", "string"])).unwrap_err();

    assert!(matches!(err, SettingsError::InvalidValue(_)));
    assert_eq!(std::fs::read_to_string(engine.get_config_path()).unwrap(), before);
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.load().unwrap();
    engine.set_value("auth.provider", json!("github")).unwrap();

    engine.reset().unwrap();

    assert_eq!(engine.get_settings(), &AppSettings::default());
    let mut fresh = SettingsEngine::new(Some(engine.get_config_path().to_string()));
    assert_eq!(fresh.load().unwrap().auth.provider, "google");
}

#[test]
fn test_database_path_defaults_to_data_dir() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);
    let path = engine.database_path();

    assert!(path.ends_with("smart-bookmarks/bookmarks.db"));
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a").join("b").join("settings.json");
    let engine = SettingsEngine::new(Some(path.to_string_lossy().to_string()));

    engine.save().unwrap();

    assert!(path.exists());
}

#[test]
fn test_removed_table_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.load().unwrap();

    let err = engine.set_value("store.table", json!("Bookmarks")).unwrap_err();

    assert!(matches!(err, SettingsError::InvalidKey(_)));
}
