use std::path::PathBuf;

use serde_json::json;
use tempfile::tempdir;

use crate::config::{AppConfig, ConfigData, ConfigError, ConfigFormat};
use crate::render::Direction;

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.json")), Some(ConfigFormat::Json));
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.YML")), Some(ConfigFormat::Yaml));
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.toml")), Some(ConfigFormat::Toml));
    assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.ini")), None);
}

#[test]
fn test_get_set_and_defaults() {
    let mut config = ConfigData::new();
    config.set("theme", "dark").unwrap();
    config.set("retries", 3).unwrap();

    assert_eq!(config.get::<String>("theme").as_deref(), Some("dark"));
    assert_eq!(config.get::<u32>("retries"), Some(3));
    // wrong shape reads as missing
    assert_eq!(config.get::<bool>("theme"), None);
    assert_eq!(config.get_or("missing", 7u32), 7);
    assert_eq!(config.keys(), vec!["retries".to_string(), "theme".to_string()]);
}

#[test]
fn test_section_extracts_nested_table() {
    let mut config = ConfigData::new();
    config.set("system_status", json!({"interval": 5})).unwrap();
    config.set("flat", 1).unwrap();

    let section = config.section("system_status");
    assert_eq!(section.get::<u32>("interval"), Some(5));
    assert!(config.section("flat").keys().is_empty());
    assert!(config.section("nope").keys().is_empty());
}

#[test]
fn test_app_config_defaults_when_empty() {
    let app = AppConfig::from_options(&ConfigData::new()).unwrap();
    assert_eq!(app, AppConfig::default());
    assert!(app.auto_discovery);
    assert_eq!(app.theme, "default");
    assert_eq!(app.dashboard_layout, Direction::Vertical);
}

#[test]
fn test_app_config_reads_options_once() {
    let mut options = ConfigData::new();
    options.set("plugin_search_paths", vec!["/a", "/b"]).unwrap();
    options.set("auto_discovery", false).unwrap();
    options.set("theme", "dark").unwrap();
    options.set("dashboard_layout", "horizontal").unwrap();
    options.set("unrelated", json!({"x": 1})).unwrap();

    let app = AppConfig::from_options(&options).unwrap();
    assert_eq!(app.dashboard_layout, Direction::Horizontal);
    assert_eq!(app.plugin_search_paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    assert!(!app.auto_discovery);
    assert_eq!(app.theme, "dark");
    assert_eq!(app.log_level, "info");
}

#[test]
fn test_app_config_rejects_wrong_shape() {
    let mut options = ConfigData::new();
    options.set("auto_discovery", "yes please").unwrap();
    assert!(matches!(AppConfig::from_options(&options), Err(ConfigError::InvalidValue { .. })));
}

#[tokio::test]
async fn test_load_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hyper.json");
    std::fs::write(&path, r#"{"theme": "dark", "auto_discovery": false}"#).unwrap();

    let options = ConfigData::load_file(&path).await.unwrap();
    assert_eq!(options.get::<String>("theme").as_deref(), Some("dark"));
}

#[tokio::test]
async fn test_load_unknown_extension_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hyper.ini");
    std::fs::write(&path, "theme=dark").unwrap();

    let err = ConfigData::load_file(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
}

#[cfg(feature = "toml-config")]
#[test]
fn test_toml_deserialize() {
    let options = ConfigData::deserialize("theme = \"dark\"\nlog_level = \"debug\"\n", ConfigFormat::Toml).unwrap();
    let app = AppConfig::from_options(&options).unwrap();
    assert_eq!(app.log_level, "debug");
}
