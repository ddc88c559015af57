//! # Hyper Core Configuration
//!
//! The options map ([`ConfigData`]) is read once at startup and turned into
//! an [`AppConfig`]. Plugin services receive the section of the map named after
//! their plugin.
pub mod error;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::render::layout::Direction;
pub use error::ConfigError;

/// Options file formats, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    #[cfg(feature = "yaml-config")]
    Yaml,
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(ConfigFormat::Json),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            #[cfg(feature = "toml-config")]
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "TOML",
        }
    }
}

/// Flat string-keyed options; values stay as JSON until read with a type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    #[serde(flatten)]
    values: HashMap<String, serde_json::Value>,
}

impl ConfigData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed read. Missing keys and values that do not fit `T` are `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        T::deserialize(value).ok()
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let value = serde_json::to_value(value)
            .map_err(|e| ConfigError::InvalidValue { key: key.to_string(), message: e.to_string() })?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Nested table under `key` as its own map; empty when absent or not a table.
    pub fn section(&self, key: &str) -> ConfigData {
        match self.values.get(key) {
            Some(serde_json::Value::Object(map)) => ConfigData {
                values: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            },
            _ => ConfigData::new(),
        }
    }

    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parsed = match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::Deserialization { format: format.label().to_string(), message })
    }

    /// Read an options file whose format follows its extension.
    pub async fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat { path: path.to_path_buf() })?;
        let data = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::deserialize(&data, format)
    }
}

/// Startup options, read once from the options map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ordered plugin search roots
    pub plugin_search_paths: Vec<PathBuf>,
    /// Load every discovered plugin during startup
    pub auto_discovery: bool,
    /// Theme name for the dashboard
    pub theme: String,
    /// Log level filter for the binary
    pub log_level: String,
    /// How the dashboard places widgets: `vertical` rows or `horizontal`
    /// columns
    pub dashboard_layout: Direction,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            plugin_search_paths: vec![PathBuf::from(constants::DEFAULT_PLUGINS_DIR)],
            auto_discovery: true,
            theme: constants::DEFAULT_THEME.to_string(),
            log_level: constants::DEFAULT_LOG_LEVEL.to_string(),
            dashboard_layout: Direction::Vertical,
        }
    }
}

impl AppConfig {
    /// Build from the options map. Missing keys take their defaults; keys of
    /// the wrong shape are an error.
    pub fn from_options(options: &ConfigData) -> Result<Self, ConfigError> {
        let value = serde_json::to_value(options).map_err(|e| ConfigError::Serialization {
            format: "JSON".to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            key: "options".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests;
