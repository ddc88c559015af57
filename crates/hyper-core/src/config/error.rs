//! # Hyper Core Configuration Errors
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to serialize configuration to {format}: {message}")]
    Serialization { format: String, message: String },

    #[error("Failed to deserialize configuration from {format}: {message}")]
    Deserialization { format: String, message: String },

    #[error("Unknown or unsupported configuration format for path: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("I/O error reading configuration '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for option '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
