//! # Hyper Core Plugin System Errors
//!
//! - [`DiscoveryError`]: a search root or candidate directory was unusable.
//!   The root (or candidate) is skipped.
//! - [`LoadError`]: one plugin failed to load. Nothing it registered survives.
//! - [`ShutdownError`]: one plugin failed to shut down. Collected, never
//!   allowed to block its siblings.
//! - [`PluginError`]: returned by plugin code itself.
//! - [`PluginSystemError`]: registry-level failures.
use std::fmt;
use std::path::PathBuf;

use crate::capability::{CapabilityError, ServiceError};
use crate::container::ContainerError;

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Plugin search root '{}' is not readable: {source}", path.display())]
    UnreadableRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Plugin search root '{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Invalid plugin descriptor '{}': {message}", path.display())]
    Descriptor { path: PathBuf, message: String },

    #[error("I/O error reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error raised by plugin code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        PluginError::Message(message.into())
    }
}

/// Stage of a load attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Construct,
    Initialize,
    Register,
    Activate,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            LoadStage::Construct => "construct",
            LoadStage::Initialize => "initialize",
            LoadStage::Register => "register",
            LoadStage::Activate => "activate",
        };
        f.write_str(stage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Plugin '{plugin}': entry '{entry}' is not in the plugin catalog")]
    UnknownEntry { plugin: String, entry: String },

    #[error("Plugin '{plugin}' is invalid: {message}")]
    InvalidPlugin { plugin: String, message: String },

    #[error("Plugin '{plugin}' is missing dependencies: {}", missing.join(", "))]
    Dependency { plugin: String, missing: Vec<String> },

    #[error("Plugin '{plugin}' failed to initialize: {source}")]
    Initialization {
        plugin: String,
        #[source]
        source: PluginError,
    },

    #[error("Plugin '{plugin}' registration conflict: {source}")]
    NameConflict {
        plugin: String,
        #[source]
        source: CapabilityError,
    },

    #[error("Plugin '{plugin}' service '{service}' failed to start: {source}")]
    Service {
        plugin: String,
        service: String,
        #[source]
        source: ServiceError,
    },

    #[error("Plugin '{plugin}' panicked during {stage}: {message}")]
    Panicked {
        plugin: String,
        stage: LoadStage,
        message: String,
    },
}

impl LoadError {
    pub fn plugin(&self) -> &str {
        match self {
            LoadError::UnknownEntry { plugin, .. }
            | LoadError::InvalidPlugin { plugin, .. }
            | LoadError::Dependency { plugin, .. }
            | LoadError::Initialization { plugin, .. }
            | LoadError::NameConflict { plugin, .. }
            | LoadError::Service { plugin, .. }
            | LoadError::Panicked { plugin, .. } => plugin,
        }
    }

    pub fn is_dependency(&self) -> bool {
        matches!(self, LoadError::Dependency { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Plugin '{plugin}' failed to shut down: {message}")]
pub struct ShutdownError {
    pub plugin: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("The plugin registry has not been initialized")]
    NotInitialized,

    #[error("No plugin named '{0}' was discovered")]
    UnknownPlugin(String),

    #[error("Plugin '{0}' is not loaded")]
    NotLoaded(String),

    #[error("Catalog entry '{0}' is already registered")]
    DuplicateEntry(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Shutdown finished with {} error(s)", .0.len())]
    Shutdown(Vec<ShutdownError>),
}
