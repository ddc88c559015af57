//! # Hyper Core Kernel Errors
//!
//! [`Error`] wraps every subsystem error so callers at the top of the stack
//! (the binary, the dashboard loop) can use a single `Result` type.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::capability::error::CapabilityError;
use crate::config::error::ConfigError;
use crate::container::error::ContainerError;
use crate::plugin_system::error::PluginSystemError;
use crate::render::error::{RenderError, SurfaceError};

/// Top-level error type for the Hyper runtime
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Terminal error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the kernel's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Bootstrap")]
    Bootstrap,
    #[error("Start")]
    Start,
    #[error("Run")]
    Run,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    pub fn lifecycle(phase: KernelLifecyclePhase, message: impl Into<String>) -> Self {
        Error::KernelLifecycleError { phase, message: message.into() }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
