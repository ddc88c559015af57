//! # Hyper Core Capability Errors
use thiserror::Error;

use crate::capability::ComponentKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("{kind} '{name}' from plugin '{owner}' conflicts with the one registered by '{existing_owner}'")]
    NameConflict {
        kind: ComponentKind,
        name: String,
        owner: String,
        existing_owner: String,
    },
}

/// Failure reported by a command's `execute`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Bad arguments or unusable input; exits with the application error code.
    #[error("invalid usage: {0}")]
    Usage(String),
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("service '{service}' failed to initialize: {message}")]
    Initialization { service: String, message: String },
    #[error("service '{service}' failed to shut down: {message}")]
    Shutdown { service: String, message: String },
    #[error("service '{0}' is not initialized")]
    NotInitialized(String),
}
