//! # Hyper Core Container Errors
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("Service '{key}' not registered. Available: [{}]", available.join(", "))]
    Resolution { key: String, available: Vec<String> },

    #[error("Circular dependency while resolving '{key}': {}", chain.join(" -> "))]
    Cycle { key: String, chain: Vec<String> },

    #[error("Service '{key}' is already registered")]
    Conflict { key: String },

    #[error("Service '{key}' is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("Service '{key}': an instance provider cannot be transient")]
    InvalidLifetime { key: String },

    #[error("Factory for '{key}' failed: {message}")]
    Factory { key: String, message: String },
}
