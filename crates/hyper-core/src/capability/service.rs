use std::time::SystemTime;

use crate::capability::error::ServiceError;
use crate::config::ConfigData;

/// Result of a service health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub service: String,
    pub healthy: bool,
    pub checked_at: SystemTime,
    pub detail: Option<String>,
}

impl HealthStatus {
    pub fn healthy(service: impl Into<String>) -> Self {
        Self { service: service.into(), healthy: true, checked_at: SystemTime::now(), detail: None }
    }

    pub fn unhealthy(service: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            healthy: false,
            checked_at: SystemTime::now(),
            detail: Some(detail.into()),
        }
    }
}

/// A long-lived, shared background facility published by a plugin.
///
/// Services are shared behind `Arc`, so state changes go through interior
/// mutability.
pub trait Service: Send + Sync {
    fn name(&self) -> &str;

    /// Called once when the owning plugin activates, with its config section.
    fn initialize(&self, config: &ConfigData) -> Result<(), ServiceError>;

    fn shutdown(&self) -> Result<(), ServiceError>;

    fn health_check(&self) -> HealthStatus;

    fn is_initialized(&self) -> bool;
}
