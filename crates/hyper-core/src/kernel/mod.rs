//! # Hyper Core Kernel
//!
//! The `kernel` module ties the subsystems together.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Application Bootstrapping**: [`Application`](bootstrap::Application) owns the
//!   process-scoped [`ServiceContainer`](crate::container::ServiceContainer),
//!   [`CapabilityRegistry`](crate::capability::CapabilityRegistry) and
//!   [`PluginRegistry`](crate::plugin_system::PluginRegistry), and hands them out
//!   by handle. Teardown is explicit through [`Application::shutdown`](bootstrap::Application::shutdown).
//! - **Core Constants**: system-wide constants in the `constants` submodule.
//! - **Error Handling**: the top-level [`Error`](error::Error) and `Result` alias,
//!   with `From` conversions for every subsystem error.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
pub use error::{Error, Result};
// Test module declaration
#[cfg(test)]
mod tests;
