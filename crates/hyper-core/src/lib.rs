//! # Hyper Core
//!
//! Plugin runtime and incremental terminal renderer. Plugins are discovered on
//! disk, resolved against a [`PluginCatalog`] of named factories, wired into a
//! shared [`ServiceContainer`], and publish commands, widgets, pages and
//! services into the [`CapabilityRegistry`]. Widgets are drawn through the
//! dirty-checked, double-buffered [`RenderEngine`].
pub mod capability;
pub mod commands;
pub mod config;
pub mod container;
pub mod dashboard;
pub mod kernel;
pub mod plugin_system;
pub mod render;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and plugins
pub use capability::{CapabilityRegistry, Command, ComponentKind, ComponentSet, Page, Service, Widget};
pub use commands::{CommandOutcome, CommandRunner, ExitStatus};
pub use config::{AppConfig, ConfigData, ConfigFormat};
pub use container::{Lifetime, ServiceContainer};
pub use dashboard::{Dashboard, DashboardSummary, EventSource, ExitReason, ScriptedEvents, TerminalEvents};
pub use kernel::Application;
pub use kernel::error::Error as KernelError;
pub use plugin_system::{
    CatalogEntry, OutcomeStatus, Plugin, PluginCatalog, PluginDescriptor, PluginOutcome, PluginRegistry,
};
pub use render::{InputDispatcher, RenderEngine, RenderTree};

#[cfg(test)]
mod tests;
