//! # Hyper Core Plugin System
//!
//! Finds extensions on disk, turns them into running plugins and publishes
//! what they provide.
//!
//! ## Submodules
//!
//! - **[`catalog`]**: named plugin factories that a directory's entry module
//!   resolves against ([`PluginCatalog`]).
//! - **[`manifest`]**: descriptor parsing and the resolved
//!   [`PluginDescriptor`].
//! - **[`discovery`]**: async scan of the search roots.
//! - **[`loader`]**: construct, validate, initialize and register a single
//!   plugin, rolling back on failure.
//! - **[`hooks`]**: lifecycle callbacks.
//! - **[`registry`]**: the [`PluginRegistry`] that drives all of the above.
//! - **[`traits`]**: the [`Plugin`] trait.
//! - **[`error`]**: error types for every stage.
pub mod catalog;
pub mod discovery;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod traits;

pub use catalog::{CatalogEntry, PluginCatalog};
pub use discovery::{DiscoveryReport, PluginDiscovery};
pub use error::{DiscoveryError, LoadError, LoadStage, PluginError, PluginSystemError, ShutdownError};
pub use hooks::{HookContext, HookId, LifecycleHook, LifecycleHooks};
pub use loader::{PluginInstance, PluginLoader};
pub use manifest::{EntryPoints, MetadataSource, PluginDescriptor, PluginMetadata};
pub use registry::{OutcomeStatus, PluginOutcome, PluginRegistry, PluginSummary, ShutdownReport};
pub use traits::{Plugin, PluginState};

#[cfg(test)]
mod tests;
