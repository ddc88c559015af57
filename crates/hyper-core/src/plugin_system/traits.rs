use std::fmt;

use crate::capability::ComponentSet;
use crate::container::ServiceContainer;
use crate::plugin_system::error::PluginError;

/// The capability interface every plugin implements.
///
/// Lifecycle, driven by the registry: constructed from its catalog entry,
/// [`initialize`](Plugin::initialize) once with the shared container,
/// [`register`](Plugin::register) once to publish components, and
/// [`shutdown`](Plugin::shutdown) once at teardown.
pub trait Plugin: Send {
    fn name(&self) -> &str;

    /// Semantic version
    fn version(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn author(&self) -> &str {
        ""
    }

    /// Container keys this plugin registers itself during `initialize`.
    /// Declared dependencies on these keys are satisfied by the plugin.
    fn provides(&self) -> Vec<String> {
        Vec::new()
    }

    fn initialize(&mut self, container: &ServiceContainer) -> Result<(), PluginError>;

    fn register(&self) -> ComponentSet;

    fn shutdown(&mut self) -> Result<(), PluginError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginState {
    Unloaded,
    Loaded,
    Initialized,
    Active,
    ShuttingDown,
    Shutdown,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            PluginState::Unloaded => "unloaded",
            PluginState::Loaded => "loaded",
            PluginState::Initialized => "initialized",
            PluginState::Active => "active",
            PluginState::ShuttingDown => "shutting down",
            PluginState::Shutdown => "shut down",
        };
        f.write_str(state)
    }
}
