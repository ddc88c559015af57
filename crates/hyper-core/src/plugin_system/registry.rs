use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::capability::{CapabilityRegistry, Command, ComponentKind, Page, Service, Widget};
use crate::config::ConfigData;
use crate::container::ServiceContainer;
use crate::plugin_system::catalog::PluginCatalog;
use crate::plugin_system::discovery::PluginDiscovery;
use crate::plugin_system::error::{DiscoveryError, LoadError, PluginSystemError, ShutdownError};
use crate::plugin_system::hooks::{HookContext, LifecycleHook, LifecycleHooks};
use crate::plugin_system::loader::{PluginInstance, PluginLoader};
use crate::plugin_system::manifest::PluginDescriptor;
use crate::plugin_system::traits::PluginState;

/// What happened to one discovered plugin during [`PluginRegistry::load_all`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Loaded,
    AlreadyLoaded,
    /// Another plugin with the same name was found in an earlier search root
    Shadowed,
    Failed(LoadError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOutcome {
    pub name: String,
    pub location: PathBuf,
    pub status: OutcomeStatus,
}

impl PluginOutcome {
    fn new(descriptor: &PluginDescriptor, status: OutcomeStatus) -> Self {
        Self {
            name: descriptor.name().to_string(),
            location: descriptor.location().to_path_buf(),
            status,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.status, OutcomeStatus::Loaded | OutcomeStatus::AlreadyLoaded)
    }
}

/// Plugins shut down, in the order they were shut down, and what failed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub order: Vec<String>,
    pub errors: Vec<ShutdownError>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSummary {
    pub name: String,
    pub version: String,
    pub description: String,
    pub state: PluginState,
    pub location: PathBuf,
    pub components: usize,
}

/// Owns the plugin lifecycle: discovery, loading, activation and shutdown.
///
/// The registry is the only writer to the shared [`CapabilityRegistry`] and
/// [`ServiceContainer`]. Mutating methods take `&mut self`, so whoever drives
/// the render loop has to stop it to load or unload plugins.
pub struct PluginRegistry {
    container: Arc<ServiceContainer>,
    capabilities: Arc<CapabilityRegistry>,
    discovery: PluginDiscovery,
    loader: PluginLoader,
    config: ConfigData,
    search_paths: Vec<PathBuf>,
    initialized: bool,
    discovered: Option<Vec<Arc<PluginDescriptor>>>,
    discovery_errors: Vec<DiscoveryError>,
    instances: HashMap<String, PluginInstance>,
    load_order: Vec<String>,
    failed: BTreeMap<String, LoadError>,
    hooks: LifecycleHooks,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("initialized", &self.initialized)
            .field("search_paths", &self.search_paths)
            .field("loaded", &self.load_order)
            .field("failed", &self.failed.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl PluginRegistry {
    pub fn new(
        catalog: Arc<PluginCatalog>,
        container: Arc<ServiceContainer>,
        capabilities: Arc<CapabilityRegistry>,
        config: ConfigData,
    ) -> Self {
        Self {
            container,
            capabilities,
            discovery: PluginDiscovery::new(catalog.clone()),
            loader: PluginLoader::new(catalog),
            config,
            search_paths: Vec::new(),
            initialized: false,
            discovered: None,
            discovery_errors: Vec::new(),
            instances: HashMap::new(),
            load_order: Vec::new(),
            failed: BTreeMap::new(),
            hooks: LifecycleHooks::new(),
        }
    }

    /// Set the search roots. A second call is ignored with a warning and
    /// returns `false`.
    pub fn initialize(&mut self, search_paths: Vec<PathBuf>) -> bool {
        self.initialize_with(search_paths, false)
    }

    /// Like [`initialize`](Self::initialize); with `force` the search roots are
    /// replaced and the discovery cache dropped. Loaded plugins stay loaded.
    pub fn initialize_with(&mut self, search_paths: Vec<PathBuf>, force: bool) -> bool {
        if self.initialized && !force {
            log::warn!("Plugin registry already initialized, ignoring new search paths");
            return false;
        }
        log::debug!("Plugin search paths: {:?}", search_paths);
        self.search_paths = search_paths;
        self.discovered = None;
        self.discovery_errors.clear();
        self.initialized = true;
        true
    }

    pub fn reinitialize(&mut self, search_paths: Vec<PathBuf>) -> bool {
        self.initialize_with(search_paths, true)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    fn ensure_initialized(&self) -> Result<(), PluginSystemError> {
        if self.initialized {
            Ok(())
        } else {
            Err(PluginSystemError::NotInitialized)
        }
    }

    /// Discovered descriptors, scanning only on the first call.
    pub async fn discover_plugins(&mut self) -> Result<&[Arc<PluginDescriptor>], PluginSystemError> {
        self.ensure_initialized()?;
        if self.discovered.is_none() {
            let report = self.discovery.discover(&self.search_paths).await;
            self.discovery_errors = report.errors;
            self.discovered = Some(report.plugins);
        }
        Ok(self.discovered.as_deref().unwrap_or(&[]))
    }

    /// Drop the cache and scan again.
    pub async fn rediscover(&mut self) -> Result<&[Arc<PluginDescriptor>], PluginSystemError> {
        self.discovered = None;
        self.discover_plugins().await
    }

    /// Problems found by the last scan
    pub fn discovery_errors(&self) -> &[DiscoveryError] {
        &self.discovery_errors
    }

    /// The descriptor a load of `name` would use: the one from the earliest
    /// search root.
    pub fn descriptor(&self, name: &str) -> Option<Arc<PluginDescriptor>> {
        self.discovered
            .as_ref()?
            .iter()
            .find(|d| d.name() == name)
            .cloned()
    }

    /// Load and activate one plugin. Already loaded plugins are returned
    /// as they are.
    pub async fn load_plugin(&mut self, name: &str) -> Result<&PluginInstance, PluginSystemError> {
        self.ensure_initialized()?;
        if !self.instances.contains_key(name) {
            self.discover_plugins().await?;
            let descriptor = self
                .descriptor(name)
                .ok_or_else(|| PluginSystemError::UnknownPlugin(name.to_string()))?;
            match self.try_load(descriptor) {
                Ok(instance) => self.accept(instance),
                Err(e) => {
                    self.record_failure(e.clone());
                    return Err(e.into());
                }
            }
        } else {
            log::debug!("Plugin '{}' already loaded", name);
        }
        self.instances
            .get(name)
            .ok_or_else(|| PluginSystemError::NotLoaded(name.to_string()))
    }

    /// Load every discovered plugin, one outcome per descriptor in discovery
    /// order. Plugins failing only on missing dependencies are retried while
    /// other loads make progress.
    pub async fn load_all(&mut self) -> Result<Vec<PluginOutcome>, PluginSystemError> {
        let descriptors = self.discover_plugins().await?.to_vec();
        let mut outcomes: Vec<Option<PluginOutcome>> = vec![None; descriptors.len()];
        let mut seen = HashSet::new();
        let mut pending = Vec::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            if !seen.insert(descriptor.name().to_string()) {
                log::warn!(
                    "Plugin '{}' at {} is shadowed by an earlier search root",
                    descriptor.name(),
                    descriptor.location().display()
                );
                outcomes[index] = Some(PluginOutcome::new(descriptor, OutcomeStatus::Shadowed));
            } else if self.instances.contains_key(descriptor.name()) {
                outcomes[index] = Some(PluginOutcome::new(descriptor, OutcomeStatus::AlreadyLoaded));
            } else {
                pending.push(index);
            }
        }

        while !pending.is_empty() {
            let mut deferred = Vec::new();
            let mut progressed = false;
            for index in pending {
                let descriptor = descriptors[index].clone();
                match self.try_load(descriptor.clone()) {
                    Ok(instance) => {
                        self.accept(instance);
                        progressed = true;
                        outcomes[index] = Some(PluginOutcome::new(&descriptor, OutcomeStatus::Loaded));
                    }
                    Err(e) if e.is_dependency() => deferred.push((index, e)),
                    Err(e) => {
                        self.record_failure(e.clone());
                        outcomes[index] = Some(PluginOutcome::new(&descriptor, OutcomeStatus::Failed(e)));
                    }
                }
            }
            if !progressed {
                for (index, e) in deferred {
                    self.record_failure(e.clone());
                    outcomes[index] = Some(PluginOutcome::new(&descriptors[index], OutcomeStatus::Failed(e)));
                }
                break;
            }
            pending = deferred.into_iter().map(|(index, _)| index).collect();
        }

        let outcomes: Vec<PluginOutcome> = outcomes.into_iter().flatten().collect();
        log::info!(
            "Loaded {} of {} discovered plugin(s)",
            outcomes.iter().filter(|o| o.is_loaded()).count(),
            outcomes.len()
        );
        Ok(outcomes)
    }

    fn try_load(&self, descriptor: Arc<PluginDescriptor>) -> Result<PluginInstance, LoadError> {
        let name = descriptor.name().to_string();
        self.fire(LifecycleHook::BeforeLoad, &name, None);
        let mut instance = self.loader.load(descriptor, &self.container, &self.capabilities)?;
        self.fire(LifecycleHook::BeforeActivate, &name, None);
        self.loader
            .activate(&mut instance, &self.config, &self.capabilities, &self.container)?;
        Ok(instance)
    }

    fn accept(&mut self, instance: PluginInstance) {
        let name = instance.name().to_string();
        self.failed.remove(&name);
        self.load_order.push(name.clone());
        self.instances.insert(name, instance);
    }

    fn record_failure(&mut self, error: LoadError) {
        log::error!("{}", error);
        let message = error.to_string();
        self.fire(LifecycleHook::OnError, error.plugin(), Some(&message));
        self.failed.insert(error.plugin().to_string(), error);
    }

    fn fire(&self, hook: LifecycleHook, plugin: &str, error: Option<&str>) {
        self.hooks.fire(&HookContext { hook, plugin, error });
    }

    /// Shut down one plugin and withdraw its components and services.
    pub fn unload_plugin(&mut self, name: &str) -> Result<Vec<ShutdownError>, PluginSystemError> {
        let mut instance = self
            .instances
            .remove(name)
            .ok_or_else(|| PluginSystemError::NotLoaded(name.to_string()))?;
        self.fire(LifecycleHook::BeforeUnload, name, None);
        self.load_order.retain(|n| n != name);
        let errors = instance.shutdown(&self.capabilities, &self.container);
        log::info!("Unloaded plugin '{}'", name);
        Ok(errors)
    }

    /// Shut down every loaded plugin in reverse load order. One plugin
    /// failing does not stop the others.
    pub fn shutdown(&mut self) -> ShutdownReport {
        let mut report = ShutdownReport::default();
        for name in std::mem::take(&mut self.load_order).into_iter().rev() {
            let Some(mut instance) = self.instances.remove(&name) else { continue };
            self.fire(LifecycleHook::BeforeUnload, &name, None);
            let errors = instance.shutdown(&self.capabilities, &self.container);
            for error in &errors {
                log::warn!("{}", error);
            }
            report.errors.extend(errors);
            report.order.push(name);
        }
        log::info!(
            "Shut down {} plugin(s), {} error(s)",
            report.order.len(),
            report.errors.len()
        );
        report
    }

    /// Shut everything down, scan again and load everything found.
    pub async fn reload_plugins(&mut self) -> Result<Vec<PluginOutcome>, PluginSystemError> {
        let report = self.shutdown();
        if !report.is_clean() {
            log::warn!("Reload continuing after {} shutdown error(s)", report.errors.len());
        }
        self.failed.clear();
        self.discovered = None;
        self.load_all().await
    }

    pub fn get_command(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.capabilities.command(name)
    }

    /// A fresh widget from the named factory
    pub fn get_widget(&self, name: &str) -> Option<Box<dyn Widget>> {
        self.capabilities.create_widget(name)
    }

    pub fn get_page(&self, name: &str) -> Option<Box<dyn Page>> {
        self.capabilities.create_page(name)
    }

    pub fn get_service(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.capabilities.service(name)
    }

    pub fn list_commands(&self) -> Vec<String> {
        self.capabilities.names(ComponentKind::Command)
    }

    pub fn list_widgets(&self) -> Vec<String> {
        self.capabilities.names(ComponentKind::Widget)
    }

    pub fn list_pages(&self) -> Vec<String> {
        self.capabilities.names(ComponentKind::Page)
    }

    pub fn list_services(&self) -> Vec<String> {
        self.capabilities.names(ComponentKind::Service)
    }

    pub fn components_of(&self, plugin: &str) -> Vec<(ComponentKind, String)> {
        self.capabilities.owned_by(plugin)
    }

    /// Loaded plugins in load order
    pub fn plugins(&self) -> Vec<PluginSummary> {
        self.load_order
            .iter()
            .filter_map(|name| self.instances.get(name))
            .map(|instance| PluginSummary {
                name: instance.name().to_string(),
                version: instance.version().to_string(),
                description: instance.description().to_string(),
                state: instance.state(),
                location: instance.descriptor().location().to_path_buf(),
                components: instance.components().len(),
            })
            .collect()
    }

    pub fn loaded_plugins(&self) -> &[String] {
        &self.load_order
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    pub fn instance(&self, name: &str) -> Option<&PluginInstance> {
        self.instances.get(name)
    }

    /// Plugins whose last load attempt failed
    pub fn failures(&self) -> &BTreeMap<String, LoadError> {
        &self.failed
    }

    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut LifecycleHooks {
        &mut self.hooks
    }

    pub fn container(&self) -> &Arc<ServiceContainer> {
        &self.container
    }

    pub fn capabilities(&self) -> &Arc<CapabilityRegistry> {
        &self.capabilities
    }

    pub fn config(&self) -> &ConfigData {
        &self.config
    }
}
