use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::capability::{CapabilityRegistry, Component, ComponentKind, Service};
use crate::config::ConfigData;
use crate::container::ServiceContainer;
use crate::plugin_system::catalog::{CatalogEntry, PluginCatalog};
use crate::plugin_system::error::{LoadError, LoadStage, ShutdownError};
use crate::plugin_system::manifest::PluginDescriptor;
use crate::plugin_system::traits::{Plugin, PluginState};
use crate::utils::{catch_panic, lock};

/// A loaded plugin and everything it put into the shared registries
pub struct PluginInstance {
    descriptor: Arc<PluginDescriptor>,
    plugin: Box<dyn Plugin>,
    state: PluginState,
    components: Vec<(ComponentKind, String)>,
    services: Vec<Arc<dyn Service>>,
    container_keys: Vec<String>,
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("name", &self.name())
            .field("state", &self.state)
            .field("components", &self.components)
            .field("container_keys", &self.container_keys)
            .finish()
    }
}

impl PluginInstance {
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn version(&self) -> &str {
        self.plugin.version()
    }

    pub fn description(&self) -> &str {
        self.plugin.description()
    }

    pub fn descriptor(&self) -> &Arc<PluginDescriptor> {
        &self.descriptor
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: PluginState) {
        log::debug!("Plugin '{}' -> {}", self.name(), state);
        self.state = state;
    }

    /// Components this plugin published, in registration order
    pub fn components(&self) -> &[(ComponentKind, String)] {
        &self.components
    }

    /// Container keys this plugin registered
    pub fn container_keys(&self) -> &[String] {
        &self.container_keys
    }

    /// Shut down services and the plugin, then withdraw everything it
    /// registered. Failures are returned, never raised.
    pub(crate) fn shutdown(
        &mut self,
        capabilities: &CapabilityRegistry,
        container: &ServiceContainer,
    ) -> Vec<ShutdownError> {
        let name = self.name().to_string();
        self.set_state(PluginState::ShuttingDown);
        let mut errors = Vec::new();

        for service in self.services.iter().rev() {
            let message = match catch_panic(|| service.shutdown()) {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => format!("service '{}' panicked: {}", service.name(), panic),
            };
            errors.push(ShutdownError { plugin: name.clone(), message });
        }

        let plugin = &mut self.plugin;
        match catch_panic(|| plugin.shutdown()) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => errors.push(ShutdownError { plugin: name.clone(), message: e.to_string() }),
            Err(panic) => errors.push(ShutdownError {
                plugin: name.clone(),
                message: format!("panicked: {}", panic),
            }),
        }

        withdraw(capabilities, container, &self.components, &self.container_keys);
        self.components.clear();
        self.services.clear();
        self.container_keys.clear();
        self.set_state(PluginState::Shutdown);
        errors
    }
}

fn withdraw(
    capabilities: &CapabilityRegistry,
    container: &ServiceContainer,
    components: &[(ComponentKind, String)],
    container_keys: &[String],
) {
    for (kind, name) in components.iter().rev() {
        capabilities.remove(*kind, name);
    }
    for key in container_keys.iter().rev() {
        container.unregister(key);
    }
}

/// Turns descriptors into running plugin instances.
///
/// A load either completes or leaves no trace: components inserted and
/// container keys registered during a failed attempt are removed again.
pub struct PluginLoader {
    catalog: Arc<PluginCatalog>,
    /// Entries resolved so far, by reference
    imported: Mutex<HashMap<String, CatalogEntry>>,
}

impl fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginLoader")
            .field("imported", &lock(&self.imported).len())
            .finish()
    }
}

impl PluginLoader {
    pub fn new(catalog: Arc<PluginCatalog>) -> Self {
        Self { catalog, imported: Mutex::new(HashMap::new()) }
    }

    /// Resolve the entry module, at most once per process.
    fn import(&self, descriptor: &PluginDescriptor) -> Result<CatalogEntry, LoadError> {
        let mut imported = lock(&self.imported);
        if let Some(entry) = imported.get(descriptor.entry()) {
            return Ok(entry.clone());
        }
        let entry = self.catalog.resolve(descriptor.entry()).ok_or_else(|| LoadError::UnknownEntry {
            plugin: descriptor.name().to_string(),
            entry: descriptor.entry().to_string(),
        })?;
        imported.insert(descriptor.entry().to_string(), entry.clone());
        Ok(entry)
    }

    /// Construct, check, initialize and register one plugin.
    ///
    /// On success the instance is `Initialized` with its components published.
    pub fn load(
        &self,
        descriptor: Arc<PluginDescriptor>,
        container: &ServiceContainer,
        capabilities: &CapabilityRegistry,
    ) -> Result<PluginInstance, LoadError> {
        let plugin_name = descriptor.name().to_string();
        let entry = self.import(&descriptor)?;

        let plugin = catch_panic(|| entry.construct()).map_err(|message| LoadError::Panicked {
            plugin: plugin_name.clone(),
            stage: LoadStage::Construct,
            message,
        })?;
        validate_shape(&descriptor, plugin.as_ref())?;

        let provided: HashSet<String> = plugin.provides().into_iter().collect();
        let missing = missing_dependencies(&descriptor, container, &provided);
        if !missing.is_empty() {
            return Err(LoadError::Dependency { plugin: plugin_name, missing });
        }

        let mut instance = PluginInstance {
            descriptor: descriptor.clone(),
            plugin,
            state: PluginState::Loaded,
            components: Vec::new(),
            services: Vec::new(),
            container_keys: Vec::new(),
        };

        let keys_before: HashSet<String> = container.keys().into_iter().collect();
        let initialized = {
            let plugin = &mut instance.plugin;
            catch_panic(|| plugin.initialize(container))
        };
        instance.container_keys = container.keys_added_since(&keys_before);
        let failure = match initialized {
            Ok(Ok(())) => None,
            Ok(Err(source)) => Some(LoadError::Initialization { plugin: plugin_name.clone(), source }),
            Err(message) => Some(LoadError::Panicked {
                plugin: plugin_name.clone(),
                stage: LoadStage::Initialize,
                message,
            }),
        };
        if let Some(error) = failure {
            self.abandon(&mut instance, capabilities, container);
            return Err(error);
        }
        instance.set_state(PluginState::Initialized);

        // self-provided keys must exist now
        let missing = missing_dependencies(&descriptor, container, &HashSet::new());
        if !missing.is_empty() {
            self.abandon(&mut instance, capabilities, container);
            return Err(LoadError::Dependency { plugin: plugin_name, missing });
        }

        let components = {
            let plugin = &instance.plugin;
            catch_panic(|| plugin.register())
        };
        let components = match components {
            Ok(components) => components,
            Err(message) => {
                self.abandon(&mut instance, capabilities, container);
                return Err(LoadError::Panicked { plugin: plugin_name, stage: LoadStage::Register, message });
            }
        };

        warn_on_undeclared(&descriptor, &components);
        for component in components {
            let key = (component.kind(), component.name().to_string());
            let service = match &component {
                Component::Service(service) => Some(service.clone()),
                _ => None,
            };
            if let Err(source) = capabilities.insert(&plugin_name, component) {
                self.abandon(&mut instance, capabilities, container);
                return Err(LoadError::NameConflict { plugin: plugin_name, source });
            }
            instance.components.push(key);
            instance.services.extend(service);
        }

        log::info!(
            "Loaded plugin '{}' v{} ({} component(s))",
            plugin_name,
            instance.version(),
            instance.components.len()
        );
        Ok(instance)
    }

    /// Start the plugin's services with its config section.
    /// A failing service rolls the whole plugin back.
    pub fn activate(
        &self,
        instance: &mut PluginInstance,
        config: &ConfigData,
        capabilities: &CapabilityRegistry,
        container: &ServiceContainer,
    ) -> Result<(), LoadError> {
        let section = config.section(instance.name());
        let services = instance.services.clone();
        for (started, service) in services.iter().enumerate() {
            let failure = match catch_panic(|| service.initialize(&section)) {
                Ok(Ok(())) => continue,
                Ok(Err(source)) => LoadError::Service {
                    plugin: instance.name().to_string(),
                    service: service.name().to_string(),
                    source,
                },
                Err(message) => LoadError::Panicked {
                    plugin: instance.name().to_string(),
                    stage: LoadStage::Activate,
                    message,
                },
            };
            // only services that started get shut down
            instance.services.truncate(started);
            for error in instance.shutdown(capabilities, container) {
                log::warn!("{}", error);
            }
            return Err(failure);
        }
        instance.set_state(PluginState::Active);
        Ok(())
    }

    /// Undo a partial load: withdraw what was registered and give the plugin
    /// a chance to release resources.
    fn abandon(
        &self,
        instance: &mut PluginInstance,
        capabilities: &CapabilityRegistry,
        container: &ServiceContainer,
    ) {
        log::warn!(
            "Rolling back plugin '{}': {} component(s), {} service key(s)",
            instance.name(),
            instance.components.len(),
            instance.container_keys.len()
        );
        if instance.state == PluginState::Loaded {
            withdraw(capabilities, container, &instance.components, &instance.container_keys);
            instance.components.clear();
            instance.container_keys.clear();
            return;
        }
        instance.services.clear();
        for error in instance.shutdown(capabilities, container) {
            log::warn!("{}", error);
        }
    }
}

fn validate_shape(descriptor: &PluginDescriptor, plugin: &dyn Plugin) -> Result<(), LoadError> {
    let invalid = |message: String| LoadError::InvalidPlugin {
        plugin: descriptor.name().to_string(),
        message,
    };
    if plugin.name().trim().is_empty() {
        return Err(invalid("plugin reports an empty name".to_string()));
    }
    if plugin.name() != descriptor.name() {
        return Err(invalid(format!(
            "plugin reports name '{}' but was discovered as '{}'",
            plugin.name(),
            descriptor.name()
        )));
    }
    if let Err(e) = semver::Version::parse(plugin.version()) {
        return Err(invalid(format!("version '{}' is not semantic: {}", plugin.version(), e)));
    }
    Ok(())
}

fn missing_dependencies(
    descriptor: &PluginDescriptor,
    container: &ServiceContainer,
    provided: &HashSet<String>,
) -> Vec<String> {
    descriptor
        .dependencies()
        .iter()
        .filter(|dep| !container.has(dep) && !provided.contains(*dep))
        .cloned()
        .collect()
}

fn warn_on_undeclared(descriptor: &PluginDescriptor, components: &crate::capability::ComponentSet) {
    let declared = descriptor.entry_points();
    if declared.is_empty() {
        return;
    }
    for kind in ComponentKind::ALL {
        let produced = components.names(kind);
        for name in declared.names(kind) {
            if !produced.contains(name) {
                log::warn!(
                    "Plugin '{}' declares {} '{}' but did not register it",
                    descriptor.name(),
                    kind,
                    name
                );
            }
        }
    }
}
