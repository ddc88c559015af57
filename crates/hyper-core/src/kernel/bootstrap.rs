use std::path::PathBuf;
use std::sync::Arc;

use crate::capability::{CapabilityRegistry, Component};
use crate::commands::{CommandOutcome, CommandRunner, InitCommand};
use crate::config::{AppConfig, ConfigData};
use crate::container::ServiceContainer;
use crate::dashboard::{Dashboard, DashboardSummary, EventSource};
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::plugin_system::{PluginCatalog, PluginOutcome, PluginRegistry, ShutdownReport};
use crate::render::{CellGrid, Theme};

/// Owns the process-wide registries and drives startup, the two run modes
/// (a single command or the dashboard) and shutdown.
pub struct Application {
    config: AppConfig,
    container: Arc<ServiceContainer>,
    capabilities: Arc<CapabilityRegistry>,
    registry: PluginRegistry,
    started: bool,
    stopped: bool,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("started", &self.started)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl Application {
    /// Build the application from its options map. The map is also the
    /// source of per-plugin config sections.
    pub fn new(options: ConfigData, catalog: PluginCatalog) -> Result<Self> {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        let config = AppConfig::from_options(&options)?;

        // Process bootstrap registrations; everything else in the container
        // comes from plugins.
        let container = Arc::new(ServiceContainer::new());
        container.register_instance(constants::CONFIG_SERVICE_KEY, config.clone())?;
        container.register_instance(constants::THEME_SERVICE_KEY, config.theme.clone())?;

        let capabilities = Arc::new(CapabilityRegistry::new());
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        capabilities.insert(constants::BUILTIN_OWNER, Component::Command(Arc::new(InitCommand::new(cwd))))?;
        let registry = PluginRegistry::new(Arc::new(catalog), container.clone(), capabilities.clone(), options);

        Ok(Self { config, container, capabilities, registry, started: false, stopped: false })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn container(&self) -> &Arc<ServiceContainer> {
        &self.container
    }

    pub fn capabilities(&self) -> &Arc<CapabilityRegistry> {
        &self.capabilities
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PluginRegistry {
        &mut self.registry
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Point the registry at the search paths and, with auto discovery on,
    /// load every plugin found. Without it plugins are only discovered.
    pub async fn start(&mut self) -> Result<Vec<PluginOutcome>> {
        if self.started {
            return Err(Error::lifecycle(KernelLifecyclePhase::Start, "Application already started"));
        }
        self.registry.initialize(self.config.plugin_search_paths.clone());
        let outcomes = if self.config.auto_discovery {
            self.registry.load_all().await?
        } else {
            let found = self.registry.discover_plugins().await?.len();
            log::info!("Auto discovery disabled; {} plugin(s) discovered, none loaded", found);
            Vec::new()
        };
        self.started = true;
        Ok(outcomes)
    }

    fn ensure_running(&self, phase: KernelLifecyclePhase) -> Result<()> {
        if !self.started {
            return Err(Error::lifecycle(phase, "Application has not been started"));
        }
        if self.stopped {
            return Err(Error::lifecycle(phase, "Application has been shut down"));
        }
        Ok(())
    }

    /// Run one registered command to completion (or interrupt).
    pub async fn run_command(&self, name: &str, args: Vec<String>) -> Result<CommandOutcome> {
        self.ensure_running(KernelLifecyclePhase::Run)?;
        Ok(CommandRunner::new(self.capabilities.clone()).run(name, args).await)
    }

    /// Theme named in the configuration, falling back to the default.
    pub fn theme(&self) -> Theme {
        Theme::named(&self.config.theme).unwrap_or_else(|| {
            log::warn!(
                "Unknown theme '{}', using '{}'",
                self.config.theme,
                constants::DEFAULT_THEME
            );
            Theme::default_theme()
        })
    }

    /// Run the dashboard on `grid` until it exits, optionally starting on a page.
    pub fn run_dashboard<S, G>(&self, source: &mut S, grid: &mut G, page: Option<&str>) -> Result<DashboardSummary>
    where
        S: EventSource + ?Sized,
        G: CellGrid + ?Sized,
    {
        self.ensure_running(KernelLifecyclePhase::Run)?;
        let mut dashboard = Dashboard::build(self.capabilities.clone(), self.theme(), grid.size())
            .with_layout(self.config.dashboard_layout);
        if let Some(page) = page {
            dashboard.open_page(page)?;
        }
        dashboard.run(source, grid)
    }

    /// Shut every plugin down in reverse load order. Idempotent.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.stopped {
            log::debug!("Application already shut down");
            return ShutdownReport::default();
        }
        self.stopped = true;
        let report = self.registry.shutdown();
        log::info!("{} shut down", constants::APP_NAME);
        report
    }
}
