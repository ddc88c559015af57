//! Example plugin: system load and memory, as a shared service, a command
//! and a dashboard widget.
pub mod sampler;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, info};

use hyper_core::capability::{
    Command, CommandError, ComponentSet, HealthStatus, Service, ServiceError, Widget, WidgetChrome,
};
use hyper_core::config::ConfigData;
use hyper_core::container::ServiceContainer;
use hyper_core::plugin_system::{CatalogEntry, EntryPoints, Plugin, PluginError, PluginMetadata};
use hyper_core::render::{ColorRole, DrawContext, Rect, RenderError};

pub use sampler::{LoadAverage, MemoryInfo, Sample, SystemSampler, PROC_ROOT};

pub const PLUGIN_NAME: &str = "system-status";
pub const PLUGIN_VERSION: &str = "0.1.0";
const DESCRIPTION: &str = "Load average and memory use from procfs";

/// Container key of the shared [`SystemSampler`]
pub const SAMPLER_KEY: &str = "system.sampler";

/// Widget ticks between two samples
pub const TICKS_PER_SAMPLE: u32 = 4;

pub fn catalog_entry() -> CatalogEntry {
    CatalogEntry::new(PLUGIN_NAME, SystemStatusPlugin::new).with_metadata(metadata())
}

pub fn metadata() -> PluginMetadata {
    PluginMetadata {
        name: PLUGIN_NAME.to_string(),
        version: PLUGIN_VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        author: "Hyper Developers".to_string(),
        dependencies: Vec::new(),
        entry_points: EntryPoints {
            commands: vec!["status".to_string()],
            widgets: vec![PLUGIN_NAME.to_string()],
            services: vec![PLUGIN_NAME.to_string()],
            ..EntryPoints::default()
        },
    }
}

pub struct SystemStatusPlugin {
    root: PathBuf,
    sampler: Option<Arc<SystemSampler>>,
}

impl SystemStatusPlugin {
    pub fn new() -> Self {
        Self::with_root(PROC_ROOT)
    }

    /// Read from another procfs root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), sampler: None }
    }

    fn sampler(&self) -> Arc<SystemSampler> {
        self.sampler.clone().unwrap_or_else(|| Arc::new(SystemSampler::new(&self.root)))
    }
}

impl Default for SystemStatusPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SystemStatusPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn author(&self) -> &str {
        "Hyper Developers"
    }

    fn provides(&self) -> Vec<String> {
        vec![SAMPLER_KEY.to_string()]
    }

    fn initialize(&mut self, container: &ServiceContainer) -> Result<(), PluginError> {
        info!("Initializing {} (reading {})", PLUGIN_NAME, self.root.display());
        let root = self.root.clone();
        container.register_singleton(SAMPLER_KEY, move |_| Ok(SystemSampler::new(root.clone())))?;
        self.sampler = Some(container.get_as::<SystemSampler>(SAMPLER_KEY)?);
        Ok(())
    }

    fn register(&self) -> ComponentSet {
        let sampler = self.sampler();
        let for_widget = sampler.clone();
        ComponentSet::new()
            .command(StatusCommand { sampler: sampler.clone() })
            .widget(PLUGIN_NAME, move || StatusWidget::new(for_widget.clone()))
            .service(StatusService::new(sampler))
    }

    fn shutdown(&mut self) -> Result<(), PluginError> {
        info!("Shutting down {}", PLUGIN_NAME);
        self.sampler = None;
        Ok(())
    }
}

// ===== SERVICE =====

/// Keeps the last reading; healthy while readings come back.
///
/// Config section keys: `strict` (bool) fails initialization when nothing
/// can be read.
pub struct StatusService {
    sampler: Arc<SystemSampler>,
    initialized: AtomicBool,
    last: Mutex<Option<Sample>>,
}

impl StatusService {
    pub fn new(sampler: Arc<SystemSampler>) -> Self {
        Self { sampler, initialized: AtomicBool::new(false), last: Mutex::new(None) }
    }

    pub fn last_sample(&self) -> Option<Sample> {
        self.last.lock().ok().and_then(|last| *last)
    }

    fn refresh(&self) -> Sample {
        let sample = self.sampler.sample();
        if let Ok(mut last) = self.last.lock() {
            *last = Some(sample);
        }
        sample
    }
}

impl Service for StatusService {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn initialize(&self, config: &ConfigData) -> Result<(), ServiceError> {
        let strict = config.get_or("strict", false);
        let sample = self.refresh();
        if strict && sample.is_empty() {
            return Err(ServiceError::Initialization {
                service: PLUGIN_NAME.to_string(),
                message: format!("nothing readable under {}", self.sampler.root().display()),
            });
        }
        self.initialized.store(true, Ordering::SeqCst);
        debug!("{} service initialized: {}", PLUGIN_NAME, sample);
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ServiceError> {
        if !self.initialized.swap(false, Ordering::SeqCst) {
            return Err(ServiceError::NotInitialized(PLUGIN_NAME.to_string()));
        }
        Ok(())
    }

    fn health_check(&self) -> HealthStatus {
        if !self.is_initialized() {
            return HealthStatus::unhealthy(PLUGIN_NAME, "not initialized");
        }
        if self.refresh().is_empty() {
            return HealthStatus::unhealthy(
                PLUGIN_NAME,
                format!("no readings under {}", self.sampler.root().display()),
            );
        }
        HealthStatus::healthy(PLUGIN_NAME)
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

// ===== COMMAND =====

pub struct StatusCommand {
    sampler: Arc<SystemSampler>,
}

#[async_trait]
impl Command for StatusCommand {
    fn name(&self) -> &str {
        "status"
    }

    fn description(&self) -> &str {
        "Print load average and memory use"
    }

    async fn execute(&self, _args: &[String]) -> Result<i32, CommandError> {
        let sample = self.sampler.sample();
        if sample.is_empty() {
            return Err(CommandError::Failed(format!(
                "no readings under {}",
                self.sampler.root().display()
            )));
        }
        println!("{}", sample);
        Ok(0)
    }
}

// ===== WIDGET =====

pub struct StatusWidget {
    chrome: WidgetChrome,
    sampler: Arc<SystemSampler>,
    sample: Sample,
    ticks: u32,
}

impl StatusWidget {
    pub fn new(sampler: Arc<SystemSampler>) -> Self {
        let sample = sampler.sample();
        Self { chrome: WidgetChrome::new("System"), sampler, sample, ticks: 0 }
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }
}

impl Widget for StatusWidget {
    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<(), RenderError> {
        self.chrome.draw_with(ctx, area, |ctx, inner| {
            let role = if self.sample.is_empty() { ColorRole::Warning } else { ColorRole::Text };
            let style = ctx.style(role);
            ctx.print(inner.x, inner.y, &self.sample.load_line(), style);
            if inner.height > 1 {
                ctx.print(inner.x, inner.y + 1, &self.sample.memory_line(), style);
            }
            Ok(())
        })
    }

    fn minimum_size(&self) -> (u16, u16) {
        (24, 4)
    }

    fn focusable(&self) -> bool {
        false
    }

    fn tick(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks < TICKS_PER_SAMPLE {
            return false;
        }
        self.ticks = 0;
        let sample = self.sampler.sample();
        let changed = sample != self.sample;
        self.sample = sample;
        changed
    }
}
