#![cfg(test)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::capability::{Command, CommandError, ComponentSet, Widget};
use crate::config::ConfigData;
use crate::container::{ContainerError, ServiceContainer};
use crate::plugin_system::{CatalogEntry, Plugin, PluginCatalog, PluginError};
use crate::render::{ColorRole, DrawContext, InputEvent, KeyCode, Rect, RenderError};

// ===== SHARED STATE =====

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

// ===== COMPONENTS =====

/// Exits with a fixed code so callers can tell which plugin answered.
pub struct FixedCommand {
    pub name: String,
    pub code: i32,
}

#[async_trait]
impl Command for FixedCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "exits with a fixed code"
    }

    async fn execute(&self, _args: &[String]) -> Result<i32, CommandError> {
        Ok(self.code)
    }
}

/// Prints its label and a counter bumped by ticks and the Up key.
pub struct Ticker {
    pub label: String,
    pub count: u32,
}

impl Widget for Ticker {
    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<(), RenderError> {
        let style = ctx.style(ColorRole::Text);
        ctx.print(area.x, area.y, &format!("{} {}", self.label, self.count), style);
        Ok(())
    }

    fn handle_input(&mut self, event: &InputEvent) -> bool {
        if event.code() == Some(KeyCode::Up) {
            self.count += 1;
            return true;
        }
        false
    }

    fn tick(&mut self) -> bool {
        self.count += 1;
        true
    }
}

// ===== PLUGINS =====

/// Plugin assembled from a list of commands, widgets and container keys.
#[derive(Clone)]
pub struct Fixture {
    pub name: String,
    pub commands: Vec<(String, i32)>,
    pub widgets: Vec<String>,
    /// Instance keys registered during initialize
    pub keys: Vec<String>,
    pub journal: Journal,
}

impl Fixture {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            commands: Vec::new(),
            widgets: Vec::new(),
            keys: Vec::new(),
            journal: journal.clone(),
        }
    }

    pub fn command(mut self, name: &str, code: i32) -> Self {
        self.commands.push((name.to_string(), code));
        self
    }

    pub fn widget(mut self, name: &str) -> Self {
        self.widgets.push(name.to_string());
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.keys.push(key.to_string());
        self
    }

    pub fn entry(self) -> CatalogEntry {
        let reference = self.name.clone();
        CatalogEntry::new(reference, move || FixturePlugin(self.clone()))
    }
}

pub struct FixturePlugin(Fixture);

impl FixturePlugin {
    fn note(&self, event: &str) {
        self.0.journal.lock().unwrap().push(format!("{} {}", self.0.name, event));
    }
}

impl Plugin for FixturePlugin {
    fn name(&self) -> &str {
        &self.0.name
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn provides(&self) -> Vec<String> {
        self.0.keys.clone()
    }

    fn initialize(&mut self, container: &ServiceContainer) -> Result<(), PluginError> {
        self.note("initialize");
        for key in &self.0.keys {
            container.register_instance(key.clone(), self.0.name.clone())?;
        }
        Ok(())
    }

    fn register(&self) -> ComponentSet {
        let mut set = ComponentSet::new();
        for (name, code) in &self.0.commands {
            set = set.command(FixedCommand { name: name.clone(), code: *code });
        }
        for name in &self.0.widgets {
            let label = name.clone();
            set = set.widget(name.clone(), move || Ticker { label: label.clone(), count: 0 });
        }
        set
    }

    fn shutdown(&mut self) -> Result<(), PluginError> {
        self.note("shutdown");
        Ok(())
    }
}

/// Value built by the pool plugin's factories
#[derive(Debug)]
pub struct Connection {
    pub serial: usize,
}

/// Registers a singleton and a transient factory that count constructions.
pub struct PoolPlugin {
    pub built: Arc<AtomicUsize>,
}

impl Plugin for PoolPlugin {
    fn name(&self) -> &str {
        "pool"
    }

    fn version(&self) -> &str {
        "2.0.0"
    }

    fn provides(&self) -> Vec<String> {
        vec!["pool.shared".to_string(), "pool.fresh".to_string()]
    }

    fn initialize(&mut self, container: &ServiceContainer) -> Result<(), PluginError> {
        let built = self.built.clone();
        container.register_singleton("pool.shared", move |_c: &ServiceContainer| {
            Ok::<_, ContainerError>(Connection { serial: built.fetch_add(1, Ordering::SeqCst) })
        })?;
        let built = self.built.clone();
        container.register_transient("pool.fresh", move |_c: &ServiceContainer| {
            Ok::<_, ContainerError>(Connection { serial: built.fetch_add(1, Ordering::SeqCst) })
        })?;
        Ok(())
    }

    fn register(&self) -> ComponentSet {
        ComponentSet::new()
    }
}

/// Resolves both pool keys while initializing and keeps what it got.
pub struct ClientPlugin {
    pub name: String,
    pub seen: Arc<Mutex<Vec<(String, usize)>>>,
}

impl Plugin for ClientPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn initialize(&mut self, container: &ServiceContainer) -> Result<(), PluginError> {
        let shared = container.get_as::<Connection>("pool.shared")?;
        let fresh = container.get_as::<Connection>("pool.fresh")?;
        let mut seen = self.seen.lock().unwrap();
        seen.push((format!("{} shared", self.name), shared.serial));
        seen.push((format!("{} fresh", self.name), fresh.serial));
        Ok(())
    }

    fn register(&self) -> ComponentSet {
        ComponentSet::new()
    }
}

// ===== LAYOUT =====

pub fn catalog(entries: Vec<CatalogEntry>) -> PluginCatalog {
    let mut catalog = PluginCatalog::new();
    for entry in entries {
        catalog.register(entry).unwrap();
    }
    catalog
}

/// `root/dir/plugin.entry` naming `reference`, plus an optional `plugin.yaml`.
pub fn install(root: &Path, dir: &str, reference: &str, yaml: Option<&str>) -> PathBuf {
    let path = root.join(dir);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("plugin.entry"), reference).unwrap();
    if let Some(yaml) = yaml {
        fs::write(path.join("plugin.yaml"), yaml).unwrap();
    }
    path
}

pub fn options(roots: &[&Path]) -> ConfigData {
    let mut options = ConfigData::new();
    let roots: Vec<PathBuf> = roots.iter().map(|r| r.to_path_buf()).collect();
    options.set("plugin_search_paths", roots).unwrap();
    options
}
