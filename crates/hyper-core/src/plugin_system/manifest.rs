use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::capability::ComponentKind;
use crate::plugin_system::error::DiscoveryError;

/// File whose presence marks a plugin directory. Its trimmed content is the
/// catalog reference; empty means the directory name.
pub const ENTRY_MODULE_FILE: &str = "plugin.entry";

/// Version reported when neither descriptor nor embedded metadata give one
pub const DEFAULT_PLUGIN_VERSION: &str = "0.0.1";

/// Sidecar descriptor names, most preferred first
pub fn descriptor_file_names() -> Vec<&'static str> {
    let mut names = Vec::new();
    #[cfg(feature = "yaml-config")]
    names.extend(["plugin.yaml", "plugin.yml"]);
    names.push("plugin.json");
    #[cfg(feature = "toml-config")]
    names.push("plugin.toml");
    names
}

/// Component names a plugin declares up front
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPoints {
    pub commands: Vec<String>,
    pub widgets: Vec<String>,
    pub pages: Vec<String>,
    pub services: Vec<String>,
}

impl EntryPoints {
    pub fn names(&self, kind: ComponentKind) -> &[String] {
        match kind {
            ComponentKind::Command => &self.commands,
            ComponentKind::Widget => &self.widgets,
            ComponentKind::Page => &self.pages,
            ComponentKind::Service => &self.services,
        }
    }

    pub fn is_empty(&self) -> bool {
        ComponentKind::ALL.iter().all(|kind| self.names(*kind).is_empty())
    }
}

/// Metadata a catalog entry can report without constructing its plugin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub dependencies: Vec<String>,
    pub entry_points: EntryPoints,
}

/// On-disk sidecar shape; every field optional
#[derive(Debug, Default, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    entry_points: EntryPoints,
}

/// Where a descriptor's metadata came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    /// Sidecar file at this path
    Sidecar(PathBuf),
    /// The catalog entry's embedded metadata
    Embedded,
    /// Neither was available
    Defaults,
}

/// Everything known about a discovered plugin before it is loaded.
/// Built once by discovery and never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    name: String,
    version: String,
    description: String,
    author: String,
    dependencies: Vec<String>,
    entry_points: EntryPoints,
    location: PathBuf,
    entry: String,
    search_root: usize,
    source: MetadataSource,
}

impl PluginDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Container keys that must be resolvable before the plugin initializes
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn entry_points(&self) -> &EntryPoints {
        &self.entry_points
    }

    /// The plugin directory
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Catalog reference of the entry module
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Index of the search root the plugin was found under
    pub fn search_root(&self) -> usize {
        self.search_root
    }

    pub fn source(&self) -> &MetadataSource {
        &self.source
    }
}

/// Collects a descriptor's fields; sidecar values win over embedded
/// metadata, which wins over directory-derived defaults.
#[derive(Debug, Clone)]
pub(crate) struct DescriptorBuilder {
    location: PathBuf,
    entry: String,
    search_root: usize,
    metadata: PluginMetadata,
    source: MetadataSource,
}

impl DescriptorBuilder {
    pub(crate) fn new(location: PathBuf, entry: String, search_root: usize) -> Self {
        let dir_name = location
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = PluginMetadata {
            name: dir_name,
            version: DEFAULT_PLUGIN_VERSION.to_string(),
            ..PluginMetadata::default()
        };
        Self { location, entry, search_root, metadata, source: MetadataSource::Defaults }
    }

    pub(crate) fn embedded(mut self, metadata: PluginMetadata) -> Self {
        if !metadata.name.is_empty() {
            self.metadata.name = metadata.name;
        }
        if !metadata.version.is_empty() {
            self.metadata.version = metadata.version;
        }
        self.metadata.description = metadata.description;
        self.metadata.author = metadata.author;
        self.metadata.dependencies = metadata.dependencies;
        self.metadata.entry_points = metadata.entry_points;
        self.source = MetadataSource::Embedded;
        self
    }

    pub(crate) fn sidecar(mut self, path: &Path, content: &str) -> Result<Self, DiscoveryError> {
        let raw = parse_raw(path, content)?;
        if let Some(name) = raw.name.filter(|n| !n.trim().is_empty()) {
            self.metadata.name = name;
        }
        if let Some(version) = raw.version {
            self.metadata.version = version;
        }
        self.metadata.description = raw.description.unwrap_or_default();
        self.metadata.author = raw.author.unwrap_or_default();
        self.metadata.dependencies = raw.dependencies;
        self.metadata.entry_points = raw.entry_points;
        self.source = MetadataSource::Sidecar(path.to_path_buf());
        Ok(self)
    }

    pub(crate) fn build(self) -> PluginDescriptor {
        PluginDescriptor {
            name: self.metadata.name,
            version: self.metadata.version,
            description: self.metadata.description,
            author: self.metadata.author,
            dependencies: self.metadata.dependencies,
            entry_points: self.metadata.entry_points,
            location: self.location,
            entry: self.entry,
            search_root: self.search_root,
            source: self.source,
        }
    }
}

fn parse_raw(path: &Path, content: &str) -> Result<RawDescriptor, DiscoveryError> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let parsed = match extension {
        "json" => serde_json::from_str(content).map_err(|e| e.to_string()),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => {
            if content.trim().is_empty() {
                Ok(RawDescriptor::default())
            } else {
                serde_yaml::from_str(content).map_err(|e| e.to_string())
            }
        }
        #[cfg(feature = "toml-config")]
        "toml" => toml::from_str(content).map_err(|e| e.to_string()),
        other => Err(format!("unsupported descriptor format '{}'", other)),
    };
    parsed.map_err(|message| DiscoveryError::Descriptor { path: path.to_path_buf(), message })
}
