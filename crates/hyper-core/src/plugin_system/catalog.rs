use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginMetadata;
use crate::plugin_system::traits::Plugin;
use crate::utils::lock;

pub type PluginConstructor = Arc<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;

/// A named plugin factory
#[derive(Clone)]
pub struct CatalogEntry {
    reference: String,
    metadata: Option<PluginMetadata>,
    constructor: PluginConstructor,
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("reference", &self.reference)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl CatalogEntry {
    pub fn new<P, F>(reference: impl Into<String>, constructor: F) -> Self
    where
        P: Plugin + 'static,
        F: Fn() -> P + Send + Sync + 'static,
    {
        Self {
            reference: reference.into(),
            metadata: None,
            constructor: Arc::new(move || Box::new(constructor()) as Box<dyn Plugin>),
        }
    }

    /// Metadata discovery may read without constructing the plugin.
    pub fn with_metadata(mut self, metadata: PluginMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn metadata(&self) -> Option<&PluginMetadata> {
        self.metadata.as_ref()
    }

    pub fn construct(&self) -> Box<dyn Plugin> {
        (self.constructor)()
    }
}

/// Named factories that entry modules resolve against.
///
/// Built up front (the binary registers every plugin crate it links), then
/// shared read-only.
#[derive(Default)]
pub struct PluginCatalog {
    entries: HashMap<String, CatalogEntry>,
    resolutions: Mutex<HashMap<String, usize>>,
}

impl fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginCatalog").field("entries", &self.references()).finish()
    }
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: CatalogEntry) -> Result<(), PluginSystemError> {
        if self.entries.contains_key(entry.reference()) {
            return Err(PluginSystemError::DuplicateEntry(entry.reference().to_string()));
        }
        log::debug!("Catalog entry '{}' registered", entry.reference());
        self.entries.insert(entry.reference().to_string(), entry);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, entry: CatalogEntry) -> Result<Self, PluginSystemError> {
        self.register(entry)?;
        Ok(self)
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.entries.contains_key(reference)
    }

    /// Embedded metadata, without resolving the entry.
    pub fn metadata(&self, reference: &str) -> Option<PluginMetadata> {
        self.entries.get(reference).and_then(|e| e.metadata().cloned())
    }

    /// Resolve an entry for loading. Counted per reference.
    pub fn resolve(&self, reference: &str) -> Option<CatalogEntry> {
        let entry = self.entries.get(reference)?.clone();
        *lock(&self.resolutions).entry(reference.to_string()).or_insert(0) += 1;
        Some(entry)
    }

    /// How many times `reference` was resolved.
    pub fn resolutions(&self, reference: &str) -> usize {
        lock(&self.resolutions).get(reference).copied().unwrap_or(0)
    }

    /// All references, sorted
    pub fn references(&self) -> Vec<String> {
        let mut references: Vec<String> = self.entries.keys().cloned().collect();
        references.sort();
        references
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
