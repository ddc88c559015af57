use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::capability::error::CapabilityError;
use crate::capability::{Command, Component, ComponentKind, Page, PageFactory, Service, Widget, WidgetFactory};
use crate::utils::{read, write};

/// A published component and the plugin that owns it
#[derive(Debug, Clone)]
pub struct ComponentRecord {
    pub kind: ComponentKind,
    pub name: String,
    pub owner: String,
    pub component: Component,
}

/// Process-wide index of published components.
///
/// Names are unique within a kind; a command and a widget may share a name.
/// Written only by the plugin registry, read from anywhere.
#[derive(Default)]
pub struct CapabilityRegistry {
    records: RwLock<BTreeMap<(ComponentKind, String), ComponentRecord>>,
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry").field("components", &self.len()).finish()
    }
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `component` on behalf of `owner`.
    pub fn insert(&self, owner: &str, component: Component) -> Result<(), CapabilityError> {
        let kind = component.kind();
        let name = component.name().to_string();
        let mut records = write(&self.records);
        if let Some(existing) = records.get(&(kind, name.clone())) {
            return Err(CapabilityError::NameConflict {
                kind,
                name,
                owner: owner.to_string(),
                existing_owner: existing.owner.clone(),
            });
        }
        log::debug!("Registered {} '{}' from plugin '{}'", kind, name, owner);
        records.insert(
            (kind, name.clone()),
            ComponentRecord { kind, name, owner: owner.to_string(), component },
        );
        Ok(())
    }

    pub fn remove(&self, kind: ComponentKind, name: &str) -> Option<ComponentRecord> {
        write(&self.records).remove(&(kind, name.to_string()))
    }

    /// Remove everything `owner` published. Returns the removed records.
    pub fn remove_owned_by(&self, owner: &str) -> Vec<ComponentRecord> {
        let mut records = write(&self.records);
        let keys: Vec<(ComponentKind, String)> = records
            .iter()
            .filter(|(_, record)| record.owner == owner)
            .map(|(key, _)| key.clone())
            .collect();
        keys.into_iter().filter_map(|key| records.remove(&key)).collect()
    }

    pub fn get(&self, kind: ComponentKind, name: &str) -> Option<ComponentRecord> {
        read(&self.records).get(&(kind, name.to_string())).cloned()
    }

    pub fn contains(&self, kind: ComponentKind, name: &str) -> bool {
        read(&self.records).contains_key(&(kind, name.to_string()))
    }

    pub fn command(&self, name: &str) -> Option<Arc<dyn Command>> {
        match self.get(ComponentKind::Command, name)?.component {
            Component::Command(command) => Some(command),
            _ => None,
        }
    }

    pub fn widget_factory(&self, name: &str) -> Option<WidgetFactory> {
        match self.get(ComponentKind::Widget, name)?.component {
            Component::Widget { factory, .. } => Some(factory),
            _ => None,
        }
    }

    /// Build a new instance of the named widget.
    pub fn create_widget(&self, name: &str) -> Option<Box<dyn Widget>> {
        self.widget_factory(name).map(|factory| factory())
    }

    pub fn page_factory(&self, name: &str) -> Option<PageFactory> {
        match self.get(ComponentKind::Page, name)?.component {
            Component::Page { factory, .. } => Some(factory),
            _ => None,
        }
    }

    pub fn create_page(&self, name: &str) -> Option<Box<dyn Page>> {
        self.page_factory(name).map(|factory| factory())
    }

    pub fn service(&self, name: &str) -> Option<Arc<dyn Service>> {
        match self.get(ComponentKind::Service, name)?.component {
            Component::Service(service) => Some(service),
            _ => None,
        }
    }

    /// Names of one kind, sorted
    pub fn names(&self, kind: ComponentKind) -> Vec<String> {
        read(&self.records)
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Records of one kind, sorted by name
    pub fn records(&self, kind: ComponentKind) -> Vec<ComponentRecord> {
        read(&self.records)
            .values()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect()
    }

    /// (kind, name) pairs published by `owner`
    pub fn owned_by(&self, owner: &str) -> Vec<(ComponentKind, String)> {
        read(&self.records)
            .values()
            .filter(|record| record.owner == owner)
            .map(|record| (record.kind, record.name.clone()))
            .collect()
    }

    pub fn owner_of(&self, kind: ComponentKind, name: &str) -> Option<String> {
        self.get(kind, name).map(|record| record.owner)
    }

    pub fn len(&self) -> usize {
        read(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        write(&self.records).clear();
    }
}
