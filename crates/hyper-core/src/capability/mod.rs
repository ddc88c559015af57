//! # Hyper Core Capabilities
//!
//! The fixed set of things a plugin can publish ([`Command`], [`Widget`],
//! [`Page`], [`Service`]) and the process-wide [`CapabilityRegistry`] that
//! indexes them by kind and name.
pub mod command;
pub mod error;
pub mod page;
pub mod registry;
pub mod service;
pub mod widget;

use std::fmt;
use std::sync::Arc;

pub use command::{Command, CommandInfo};
pub use error::{CapabilityError, CommandError, ServiceError};
pub use page::{Page, PageAction};
pub use registry::{CapabilityRegistry, ComponentRecord};
pub use service::{HealthStatus, Service};
pub use widget::{Widget, WidgetChrome};

/// Builds a fresh widget for every render tree that shows it
pub type WidgetFactory = Arc<dyn Fn() -> Box<dyn Widget> + Send + Sync>;

/// Builds a fresh page each time it is opened
pub type PageFactory = Arc<dyn Fn() -> Box<dyn Page> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Command,
    Widget,
    Page,
    Service,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] =
        [ComponentKind::Command, ComponentKind::Widget, ComponentKind::Page, ComponentKind::Service];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Command => "command",
            ComponentKind::Widget => "widget",
            ComponentKind::Page => "page",
            ComponentKind::Service => "service",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One published implementation
#[derive(Clone)]
pub enum Component {
    Command(Arc<dyn Command>),
    Widget { name: String, factory: WidgetFactory },
    Page { name: String, factory: PageFactory },
    Service(Arc<dyn Service>),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Command(_) => ComponentKind::Command,
            Component::Widget { .. } => ComponentKind::Widget,
            Component::Page { .. } => ComponentKind::Page,
            Component::Service(_) => ComponentKind::Service,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Component::Command(command) => command.name(),
            Component::Widget { name, .. } | Component::Page { name, .. } => name.as_str(),
            Component::Service(service) => service.name(),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.name())
    }
}

/// What a plugin's `register` hands back, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ComponentSet {
    components: Vec<Component>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command<C: Command + 'static>(mut self, command: C) -> Self {
        self.components.push(Component::Command(Arc::new(command)));
        self
    }

    pub fn widget<W, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        W: Widget + 'static,
        F: Fn() -> W + Send + Sync + 'static,
    {
        let factory: WidgetFactory = Arc::new(move || Box::new(factory()) as Box<dyn Widget>);
        self.components.push(Component::Widget { name: name.into(), factory });
        self
    }

    pub fn page<P, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        P: Page + 'static,
        F: Fn() -> P + Send + Sync + 'static,
    {
        let factory: PageFactory = Arc::new(move || Box::new(factory()) as Box<dyn Page>);
        self.components.push(Component::Page { name: name.into(), factory });
        self
    }

    pub fn service<S: Service + 'static>(self, service: S) -> Self {
        self.shared_service(Arc::new(service))
    }

    /// Publish a service the plugin also keeps a handle to.
    pub fn shared_service(mut self, service: Arc<dyn Service>) -> Self {
        self.components.push(Component::Service(service));
        self
    }

    pub fn push(&mut self, component: Component) {
        self.components.push(component);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Names of one kind, sorted
    pub fn names(&self, kind: ComponentKind) -> Vec<String> {
        let mut names: Vec<String> = self
            .components
            .iter()
            .filter(|c| c.kind() == kind)
            .map(|c| c.name().to_string())
            .collect();
        names.sort();
        names
    }
}

impl IntoIterator for ComponentSet {
    type Item = Component;
    type IntoIter = std::vec::IntoIter<Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.into_iter()
    }
}

#[cfg(test)]
mod tests;
