//! # Hyper Core Service Container
//!
//! String-keyed dependency injection. Every key maps to exactly one
//! [`Provider`] with a [`Lifetime`]:
//!
//! - `Instance` providers always hand back the same shared value.
//! - `Factory` providers with [`Lifetime::Singleton`] run at most once; the
//!   value is cached until [`ServiceContainer::reset_singletons`].
//! - `Factory` providers with [`Lifetime::Transient`] run on every lookup.
//!
//! Factories receive the container and may resolve other keys. A key that is
//! requested again while it is still being resolved on the same thread fails
//! with [`ContainerError::Cycle`] instead of recursing.
//!
//! No lock is held while a factory runs. A thread that asks for a singleton
//! another thread is building waits for that build, unless the builder is
//! itself waiting (directly or through other builders) on this thread; that
//! wait could never end, so it fails with [`ContainerError::Cycle`] too.
pub mod error;

use std::any::{Any, type_name};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock};
use std::thread::{self, ThreadId};

use crate::utils::{lock, read, write};
pub use error::ContainerError;

/// A resolved service value
pub type ServiceRef = Arc<dyn Any + Send + Sync>;

/// Factory closure stored by the container
pub type FactoryFn = Arc<dyn Fn(&ServiceContainer) -> Result<ServiceRef, ContainerError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    Singleton,
    Transient,
}

#[derive(Clone)]
pub enum Provider {
    Instance(ServiceRef),
    Factory(FactoryFn),
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Instance(_) => f.write_str("Instance"),
            Provider::Factory(_) => f.write_str("Factory"),
        }
    }
}

#[derive(Debug, Clone)]
struct ServiceEntry {
    provider: Provider,
    lifetime: Lifetime,
}

/// Cached singleton values and the builds in flight
#[derive(Debug, Default)]
struct Singletons {
    values: HashMap<String, ServiceRef>,
    /// Key to the thread running its factory
    building: HashMap<String, ThreadId>,
    /// Thread to the key whose build it waits for
    waiting: HashMap<ThreadId, String>,
}

impl Singletons {
    /// Whether `owner` is, through a chain of waits, waiting for `thread`.
    fn waits_for(&self, owner: ThreadId, thread: ThreadId) -> bool {
        let mut current = owner;
        for _ in 0..=self.waiting.len() {
            let Some(key) = self.waiting.get(&current) else { return false };
            match self.building.get(key) {
                Some(builder) if *builder == thread => return true,
                Some(builder) => current = *builder,
                None => return false,
            }
        }
        false
    }
}

/// Process-scoped service container
#[derive(Default)]
pub struct ServiceContainer {
    entries: RwLock<HashMap<String, ServiceEntry>>,
    singletons: Mutex<Singletons>,
    /// Signalled whenever a singleton build ends
    built: Condvar,
    /// Keys being resolved, per thread, in request order
    resolving: Mutex<HashMap<ThreadId, Vec<String>>>,
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("keys", &self.keys())
            .finish_non_exhaustive()
    }
}

/// Pops the key from the resolving stack when dropped.
struct ResolutionGuard<'a> {
    container: &'a ServiceContainer,
    thread: ThreadId,
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        let mut resolving = lock(&self.container.resolving);
        if let Some(stack) = resolving.get_mut(&self.thread) {
            stack.pop();
            if stack.is_empty() {
                resolving.remove(&self.thread);
            }
        }
    }
}

/// Ends a singleton build, also when the factory fails or panics.
struct BuildGuard<'a> {
    container: &'a ServiceContainer,
    key: &'a str,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        lock(&self.container.singletons).building.remove(self.key);
        self.container.built.notify_all();
    }
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under `key`. Fails if the key is taken.
    pub fn register(
        &self,
        key: impl Into<String>,
        provider: Provider,
        lifetime: Lifetime,
    ) -> Result<(), ContainerError> {
        let key = key.into();
        if matches!(provider, Provider::Instance(_)) && lifetime == Lifetime::Transient {
            return Err(ContainerError::InvalidLifetime { key });
        }
        let mut entries = write(&self.entries);
        if entries.contains_key(&key) {
            return Err(ContainerError::Conflict { key });
        }
        log::debug!("Registered service '{}' ({:?}, {:?})", key, provider, lifetime);
        entries.insert(key, ServiceEntry { provider, lifetime });
        Ok(())
    }

    /// Register a ready-made value.
    pub fn register_instance<T: Any + Send + Sync>(
        &self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), ContainerError> {
        self.register(key, Provider::Instance(Arc::new(value)), Lifetime::Singleton)
    }

    /// Register an already shared value.
    pub fn register_arc(&self, key: impl Into<String>, value: ServiceRef) -> Result<(), ContainerError> {
        self.register(key, Provider::Instance(value), Lifetime::Singleton)
    }

    /// Register a factory whose first result is cached.
    pub fn register_singleton<T, F>(&self, key: impl Into<String>, factory: F) -> Result<(), ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceContainer) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.register(key, Self::wrap_factory(factory), Lifetime::Singleton)
    }

    /// Register a factory that builds a fresh value on every lookup.
    pub fn register_transient<T, F>(&self, key: impl Into<String>, factory: F) -> Result<(), ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceContainer) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.register(key, Self::wrap_factory(factory), Lifetime::Transient)
    }

    fn wrap_factory<T, F>(factory: F) -> Provider
    where
        T: Any + Send + Sync,
        F: Fn(&ServiceContainer) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        Provider::Factory(Arc::new(move |container: &ServiceContainer| {
            factory(container).map(|value| Arc::new(value) as ServiceRef)
        }))
    }

    /// Resolve `key`.
    pub fn get(&self, key: &str) -> Result<ServiceRef, ContainerError> {
        let entry = read(&self.entries).get(key).cloned();
        let Some(entry) = entry else {
            return Err(ContainerError::Resolution {
                key: key.to_string(),
                available: self.keys(),
            });
        };

        let factory = match entry.provider {
            Provider::Instance(value) => return Ok(value),
            Provider::Factory(factory) => factory,
        };

        let _guard = self.enter(key)?;
        match entry.lifetime {
            Lifetime::Transient => factory(self),
            Lifetime::Singleton => self.get_singleton(key, &factory),
        }
    }

    fn get_singleton(&self, key: &str, factory: &FactoryFn) -> Result<ServiceRef, ContainerError> {
        let thread = thread::current().id();
        let mut singletons = lock(&self.singletons);
        loop {
            if let Some(value) = singletons.values.get(key) {
                return Ok(value.clone());
            }
            let Some(&owner) = singletons.building.get(key) else { break };
            if owner == thread || singletons.waits_for(owner, thread) {
                return Err(self.cycle_error(key));
            }
            singletons.waiting.insert(thread, key.to_string());
            singletons = self.wait_for_build(singletons);
            singletons.waiting.remove(&thread);
        }
        singletons.building.insert(key.to_string(), thread);
        drop(singletons);

        let build = BuildGuard { container: self, key };
        let value = factory(self)?;
        lock(&self.singletons).values.insert(key.to_string(), value.clone());
        drop(build);
        Ok(value)
    }

    fn wait_for_build<'a>(&self, guard: MutexGuard<'a, Singletons>) -> MutexGuard<'a, Singletons> {
        self.built.wait(guard).unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolve `key` and downcast to `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, ContainerError> {
        self.get(key)?.downcast::<T>().map_err(|_| ContainerError::TypeMismatch {
            key: key.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Like [`get`](Self::get), but an unregistered key is `Ok(None)`.
    pub fn get_optional(&self, key: &str) -> Result<Option<ServiceRef>, ContainerError> {
        if !self.has(key) {
            return Ok(None);
        }
        self.get(key).map(Some)
    }

    pub fn has(&self, key: &str) -> bool {
        read(&self.entries).contains_key(key)
    }

    /// Remove a registration and any cached value. Returns whether it existed.
    pub fn unregister(&self, key: &str) -> bool {
        let removed = write(&self.entries).remove(key).is_some();
        lock(&self.singletons).values.remove(key);
        if removed {
            log::debug!("Unregistered service '{}'", key);
        }
        removed
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = read(&self.entries).keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration and cached value.
    pub fn clear(&self) {
        write(&self.entries).clear();
        lock(&self.singletons).values.clear();
    }

    /// Forget cached singleton values; registrations stay.
    pub fn reset_singletons(&self) {
        lock(&self.singletons).values.clear();
    }

    /// Keys registered now that were not in `before`.
    pub fn keys_added_since(&self, before: &HashSet<String>) -> Vec<String> {
        self.keys().into_iter().filter(|key| !before.contains(key)).collect()
    }

    /// Cycle through `key`, chained from this thread's resolving stack.
    fn cycle_error(&self, key: &str) -> ContainerError {
        let thread = thread::current().id();
        let chain = lock(&self.resolving).get(&thread).cloned().unwrap_or_default();
        ContainerError::Cycle { key: key.to_string(), chain }
    }

    fn enter(&self, key: &str) -> Result<ResolutionGuard<'_>, ContainerError> {
        let thread = thread::current().id();
        let mut resolving = lock(&self.resolving);
        let stack = resolving.entry(thread).or_default();
        if stack.iter().any(|k| k == key) {
            let mut chain = stack.clone();
            chain.push(key.to_string());
            return Err(ContainerError::Cycle { key: key.to_string(), chain });
        }
        stack.push(key.to_string());
        Ok(ResolutionGuard { container: self, thread })
    }
}

#[cfg(test)]
mod tests;
