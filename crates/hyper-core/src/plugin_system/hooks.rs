use std::collections::HashMap;
use std::fmt;

use crate::plugin_system::error::PluginError;
use crate::utils::catch_panic;

/// Points in a plugin's lifecycle where callbacks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    BeforeLoad,
    BeforeActivate,
    BeforeUnload,
    OnError,
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleHook::BeforeLoad => "before_load",
            LifecycleHook::BeforeActivate => "before_activate",
            LifecycleHook::BeforeUnload => "before_unload",
            LifecycleHook::OnError => "on_error",
        };
        f.write_str(name)
    }
}

/// What a hook callback is told
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub hook: LifecycleHook,
    pub plugin: &'a str,
    /// Set for [`LifecycleHook::OnError`]
    pub error: Option<&'a str>,
}

pub type HookId = u64;

type HookFn = Box<dyn Fn(&HookContext<'_>) -> Result<(), PluginError> + Send + Sync>;

/// Callbacks fired by the plugin registry. A failing or panicking callback is
/// logged; it never stops the lifecycle step that fired it.
pub struct LifecycleHooks {
    callbacks: HashMap<LifecycleHook, Vec<(HookId, HookFn)>>,
    next_id: HookId,
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.callbacks.values().map(Vec::len).sum();
        f.debug_struct("LifecycleHooks")
            .field("callbacks", &total)
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Default for LifecycleHooks {
    fn default() -> Self {
        Self { callbacks: HashMap::new(), next_id: 1 }
    }
}

impl LifecycleHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, hook: LifecycleHook, callback: F) -> HookId
    where
        F: Fn(&HookContext<'_>) -> Result<(), PluginError> + Send + Sync + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks.entry(hook).or_default().push((id, Box::new(callback)));
        id
    }

    pub fn unregister(&mut self, id: HookId) -> bool {
        let mut found = false;
        for callbacks in self.callbacks.values_mut() {
            let before = callbacks.len();
            callbacks.retain(|(cb_id, _)| *cb_id != id);
            found |= callbacks.len() < before;
        }
        found
    }

    /// Run every callback for `context.hook` in registration order.
    pub fn fire(&self, context: &HookContext<'_>) {
        let Some(callbacks) = self.callbacks.get(&context.hook) else { return };
        for (id, callback) in callbacks {
            match catch_panic(|| callback(context)) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::warn!(
                    "Hook {} #{} failed for plugin '{}': {}",
                    context.hook,
                    id,
                    context.plugin,
                    e
                ),
                Err(panic) => log::error!(
                    "Hook {} #{} panicked for plugin '{}': {}",
                    context.hook,
                    id,
                    context.plugin,
                    panic
                ),
            }
        }
    }

    pub fn count(&self, hook: LifecycleHook) -> usize {
        self.callbacks.get(&hook).map(Vec::len).unwrap_or(0)
    }
}
