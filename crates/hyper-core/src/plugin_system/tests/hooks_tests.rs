use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::plugin_system::{HookContext, LifecycleHook, LifecycleHooks, PluginError};

fn context(hook: LifecycleHook) -> HookContext<'static> {
    HookContext { hook, plugin: "alpha", error: None }
}

#[test]
fn test_fire_runs_only_matching_hooks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut hooks = LifecycleHooks::new();
    let counter = calls.clone();
    hooks.register(LifecycleHook::BeforeLoad, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    hooks.fire(&context(LifecycleHook::BeforeUnload));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    hooks.fire(&context(LifecycleHook::BeforeLoad));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unregister_by_id() {
    let mut hooks = LifecycleHooks::new();
    let first = hooks.register(LifecycleHook::OnError, |_| Ok(()));
    let second = hooks.register(LifecycleHook::OnError, |_| Ok(()));

    assert_ne!(first, second);
    assert!(hooks.unregister(first));
    assert!(!hooks.unregister(first));
    assert_eq!(hooks.count(LifecycleHook::OnError), 1);
}

#[test]
fn test_failing_and_panicking_hooks_do_not_stop_later_ones() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut hooks = LifecycleHooks::new();
    hooks.register(LifecycleHook::BeforeActivate, |_| Err(PluginError::new("nope")));
    hooks.register(LifecycleHook::BeforeActivate, |_| panic!("hook panic"));
    let counter = calls.clone();
    hooks.register(LifecycleHook::BeforeActivate, move |ctx| {
        assert_eq!(ctx.plugin, "alpha");
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    hooks.fire(&context(LifecycleHook::BeforeActivate));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
