use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::{TempDir, tempdir};

use crate::capability::{CapabilityRegistry, ComponentKind};
use crate::config::ConfigData;
use crate::container::ServiceContainer;
use crate::plugin_system::tests::fixtures::{EventLog, Spec, catalog, entry, events, plugin_dir};
use crate::plugin_system::{
    CatalogEntry, LifecycleHook, LoadError, OutcomeStatus, PluginError, PluginRegistry, PluginState,
    PluginSystemError,
};

fn registry_with(entries: Vec<CatalogEntry>) -> PluginRegistry {
    PluginRegistry::new(
        catalog(entries),
        Arc::new(ServiceContainer::new()),
        Arc::new(CapabilityRegistry::new()),
        ConfigData::new(),
    )
}

/// Root with one directory per entry reference
fn root_for(names: &[&str]) -> TempDir {
    let root = tempdir().unwrap();
    for name in names {
        plugin_dir(root.path(), name, name, None);
    }
    root
}

#[tokio::test]
async fn test_operations_require_initialize() {
    let mut registry = registry_with(Vec::new());

    assert!(matches!(registry.discover_plugins().await, Err(PluginSystemError::NotInitialized)));
    assert!(matches!(registry.load_plugin("x").await, Err(PluginSystemError::NotInitialized)));
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let root = root_for(&["alpha"]);
    let log = EventLog::default();
    let mut registry = registry_with(vec![entry("alpha", Spec::new("alpha", &log))]);

    assert!(registry.initialize(vec![root.path().to_path_buf()]));
    assert!(!registry.initialize(vec![PathBuf::from("/elsewhere")]));
    assert_eq!(registry.search_paths(), [root.path().to_path_buf()]);

    assert!(registry.reinitialize(vec![PathBuf::from("/elsewhere")]));
    assert_eq!(registry.search_paths(), [PathBuf::from("/elsewhere")]);
}

#[tokio::test]
async fn test_discovery_is_cached_until_rediscover() {
    let root = root_for(&["alpha"]);
    let mut registry = registry_with(Vec::new());
    registry.initialize(vec![root.path().to_path_buf()]);

    assert_eq!(registry.discover_plugins().await.unwrap().len(), 1);
    plugin_dir(root.path(), "beta", "beta", None);
    assert_eq!(registry.discover_plugins().await.unwrap().len(), 1);
    assert_eq!(registry.rediscover().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_load_plugin_runs_lifecycle_once() {
    let root = root_for(&["alpha"]);
    let log = EventLog::default();
    let mut registry = registry_with(vec![entry("alpha", Spec::new("alpha", &log).command("hello"))]);
    registry.initialize(vec![root.path().to_path_buf()]);

    let state = registry.load_plugin("alpha").await.unwrap().state();
    assert_eq!(state, PluginState::Active);
    registry.load_plugin("alpha").await.unwrap();

    assert_eq!(events(&log), vec!["alpha initialize", "alpha register"]);
    assert!(registry.get_command("hello").is_some());
    assert_eq!(registry.list_commands(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn test_load_unknown_plugin() {
    let root = root_for(&[]);
    let mut registry = registry_with(Vec::new());
    registry.initialize(vec![root.path().to_path_buf()]);

    let err = registry.load_plugin("ghost").await.unwrap_err();
    assert!(matches!(err, PluginSystemError::UnknownPlugin(name) if name == "ghost"));
}

#[tokio::test]
async fn test_load_all_reports_each_plugin() {
    let root = root_for(&["alpha", "beta", "gamma"]);
    let log = EventLog::default();
    let mut broken = Spec::new("gamma", &log);
    broken.fail_init = true;
    let mut registry = registry_with(vec![
        entry("alpha", Spec::new("alpha", &log).command("hello")),
        entry("beta", Spec::new("beta", &log).command("hello")),
        entry("gamma", broken),
    ]);
    registry.initialize(vec![root.path().to_path_buf()]);

    let outcomes = registry.load_all().await.unwrap();
    let statuses: Vec<(&str, bool)> = outcomes.iter().map(|o| (o.name.as_str(), o.is_loaded())).collect();

    assert_eq!(statuses, vec![("alpha", true), ("beta", false), ("gamma", false)]);
    assert!(matches!(outcomes[1].status, OutcomeStatus::Failed(LoadError::NameConflict { .. })));
    assert!(matches!(outcomes[2].status, OutcomeStatus::Failed(LoadError::Initialization { .. })));
    assert_eq!(registry.loaded_plugins(), ["alpha".to_string()]);
    assert_eq!(registry.failures().len(), 2);
    assert_eq!(registry.capabilities().owner_of(ComponentKind::Command, "hello").as_deref(), Some("alpha"));
}

#[tokio::test]
async fn test_same_name_in_later_root_is_shadowed() {
    let first = root_for(&["alpha"]);
    let second = root_for(&["alpha"]);
    let log = EventLog::default();
    let mut registry = registry_with(vec![entry("alpha", Spec::new("alpha", &log))]);
    registry.initialize(vec![first.path().to_path_buf(), second.path().to_path_buf()]);

    let outcomes = registry.load_all().await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].status, OutcomeStatus::Loaded);
    assert_eq!(outcomes[0].location, first.path().join("alpha"));
    assert_eq!(outcomes[1].status, OutcomeStatus::Shadowed);
}

#[tokio::test]
async fn test_dependency_on_later_plugin_is_retried() {
    let root = tempdir().unwrap();
    plugin_dir(
        root.path(),
        "aardvark",
        "aardvark",
        Some(("plugin.json", r#"{"name": "aardvark", "dependencies": ["zebra.store"]}"#)),
    );
    plugin_dir(root.path(), "zebra", "zebra", None);
    let log = EventLog::default();
    let mut registry = registry_with(vec![
        entry("aardvark", Spec::new("aardvark", &log)),
        entry("zebra", Spec::new("zebra", &log).registers("zebra.store")),
    ]);
    registry.initialize(vec![root.path().to_path_buf()]);

    let outcomes = registry.load_all().await.unwrap();

    assert!(outcomes.iter().all(|o| o.status == OutcomeStatus::Loaded));
    assert_eq!(registry.loaded_plugins(), ["zebra".to_string(), "aardvark".to_string()]);
}

#[tokio::test]
async fn test_unsatisfiable_dependency_fails() {
    let root = tempdir().unwrap();
    plugin_dir(
        root.path(),
        "lonely",
        "lonely",
        Some(("plugin.json", r#"{"name": "lonely", "dependencies": ["nobody.home"]}"#)),
    );
    let log = EventLog::default();
    let mut registry = registry_with(vec![entry("lonely", Spec::new("lonely", &log))]);
    registry.initialize(vec![root.path().to_path_buf()]);

    let outcomes = registry.load_all().await.unwrap();

    assert!(matches!(&outcomes[0].status, OutcomeStatus::Failed(e) if e.is_dependency()));
}

#[tokio::test]
async fn test_shutdown_reverse_load_order_isolates_failures() {
    let root = root_for(&["alpha", "beta", "gamma"]);
    let log = EventLog::default();
    let mut stubborn = Spec::new("beta", &log);
    stubborn.fail_shutdown = true;
    let mut registry = registry_with(vec![
        entry("alpha", Spec::new("alpha", &log)),
        entry("beta", stubborn),
        entry("gamma", Spec::new("gamma", &log).registers("gamma.key")),
    ]);
    registry.initialize(vec![root.path().to_path_buf()]);
    registry.load_all().await.unwrap();
    log.lock().unwrap().clear();

    let report = registry.shutdown();

    assert_eq!(report.order, vec!["gamma", "beta", "alpha"]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].plugin, "beta");
    assert_eq!(events(&log), vec!["gamma shutdown", "beta shutdown", "alpha shutdown"]);
    assert!(!registry.container().has("gamma.key"));
    assert!(registry.loaded_plugins().is_empty());
}

#[tokio::test]
async fn test_unload_withdraws_components() {
    let root = root_for(&["alpha"]);
    let log = EventLog::default();
    let mut registry = registry_with(vec![entry(
        "alpha",
        Spec::new("alpha", &log).command("hello").service("alpha.svc", false),
    )]);
    registry.initialize(vec![root.path().to_path_buf()]);
    registry.load_plugin("alpha").await.unwrap();
    assert_eq!(registry.components_of("alpha").len(), 2);

    let errors = registry.unload_plugin("alpha").unwrap();

    assert!(errors.is_empty());
    assert!(registry.get_command("hello").is_none());
    assert!(registry.get_service("alpha.svc").is_none());
    assert!(!registry.is_loaded("alpha"));
    assert!(matches!(registry.unload_plugin("alpha"), Err(PluginSystemError::NotLoaded(_))));
}

#[tokio::test]
async fn test_reload_picks_up_new_plugins() {
    let root = root_for(&["alpha"]);
    let log = EventLog::default();
    let mut registry = registry_with(vec![
        entry("alpha", Spec::new("alpha", &log)),
        entry("beta", Spec::new("beta", &log).command("late")),
    ]);
    registry.initialize(vec![root.path().to_path_buf()]);
    registry.load_all().await.unwrap();

    plugin_dir(root.path(), "beta", "beta", None);
    let outcomes = registry.reload_plugins().await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.status == OutcomeStatus::Loaded));
    assert!(registry.get_command("late").is_some());
    let alpha_inits = events(&log).iter().filter(|e| *e == "alpha initialize").count();
    assert_eq!(alpha_inits, 2);
}

#[tokio::test]
async fn test_hooks_fire_around_lifecycle() {
    let root = root_for(&["alpha", "broken"]);
    let log = EventLog::default();
    let mut broken = Spec::new("broken", &log);
    broken.fail_init = true;
    let mut registry = registry_with(vec![entry("alpha", Spec::new("alpha", &log)), entry("broken", broken)]);
    registry.initialize(vec![root.path().to_path_buf()]);

    let seen = Arc::new(Mutex::new(Vec::new()));
    for hook in [
        LifecycleHook::BeforeLoad,
        LifecycleHook::BeforeActivate,
        LifecycleHook::BeforeUnload,
        LifecycleHook::OnError,
    ] {
        let seen = seen.clone();
        registry.hooks_mut().register(hook, move |ctx| {
            seen.lock().unwrap().push(format!("{} {}", ctx.hook, ctx.plugin));
            Ok(())
        });
    }
    // a failing hook must not block loading
    registry
        .hooks_mut()
        .register(LifecycleHook::BeforeLoad, |_| Err(PluginError::new("hook failed")));

    registry.load_all().await.unwrap();
    registry.shutdown();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "before_load alpha",
            "before_activate alpha",
            "before_load broken",
            "on_error broken",
            "before_unload alpha",
        ]
    );
    assert!(!registry.is_loaded("alpha"));
}

#[tokio::test]
async fn test_plugins_summary() {
    let root = root_for(&["alpha"]);
    let log = EventLog::default();
    let mut registry = registry_with(vec![entry("alpha", Spec::new("alpha", &log).command("a").widget("b"))]);
    registry.initialize(vec![root.path().to_path_buf()]);
    registry.load_all().await.unwrap();

    let summary = registry.plugins();

    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].name, "alpha");
    assert_eq!(summary[0].version, "1.0.0");
    assert_eq!(summary[0].state, PluginState::Active);
    assert_eq!(summary[0].components, 2);
}

#[tokio::test]
async fn test_components_resolve_through_the_registry_not_the_container() {
    let root = root_for(&["alpha", "beta"]);
    let log = EventLog::default();
    let mut registry = registry_with(vec![
        entry("alpha", Spec::new("alpha", &log).command("run")),
        entry("beta", Spec::new("beta", &log).widget("status")),
    ]);
    registry.initialize(vec![root.path().to_path_buf()]);

    let outcomes = registry.load_all().await.unwrap();

    assert!(outcomes.iter().all(|o| o.status == OutcomeStatus::Loaded));
    assert_eq!(registry.get_command("run").map(|c| c.name().to_string()), Some("run".to_string()));
    assert!(registry.get_widget("status").is_some());
    assert_eq!(
        registry.components_of("beta"),
        vec![(ComponentKind::Widget, "status".to_string())]
    );
    // plugins only reach the container through their own registrations
    assert!(registry.container().is_empty());
}
