#![cfg(test)]

use std::path::PathBuf;

use tempfile::tempdir;

use crate::capability::ComponentKind;
use crate::commands::ExitStatus;
use crate::kernel::Application;
use crate::plugin_system::{LoadError, OutcomeStatus, PluginState};
use crate::tests::integration::common::{catalog, entries, install, journal, options, Fixture};

#[tokio::test]
async fn test_conflicting_plugin_is_rolled_back_completely() {
    let root = tempdir().unwrap();
    install(root.path(), "alpha", "alpha", None);
    install(root.path(), "beta", "beta", None);
    let journal = journal();
    let alpha = Fixture::new("alpha", &journal).command("hello", 0);
    let beta = Fixture::new("beta", &journal)
        .command("hello", 7)
        .widget("beta-panel")
        .key("beta.cache");
    let mut app = Application::new(options(&[root.path()]), catalog(vec![alpha.entry(), beta.entry()])).unwrap();

    let outcomes = app.start().await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].status, OutcomeStatus::Loaded);
    assert!(matches!(
        &outcomes[1].status,
        OutcomeStatus::Failed(LoadError::NameConflict { plugin, .. }) if plugin == "beta"
    ));

    // nothing beta published survives
    assert!(!app.capabilities().contains(ComponentKind::Widget, "beta-panel"));
    assert!(!app.container().has("beta.cache"));
    assert_eq!(app.capabilities().get(ComponentKind::Command, "hello").map(|r| r.owner), Some("alpha".to_string()));
    assert_eq!(app.registry().loaded_plugins(), ["alpha".to_string()]);
    assert!(app.registry().failures().contains_key("beta"));
    assert!(entries(&journal).contains(&"beta shutdown".to_string()));

    let outcome = app.run_command("hello", Vec::new()).await.unwrap();
    assert_eq!(outcome.code, ExitStatus::SUCCESS);
}

#[tokio::test]
async fn test_discovery_order_is_stable_across_runs() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    for dir in ["zeta", "mu", "alpha"] {
        install(first.path(), dir, dir, None);
    }
    for dir in ["omega", "beta"] {
        install(second.path(), dir, dir, None);
    }
    std::fs::create_dir_all(first.path().join("notes")).unwrap();

    let mut runs: Vec<Vec<(String, usize)>> = Vec::new();
    for _ in 0..2 {
        let journal = journal();
        let plugins = ["zeta", "mu", "alpha", "omega", "beta"]
            .iter()
            .map(|name| Fixture::new(name, &journal).entry())
            .collect();
        let mut app = Application::new(options(&[first.path(), second.path()]), catalog(plugins)).unwrap();
        app.start().await.unwrap();
        let found = app
            .registry_mut()
            .discover_plugins()
            .await
            .unwrap()
            .iter()
            .map(|d| (d.name().to_string(), d.search_root()))
            .collect();
        runs.push(found);
        assert_eq!(
            app.registry().loaded_plugins(),
            ["alpha", "beta", "mu", "omega", "zeta"].map(String::from)
        );
    }

    assert_eq!(runs[0], runs[1]);
    assert_eq!(
        runs[0],
        vec![
            ("alpha".to_string(), 0),
            ("beta".to_string(), 1),
            ("mu".to_string(), 0),
            ("omega".to_string(), 1),
            ("zeta".to_string(), 0),
        ]
    );
}

#[tokio::test]
async fn test_first_root_wins_for_duplicate_names() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let kept: PathBuf = install(first.path(), "tools", "tools", None);
    install(second.path(), "tools", "tools", None);
    let journal = journal();
    let tools = Fixture::new("tools", &journal).command("fmt", 0);
    let mut app = Application::new(options(&[first.path(), second.path()]), catalog(vec![tools.entry()])).unwrap();

    let outcomes = app.start().await.unwrap();

    assert_eq!(outcomes[0].status, OutcomeStatus::Loaded);
    assert_eq!(outcomes[0].location, kept);
    assert_eq!(outcomes[1].status, OutcomeStatus::Shadowed);
    assert_eq!(entries(&journal), vec!["tools initialize"]);
}

#[tokio::test]
async fn test_declared_dependency_orders_loading() {
    let root = tempdir().unwrap();
    install(root.path(), "a-reader", "reader", Some("name: reader\ndependencies:\n  - store.db\n"));
    install(root.path(), "b-store", "store", Some("name: store\n"));
    let journal = journal();
    let reader = Fixture::new("reader", &journal).command("read", 0);
    let store = Fixture::new("store", &journal).key("store.db");
    let mut app = Application::new(options(&[root.path()]), catalog(vec![reader.entry(), store.entry()])).unwrap();

    let outcomes = app.start().await.unwrap();

    assert!(outcomes.iter().all(|o| o.is_loaded()));
    assert_eq!(app.registry().loaded_plugins(), ["store".to_string(), "reader".to_string()]);
    assert_eq!(entries(&journal), vec!["store initialize", "reader initialize"]);

    let report = app.shutdown();
    assert_eq!(report.order, vec!["reader", "store"]);
    assert!(report.is_clean());
    assert!(!app.container().has("store.db"));
}

#[tokio::test]
async fn test_unknown_entry_fails_only_that_plugin() {
    let root = tempdir().unwrap();
    install(root.path(), "ghost", "nowhere", None);
    install(root.path(), "real", "real", None);
    let journal = journal();
    let real = Fixture::new("real", &journal).widget("clock");
    let mut app = Application::new(options(&[root.path()]), catalog(vec![real.entry()])).unwrap();

    let outcomes = app.start().await.unwrap();

    assert!(outcomes.iter().any(|o| o.name == "real" && o.is_loaded()));
    assert!(outcomes
        .iter()
        .any(|o| o.name == "ghost" && matches!(o.status, OutcomeStatus::Failed(LoadError::UnknownEntry { .. }))));
    assert_eq!(app.registry().list_widgets(), vec!["clock"]);
    let summary = app.registry().plugins();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].state, PluginState::Active);
}
