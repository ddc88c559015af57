#![cfg(test)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tempfile::tempdir;

use crate::kernel::Application;
use crate::plugin_system::CatalogEntry;
use crate::tests::integration::common::{catalog, install, options, ClientPlugin, Connection, PoolPlugin};

const CLIENT_YAML: &str = "dependencies:\n  - pool.shared\n  - pool.fresh\n";

fn pool_app(root: &std::path::Path) -> (Application, Arc<AtomicUsize>, Arc<Mutex<Vec<(String, usize)>>>) {
    // clients sort before the pool, so they wait for it
    install(root, "client-a", "client-a", Some(&format!("name: client-a\n{}", CLIENT_YAML)));
    install(root, "client-b", "client-b", Some(&format!("name: client-b\n{}", CLIENT_YAML)));
    install(root, "pool", "pool", None);

    let built = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let pool_built = built.clone();
    let mut entries = vec![CatalogEntry::new("pool", move || PoolPlugin { built: pool_built.clone() })];
    for name in ["client-a", "client-b"] {
        let seen = seen.clone();
        entries.push(CatalogEntry::new(name, move || ClientPlugin { name: name.to_string(), seen: seen.clone() }));
    }
    let app = Application::new(options(&[root]), catalog(entries)).unwrap();
    (app, built, seen)
}

#[tokio::test]
async fn test_singleton_is_shared_and_transient_is_fresh_across_plugins() {
    let root = tempdir().unwrap();
    let (mut app, built, seen) = pool_app(root.path());

    let outcomes = app.start().await.unwrap();
    assert!(outcomes.iter().all(|o| o.is_loaded()));
    assert_eq!(app.registry().loaded_plugins().first().map(String::as_str), Some("pool"));

    let seen = seen.lock().unwrap().clone();
    let shared: Vec<usize> = seen.iter().filter(|(k, _)| k.ends_with("shared")).map(|(_, s)| *s).collect();
    let fresh: Vec<usize> = seen.iter().filter(|(k, _)| k.ends_with("fresh")).map(|(_, s)| *s).collect();
    assert_eq!(shared.len(), 2);
    assert_eq!(shared[0], shared[1]);
    assert_eq!(fresh.len(), 2);
    assert_ne!(fresh[0], fresh[1]);
    // one singleton plus two transients
    assert_eq!(built.load(Ordering::SeqCst), 3);

    let a = app.container().get("pool.shared").unwrap();
    let b = app.container().get("pool.shared").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(built.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_concurrent_singleton_resolution_builds_once() {
    let root = tempdir().unwrap();
    let (mut app, built, _) = pool_app(root.path());
    app.start().await.unwrap();
    app.container().reset_singletons();
    let before = built.load(Ordering::SeqCst);

    let container = app.container().clone();
    let serials: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                scope.spawn(move || container.get_as::<Connection>("pool.shared").unwrap().serial)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(built.load(Ordering::SeqCst), before + 1);
    assert!(serials.iter().all(|s| *s == serials[0]));
}

#[tokio::test]
async fn test_unloading_provider_withdraws_its_keys() {
    let root = tempdir().unwrap();
    let (mut app, _, _) = pool_app(root.path());
    app.start().await.unwrap();

    app.registry_mut().unload_plugin("pool").unwrap();

    assert!(!app.container().has("pool.shared"));
    assert!(!app.container().has("pool.fresh"));
    assert!(app.container().get("pool.shared").is_err());
    assert!(app.registry().is_loaded("client-a"));
}
