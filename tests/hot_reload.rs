//! Rule-file polling: edits on disk reach the serving table, bad edits
//! never do.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use redirectd::engine::RedirectEngine;
use redirectd::stats::HitCounter;
use redirectd::storage::{JsonFileStore, RuleStore};
use redirectd::{FileWatcher, Shutdown};

const POLL: Duration = Duration::from_millis(50);

/// Poll the server until the rule for `host` resolves to `expected`, or
/// give up after a few seconds.
async fn await_location(
    client: &reqwest::Client,
    addr: std::net::SocketAddr,
    host: &str,
    expected: &str,
) -> bool {
    for _ in 0..100 {
        let res = common::get_as_host(client, addr, host, "/").await;
        if res.status() == StatusCode::MOVED_PERMANENTLY
            && res.headers()["location"] == expected
        {
            return true;
        }
        tokio::time::sleep(POLL).await;
    }
    false
}

#[tokio::test]
async fn test_file_edits_flow_to_serving_table() {
    let dir = tempfile::tempdir().unwrap();
    let rules_path = dir.path().join("rules.json");
    common::write_rules_file(&rules_path, &[("a.test", "one.test", false)]);

    let engine = Arc::new(RedirectEngine::new(Arc::new(HitCounter::new())));
    let store: Arc<dyn RuleStore> = Arc::new(JsonFileStore::new(&rules_path));
    store.reload().unwrap();
    engine.reload(&store.all().unwrap()).unwrap();

    let shutdown = Shutdown::new();
    let mut watcher = FileWatcher::new(POLL);
    {
        let store = store.clone();
        let engine = engine.clone();
        watcher
            .watch_file(&rules_path, move || {
                if store.reload().is_err() {
                    return;
                }
                if let Ok(rules) = store.all() {
                    let _ = engine.reload(&rules);
                }
            })
            .unwrap();
    }
    tokio::spawn(watcher.run(shutdown.subscribe()));

    let addr = common::spawn_redirect_server(engine.clone(), &shutdown).await;
    let client = common::client();

    let res = common::get_as_host(&client, addr, "a.test", "/").await;
    assert_eq!(res.headers()["location"], "https://one.test");

    // Give the rewrite a distinct mtime before editing.
    tokio::time::sleep(Duration::from_millis(100)).await;
    common::write_rules_file(&rules_path, &[("a.test", "two.test", false)]);
    assert!(
        await_location(&client, addr, "a.test", "https://two.test").await,
        "edited rule never reached the serving table"
    );

    // A corrupt rewrite must leave the previous rules serving.
    tokio::time::sleep(Duration::from_millis(100)).await;
    std::fs::write(&rules_path, "{this is not json").unwrap();
    tokio::time::sleep(POLL * 6).await;
    let res = common::get_as_host(&client, addr, "a.test", "/").await;
    assert_eq!(
        res.headers()["location"], "https://two.test",
        "corrupt file must not disturb the serving table"
    );

    // Recovery: the next good write is picked up.
    tokio::time::sleep(Duration::from_millis(100)).await;
    common::write_rules_file(&rules_path, &[("a.test", "three.test", false)]);
    assert!(
        await_location(&client, addr, "a.test", "https://three.test").await,
        "rules never recovered after the corrupt write"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_removed_rule_disappears() {
    let dir = tempfile::tempdir().unwrap();
    let rules_path = dir.path().join("rules.json");
    common::write_rules_file(
        &rules_path,
        &[("a.test", "one.test", false), ("b.test", "two.test", false)],
    );

    let engine = Arc::new(RedirectEngine::new(Arc::new(HitCounter::new())));
    let store: Arc<dyn RuleStore> = Arc::new(JsonFileStore::new(&rules_path));
    store.reload().unwrap();
    engine.reload(&store.all().unwrap()).unwrap();

    let shutdown = Shutdown::new();
    let mut watcher = FileWatcher::new(POLL);
    {
        let store = store.clone();
        let engine = engine.clone();
        watcher
            .watch_file(&rules_path, move || {
                if store.reload().is_err() {
                    return;
                }
                if let Ok(rules) = store.all() {
                    let _ = engine.reload(&rules);
                }
            })
            .unwrap();
    }
    tokio::spawn(watcher.run(shutdown.subscribe()));

    let addr = common::spawn_redirect_server(engine, &shutdown).await;
    let client = common::client();

    tokio::time::sleep(Duration::from_millis(100)).await;
    common::write_rules_file(&rules_path, &[("a.test", "one.test", false)]);

    // b.test is gone once the edit lands; a.test keeps serving.
    let mut removed = false;
    for _ in 0..100 {
        let res = common::get_as_host(&client, addr, "b.test", "/").await;
        if res.status() == StatusCode::NOT_FOUND {
            removed = true;
            break;
        }
        tokio::time::sleep(POLL).await;
    }
    assert!(removed, "removed rule kept serving");

    let res = common::get_as_host(&client, addr, "a.test", "/").await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);

    shutdown.trigger();
}
