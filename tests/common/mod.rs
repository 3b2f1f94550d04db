//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;

use redirectd::admin::{setup_admin_router, AdminState};
use redirectd::config::RedirectorConfig;
use redirectd::engine::RedirectEngine;
use redirectd::http::HttpServer;
use redirectd::lifecycle::Shutdown;

/// Serve the redirect surface on an ephemeral port.
///
/// The listener is bound before the task is spawned, so requests can be
/// sent as soon as this returns.
pub async fn spawn_redirect_server(engine: Arc<RedirectEngine>, shutdown: &Shutdown) -> SocketAddr {
    let config = RedirectorConfig::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(&config, engine);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    addr
}

/// Serve the admin API on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_admin_server(state: AdminState, shutdown: &Shutdown) -> SocketAddr {
    let router = setup_admin_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = rx.recv().await;
            })
            .await;
    });
    addr
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// GET `path` on the server at `addr`, addressed to `host`.
pub async fn get_as_host(
    client: &reqwest::Client,
    addr: SocketAddr,
    host: &str,
    path: &str,
) -> reqwest::Response {
    client
        .get(format!("http://{addr}{path}"))
        .header(reqwest::header::HOST, host)
        .send()
        .await
        .expect("redirect server unreachable")
}

/// Write a rules file in the on-disk JSON shape.
#[allow(dead_code)]
pub fn write_rules_file(path: &Path, rules: &[(&str, &str, bool)]) {
    let rules: Vec<serde_json::Value> = rules
        .iter()
        .map(|(host, target, is_template)| {
            serde_json::json!({
                "host": host,
                "target": target,
                "isTemplate": is_template,
            })
        })
        .collect();
    let body =
        serde_json::to_string_pretty(&serde_json::json!({ "rules": rules })).unwrap();
    std::fs::write(path, body).unwrap();
}
