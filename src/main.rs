//! redirectd (v1)
//!
//! A host-based HTTP redirect service built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────┐
//!                      │                   REDIRECTD                     │
//!                      │                                                 │
//!     Client Request   │  ┌─────────┐    ┌─────────┐    ┌────────────┐  │
//!     ─────────────────┼─▶│  http   │───▶│ engine  │───▶│ rule table │  │
//!                      │  │ server  │    │ resolve │    │ (snapshot) │  │
//!                      │  └─────────┘    └────┬────┘    └────────────┘  │
//!                      │                      │                         │
//!     301 / 404 / 500  │                      ▼                         │
//!     ◀────────────────┼──────────────┌────────────┐                    │
//!                      │              │ hit counter│                    │
//!                      │              └────────────┘                    │
//!                      │                                                 │
//!                      │  ┌──────────────────────────────────────────┐  │
//!                      │  │           Cross-Cutting Concerns          │  │
//!                      │  │  ┌────────┐ ┌───────┐ ┌───────┐ ┌──────┐ │  │
//!                      │  │  │ config │ │ watch │ │ admin │ │obser-│ │  │
//!                      │  │  │        │ │ +store│ │  API  │ │vabil.│ │  │
//!                      │  │  └────────┘ └───────┘ └───────┘ └──────┘ │  │
//!                      │  │  ┌─────────────────────────────────────┐ │  │
//!                      │  │  │      lifecycle (signals/shutdown)    │ │  │
//!                      │  │  └─────────────────────────────────────┘ │  │
//!                      │  └──────────────────────────────────────────┘  │
//!                      └────────────────────────────────────────────────┘
//! ```
//!
//! Rules live in a JSON file. The file is polled for changes and rebuilt
//! into an immutable table that is swapped in atomically; a failed rebuild
//! keeps the previous table serving.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use redirectd::admin::{setup_admin_router, AdminState};
use redirectd::config::load_config_or_default;
use redirectd::engine::RedirectEngine;
use redirectd::http::HttpServer;
use redirectd::lifecycle::{signals, Shutdown};
use redirectd::observability::{logging, metrics};
use redirectd::stats::HitCounter;
use redirectd::storage::{JsonFileStore, RuleStore};
use redirectd::watch::FileWatcher;

/// Host-based HTTP redirect service.
#[derive(Parser)]
#[command(name = "redirectd", version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config_or_default(cli.config.as_deref())
        .map_err(|err| format!("failed to load configuration: {err}"))?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("redirectd v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rules_file = %config.rules.file,
        poll_interval_ms = config.rules.poll_interval_ms,
        request_timeout_secs = config.timeouts.request_secs,
        "configuration loaded"
    );

    // Engine and storage; the first load is fatal on a corrupt rules file.
    let stats = Arc::new(HitCounter::new());
    let engine = Arc::new(RedirectEngine::new(stats));
    let store: Arc<dyn RuleStore> = Arc::new(JsonFileStore::new(&config.rules.file));

    store.reload()?;
    engine.reload(&store.all()?)?;
    tracing::info!(rules = engine.rule_count(), "initial rules loaded");

    let shutdown = Shutdown::new();

    // Rule-file watcher: on change, refresh the store and rebuild the
    // table. Every failure keeps the previous rules serving.
    let mut watcher = FileWatcher::new(Duration::from_millis(config.rules.poll_interval_ms));
    {
        let store = store.clone();
        let engine = engine.clone();
        let reload = move || {
            if let Err(err) = store.reload() {
                tracing::warn!(error = %err, "rules file changed but could not be read, keeping previous rules");
                metrics::record_reload("store_failure");
                return;
            }
            let rules = match store.all() {
                Ok(rules) => rules,
                Err(err) => {
                    tracing::warn!(error = %err, "rule listing failed, keeping previous rules");
                    metrics::record_reload("store_failure");
                    return;
                }
            };
            match engine.reload(&rules) {
                Ok(()) => {
                    metrics::record_reload("success");
                    metrics::record_rule_count(engine.rule_count());
                    tracing::info!(rules = engine.rule_count(), "rules reloaded");
                }
                Err(err) => {
                    metrics::record_reload("build_failure");
                    tracing::warn!(error = %err, "rule table rebuild failed, keeping previous rules");
                }
            }
        };
        if let Err(err) = watcher.watch_file(&config.rules.file, reload) {
            tracing::warn!(
                file = %config.rules.file,
                error = %err,
                "cannot watch rules file, hot reload disabled"
            );
        }
    }
    tokio::spawn(watcher.run(shutdown.subscribe()));

    // Admin API on its own listener.
    if config.admin.enabled {
        let state = AdminState {
            store: store.clone(),
            engine: engine.clone(),
            api_key: config.admin.api_key.clone(),
        };
        let router = setup_admin_router(state);
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "admin listener starting");

        let mut admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = admin_shutdown.recv().await;
            });
            if let Err(err) = serve.await {
                tracing::error!(error = %err, "admin listener failed");
            }
        });
    }

    // Metrics exporter on its own listener.
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            match metrics::init_metrics(addr) {
                Ok(()) => metrics::record_rule_count(engine.rule_count()),
                Err(err) => tracing::error!(error = %err, "failed to start metrics endpoint"),
            }
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            );
        }
    }

    // SIGINT/SIGTERM fan out to every listener and the watcher.
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, engine);
    server.run(listener, server_shutdown).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
