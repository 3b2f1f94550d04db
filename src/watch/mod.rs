//! Change detection by polling.
//!
//! # Data Flow
//! ```text
//! Fixed-interval tick (single background task)
//!     → for each registered target, in registration order:
//!         probe last-modified marker
//!             probe error     → skip target this tick
//!             marker <= seen  → nothing to do
//!             marker >  seen  → record marker, invoke callback
//! ```
//!
//! # Design Decisions
//! - Polling, not OS file events: one timer loop, no platform notification
//!   semantics to paper over, works on any filesystem
//! - Markers compare strictly newer-than; equal markers never fire
//! - `last_seen` advances before the callback runs, so a slow callback
//!   cannot re-fire on the change it is already handling
//! - Callbacks run synchronously inside the tick; a slow one delays later
//!   targets in that tick but never crashes the loop

use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tokio::sync::broadcast;
use tokio::time;

type MarkerProbe = Box<dyn Fn() -> io::Result<SystemTime> + Send>;
type ChangeCallback = Box<dyn Fn() + Send>;

struct WatchTarget {
    name: String,
    probe: MarkerProbe,
    on_change: ChangeCallback,
    last_seen: SystemTime,
}

/// Polls registered resources for marker changes on a fixed interval.
pub struct FileWatcher {
    interval: Duration,
    targets: Vec<WatchTarget>,
}

impl FileWatcher {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            targets: Vec::new(),
        }
    }

    /// Register a target, recording its current marker now.
    ///
    /// Fails if the marker cannot be obtained at registration time, e.g.
    /// when the watched resource does not exist yet.
    pub fn add_target(
        &mut self,
        name: impl Into<String>,
        probe: impl Fn() -> io::Result<SystemTime> + Send + 'static,
        on_change: impl Fn() + Send + 'static,
    ) -> io::Result<()> {
        let last_seen = probe()?;
        self.targets.push(WatchTarget {
            name: name.into(),
            probe: Box::new(probe),
            on_change: Box::new(on_change),
            last_seen,
        });
        Ok(())
    }

    /// Watch a file by its modification time.
    pub fn watch_file(
        &mut self,
        path: impl AsRef<Path>,
        on_change: impl Fn() + Send + 'static,
    ) -> io::Result<()> {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        let probe = move || std::fs::metadata(&path).and_then(|meta| meta.modified());
        self.add_target(name, probe, on_change)
    }

    /// Run the polling loop until the shutdown signal fires.
    ///
    /// An in-flight tick completes before the loop exits.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            targets = self.targets.len(),
            "change watcher starting"
        );

        let mut ticker = time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.check_targets(),
                _ = shutdown.recv() => {
                    tracing::info!("change watcher received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn check_targets(&mut self) {
        for target in &mut self.targets {
            let marker = match (target.probe)() {
                Ok(marker) => marker,
                Err(err) => {
                    tracing::debug!(
                        target = %target.name,
                        error = %err,
                        "marker probe failed, skipping this tick"
                    );
                    continue;
                }
            };
            if marker <= target.last_seen {
                continue;
            }
            target.last_seen = marker;
            tracing::info!(target = %target.name, "change detected");
            (target.on_change)();
        }
    }
}
