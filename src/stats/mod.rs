//! Per-host visit counting.
//!
//! # Responsibilities
//! - Count successful redirects per host
//! - Stay cheap on the hot path under arbitrary concurrency
//!
//! # Design Decisions
//! - Sharded map with atomic counters: a re-touch is a shard read plus a
//!   relaxed increment, no allocation
//! - Growth is bounded by the universe of configured hosts, so entries are
//!   never evicted

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

/// Concurrent host → visit-count map.
#[derive(Debug, Default)]
pub struct HitCounter {
    visits: DashMap<String, AtomicU64>,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one visit for `host`, creating the entry on first sight.
    pub fn touch(&self, host: &str) {
        // Fast path: the key allocation and shard write lock are only paid
        // on the first touch of a host.
        if let Some(count) = self.visits.get(host) {
            count.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.visits
            .entry(host.to_owned())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Visits recorded for `host`; 0 for hosts never seen.
    pub fn visits(&self, host: &str) -> u64 {
        self.visits
            .get(host)
            .map(|count| count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}
