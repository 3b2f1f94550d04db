//! Redirection engine subsystem.
//!
//! # Data Flow
//! ```text
//! Request (host, path, query, headers)
//!     → engine resolve
//!     → load current RuleTable snapshot (atomic, lock-free)
//!     → exact host lookup
//!         miss                → NotFound
//!         literal target      → returned as built
//!         templated target    → rendered against the request, trimmed
//!     → hit counter touched on success
//!
//! Reload (watcher callback or admin mutation):
//!     Vec<Rule>
//!     → RuleTable::build (template compilation, last-write-wins folding)
//!         any compile error   → BuildError, active table untouched
//!         success             → atomic swap of the table pointer
//! ```
//!
//! # Design Decisions
//! - The active table is an `ArcSwap` snapshot: readers never block, and a
//!   lookup in flight during a swap keeps the generation it loaded
//! - Reload is all-or-nothing; a half-updated rule set is unrepresentable
//! - Before the first successful reload the engine serves an empty table,
//!   so every lookup is NotFound rather than an error

pub mod rule;
pub mod table;
pub mod template;

pub use rule::Rule;
pub use table::{BuildError, RuleTable};
pub use template::RequestContext;

use std::sync::Arc;

use arc_swap::ArcSwap;
use handlebars::RenderError;

use crate::stats::HitCounter;

/// Outcome of a lookup, not counting per-request render failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Redirect permanently to this destination (scheme not included).
    Redirect(String),
    /// No rule for the request host; a routine outcome, not an error.
    NotFound,
}

/// The redirection engine: the active rule table plus the hit counter.
///
/// `resolve` runs on every request and is lock-free; `reload` builds a new
/// generation off to the side and publishes it with a single atomic store.
pub struct RedirectEngine {
    table: ArcSwap<RuleTable>,
    stats: Arc<HitCounter>,
}

impl RedirectEngine {
    /// Engine with no rules loaded yet.
    pub fn new(stats: Arc<HitCounter>) -> Self {
        Self {
            table: ArcSwap::from_pointee(RuleTable::empty()),
            stats,
        }
    }

    /// Resolve the redirect destination for one request.
    ///
    /// The hit counter is touched exactly once per successful resolution;
    /// misses and render failures leave it alone.
    pub fn resolve(&self, ctx: &RequestContext<'_>) -> Result<Resolution, RenderError> {
        let table = self.table.load();
        let resolved = match table.resolve(ctx) {
            Some(resolved) => resolved,
            None => return Ok(Resolution::NotFound),
        };
        let location = resolved?;
        self.stats.touch(ctx.host());
        Ok(Resolution::Redirect(location))
    }

    /// Build a new table from `rules` and publish it.
    ///
    /// On error the previously active table keeps serving; the caller
    /// decides whether to log, retry, or keep stale rules.
    pub fn reload(&self, rules: &[Rule]) -> Result<(), BuildError> {
        let next = RuleTable::build(rules)?;
        self.table.store(Arc::new(next));
        Ok(())
    }

    /// Number of hosts in the active generation.
    pub fn rule_count(&self) -> usize {
        self.table.load().len()
    }

    /// Diagnostics: visits recorded for `host` (0 if never seen).
    pub fn visits(&self, host: &str) -> u64 {
        self.stats.visits(host)
    }
}
