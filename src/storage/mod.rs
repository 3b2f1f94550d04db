//! Persistent rule storage.
//!
//! # Responsibilities
//! - Define the [`RuleStore`] seam between rule persistence and the rest
//!   of the service
//! - Provide the JSON file implementation used by default
//!
//! # Design Decisions
//! - Stores keep an in-memory cache; readers never touch the disk
//! - Mutations write through to the backing medium; `reload` replaces the
//!   cache wholesale

mod json;

pub use json::JsonFileStore;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::engine::Rule;

/// Failures talking to the backing rule storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read rules file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write rules file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("rules file {path:?} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode rules: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

/// Rule persistence seam.
///
/// Implementations cache rules in memory. `reload` refreshes the cache
/// from the backing medium; mutations write through to it.
pub trait RuleStore: Send + Sync {
    /// Insert or replace the rule for its host, then persist.
    fn set(&self, rule: Rule) -> Result<(), StoreError>;

    /// Look up a single rule by exact host.
    fn get(&self, host: &str) -> Option<Rule>;

    /// Drop the rule for a host, then persist. Removing an absent host is
    /// not an error.
    fn remove(&self, host: &str) -> Result<(), StoreError>;

    /// Snapshot of every cached rule, in no particular order.
    fn all(&self) -> Result<Vec<Rule>, StoreError>;

    /// Replace the cache from the backing medium.
    fn reload(&self) -> Result<(), StoreError>;
}
