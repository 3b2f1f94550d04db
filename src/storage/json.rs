//! Rule store backed by a single JSON file.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::engine::Rule;

use super::{RuleStore, StoreError};

/// On-disk shape of the rules file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<Rule>,
}

/// JSON file store.
///
/// The whole file is rewritten on every mutation; `reload` replaces the
/// in-memory cache from disk. A missing file reads as an empty rule set so
/// a fresh deployment can boot before any rule exists.
pub struct JsonFileStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, Rule>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the backing file from the given cache snapshot.
    ///
    /// Callers pass the cache while holding its write guard: mutations and
    /// their dumps are serialized, so the file on disk is always one whole
    /// dump, never two interleaved ones. Rules are sorted by host so
    /// consecutive dumps of the same rule set are byte-identical.
    fn dump_locked(&self, cache: &HashMap<String, Rule>) -> Result<(), StoreError> {
        let mut rules: Vec<Rule> = cache.values().cloned().collect();
        rules.sort_by(|a, b| a.host.cmp(&b.host));

        let body = serde_json::to_string_pretty(&RuleFile { rules })
            .map_err(|source| StoreError::Encode { source })?;
        fs::write(&self.path, body).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl RuleStore for JsonFileStore {
    fn set(&self, rule: Rule) -> Result<(), StoreError> {
        let mut cache = self.cache.write().expect("rule cache lock poisoned");
        cache.insert(rule.host.clone(), rule);
        // The cache keeps the new rule even when the dump fails; the next
        // successful mutation persists it.
        self.dump_locked(&cache)
    }

    fn get(&self, host: &str) -> Option<Rule> {
        let cache = self.cache.read().expect("rule cache lock poisoned");
        cache.get(host).cloned()
    }

    fn remove(&self, host: &str) -> Result<(), StoreError> {
        let mut cache = self.cache.write().expect("rule cache lock poisoned");
        cache.remove(host);
        self.dump_locked(&cache)
    }

    fn all(&self) -> Result<Vec<Rule>, StoreError> {
        let cache = self.cache.read().expect("rule cache lock poisoned");
        Ok(cache.values().cloned().collect())
    }

    fn reload(&self) -> Result<(), StoreError> {
        // Dumps run under the write guard, so a read under the read guard
        // never sees a half-written file.
        let raw = {
            let _cache = self.cache.read().expect("rule cache lock poisoned");
            match fs::read(&self.path) {
                Ok(raw) => raw,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    tracing::info!(
                        file = %self.path.display(),
                        "rules file does not exist yet, keeping current rules"
                    );
                    return Ok(());
                }
                Err(source) => {
                    return Err(StoreError::Read {
                        path: self.path.clone(),
                        source,
                    });
                }
            }
        };

        let parsed: RuleFile =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let mut cache = self.cache.write().expect("rule cache lock poisoned");
        cache.clear();
        for rule in parsed.rules {
            cache.insert(rule.host.clone(), rule);
        }
        Ok(())
    }
}
