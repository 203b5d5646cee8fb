//! Import path → target cache.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::ResolvedTarget;

/// Memoizes positive resolutions for one run.
///
/// Failures and no-target results are never stored, so a transient
/// lookup failure is retried by the next package that imports the path.
#[derive(Debug, Default)]
pub struct ResolveCache {
    entries: RwLock<FxHashMap<String, ResolvedTarget>>,
}

impl ResolveCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, import_path: &str) -> Option<ResolvedTarget> {
        self.entries.read().get(import_path).cloned()
    }

    /// Install `target` unless another thread got there first; return
    /// whichever value is cached.
    pub fn insert(&self, import_path: &str, target: ResolvedTarget) -> ResolvedTarget {
        let mut entries = self.entries.write();
        entries
            .entry(import_path.to_owned())
            .or_insert(target)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
