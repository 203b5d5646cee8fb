//! Object → def key cache shared by the graphing threads of one run.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::DefKey;
use crate::hir::{ObjectId, PackageId};

/// Visibility facts computed alongside a def key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DefInfo {
    pub exported: bool,
    pub pkg_scope: bool,
}

/// A cached key together with its [`DefInfo`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyedDef {
    pub key: DefKey,
    pub info: DefInfo,
}

/// Memoizes the def key of each object, per graphed package.
///
/// An object's key depends on which package is being graphed (objects of
/// other packages get a short path), so entries are keyed by
/// `(graphed package, object)`. One cache belongs to one program and
/// one graph run.
///
/// The lock only ever guards the map. Values are computed outside it and
/// merged afterwards; if two threads race on the same key both compute,
/// the first to merge wins and both callers get that value.
#[derive(Debug, Default)]
pub struct DefKeyCache {
    entries: RwLock<FxHashMap<(PackageId, ObjectId), Arc<KeyedDef>>>,
}

impl DefKeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pkg: PackageId, obj: ObjectId) -> Option<Arc<KeyedDef>> {
        self.entries.read().get(&(pkg, obj)).cloned()
    }

    /// Return the cached entry, computing and installing it on a miss.
    ///
    /// `compute` runs without the lock held. A `None` result is not
    /// cached.
    pub fn get_or_compute(
        &self,
        pkg: PackageId,
        obj: ObjectId,
        compute: impl FnOnce() -> Option<KeyedDef>,
    ) -> Option<Arc<KeyedDef>> {
        // Fast path: read lock
        if let Some(hit) = self.get(pkg, obj) {
            tracing::trace!(?obj, "def key cache hit");
            return Some(hit);
        }

        let computed = Arc::new(compute()?);

        // Merge: keep whatever another thread installed first
        let mut entries = self.entries.write();
        Some(entries.entry((pkg, obj)).or_insert(computed).clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_entry(path: &str) -> KeyedDef {
        KeyedDef {
            key: DefKey::new("example.com/p", vec![path.into()]),
            info: DefInfo {
                exported: false,
                pkg_scope: true,
            },
        }
    }

    #[test]
    fn test_compute_once_then_hit() {
        let cache = DefKeyCache::new();
        let calls = AtomicUsize::new(0);
        let pkg = PackageId::new(0);
        let obj = ObjectId::new(7);

        for _ in 0..3 {
            let entry = cache
                .get_or_compute(pkg, obj, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some(make_entry("x"))
                })
                .unwrap();
            assert_eq!(entry.key.path, vec!["x".to_string()]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_none_is_not_cached() {
        let cache = DefKeyCache::new();
        let pkg = PackageId::new(0);
        let obj = ObjectId::new(1);

        assert!(cache.get_or_compute(pkg, obj, || None).is_none());
        assert!(cache.is_empty());
        assert!(cache.get_or_compute(pkg, obj, || Some(make_entry("y"))).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_per_graphed_package() {
        let cache = DefKeyCache::new();
        let obj = ObjectId::new(3);
        cache.get_or_compute(PackageId::new(0), obj, || Some(make_entry("full")));
        let other = cache
            .get_or_compute(PackageId::new(1), obj, || Some(make_entry("short")))
            .unwrap();
        assert_eq!(other.key.path, vec!["short".to_string()]);
    }

    #[test]
    fn test_concurrent_callers_see_one_value() {
        use rayon::prelude::*;

        let cache = DefKeyCache::new();
        let values: Vec<_> = (0..64)
            .into_par_iter()
            .map(|i| {
                cache
                    .get_or_compute(PackageId::new(0), ObjectId::new(9), || {
                        Some(make_entry(&format!("v{i}")))
                    })
                    .unwrap()
            })
            .collect();
        let first = &values[0];
        assert!(values.iter().all(|v| v.key == first.key));
    }
}
