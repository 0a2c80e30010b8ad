//! The lock manager (component B): named, reentrant-by-path locks acquired
//! in a canonical total order so procedures touching overlapping
//! groups/shards serialize while independent ones run in parallel.

mod path;

pub use path::LockPath;

use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of named locks, one `RwLock<()>` per path, created lazily.
#[derive(Default)]
pub struct LockManager {
    locks: Mutex<BTreeMap<LockPath, Arc<RwLock<()>>>>,
}

/// Held locks for one procedure. Dropping releases them in reverse
/// acquisition order, on every exit path including panics unwound through
/// `?` (RAII, per §4.B "release ... is guaranteed on every exit path").
pub struct LockSet {
    // Guards are stored in acquisition order; dropping a Vec drops its
    // elements back-to-front, which gives us reverse-order release for
    // free.
    _guards: Vec<OwnedLockGuard>,
}

enum OwnedLockGuard {
    Write(parking_lot::lock_api::ArcRwLockWriteGuard<parking_lot::RawRwLock, ()>),
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, path: &LockPath) -> Arc<RwLock<()>> {
        self.locks
            .lock()
            .entry(path.clone())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Acquire every path in `paths`, deduplicated and sorted into
    /// canonical lexicographic order before acquisition (deadlock-free
    /// total order, §4.B). Blocks until all are granted.
    pub fn acquire(&self, paths: &[LockPath]) -> LockSet {
        let mut sorted: Vec<LockPath> = paths.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut guards = Vec::with_capacity(sorted.len());
        for path in &sorted {
            let lock = self.lock_for(path);
            let guard = lock.write_arc();
            guards.push(OwnedLockGuard::Write(guard));
        }

        LockSet { _guards: guards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquires_in_canonical_order_and_releases_on_drop() {
        let manager = LockManager::new();
        {
            let _set = manager.acquire(&[
                LockPath::Shard(2),
                LockPath::Group("b".into()),
                LockPath::Global,
            ]);
        }
        // A second acquisition of the same paths must not deadlock now that
        // the first set has been dropped.
        let _set = manager.acquire(&[LockPath::Global, LockPath::Group("b".into())]);
    }

    #[test]
    fn deduplicates_repeated_paths() {
        let manager = LockManager::new();
        let _set = manager.acquire(&[LockPath::Group("a".into()), LockPath::Group("a".into())]);
    }
}
