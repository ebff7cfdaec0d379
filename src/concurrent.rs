//! Whole-cache reader/writer lock (feature `concurrency`).
//!
//! [`SecurityCache`] has no internal synchronization. This wrapper puts it
//! behind one `parking_lot::RwLock` per hive: lookups take the lock shared,
//! everything that mutates takes it exclusive. A rebuild holds the exclusive
//! lock for its whole walk.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cache::{SecurityCache, SecurityRef};
use crate::cell::{CellHandle, TypeTag};
use crate::error::CacheError;
use crate::store::traits::{CellStore, SecurityChain};
use crate::traits::SecurityOwner;

#[derive(Debug, Default)]
pub struct ConcurrentSecurityCache {
    inner: RwLock<SecurityCache>,
}

impl ConcurrentSecurityCache {
    pub fn new() -> Self {
        Self::from_cache(SecurityCache::new())
    }

    pub fn from_cache(cache: SecurityCache) -> Self {
        Self {
            inner: RwLock::new(cache),
        }
    }

    /// Shared access for lookups spanning several calls.
    pub fn read(&self) -> RwLockReadGuard<'_, SecurityCache> {
        self.inner.read()
    }

    /// Exclusive access for mutations spanning several calls.
    pub fn write(&self) -> RwLockWriteGuard<'_, SecurityCache> {
        self.inner.write()
    }

    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, SecurityCache>> {
        self.inner.try_read()
    }

    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, SecurityCache>> {
        self.inner.try_write()
    }

    pub fn add<S: CellStore + ?Sized>(&self, store: &S, cell: CellHandle) -> Result<(), CacheError> {
        let mut cache = self.inner.write();
        cache.add(store, cell)
    }

    pub fn remove(&self, cell: CellHandle) -> bool {
        let mut cache = self.inner.write();
        cache.remove(cell)
    }

    pub fn rebuild<S: SecurityChain + ?Sized>(&self, store: &S) -> Result<(), CacheError> {
        let mut cache = self.inner.write();
        cache.rebuild(store)
    }

    pub fn find_index(&self, cell: CellHandle) -> Result<usize, usize> {
        let cache = self.inner.read();
        cache.find_index(cell)
    }

    /// Runs `f` on the matching cached cell while the shared lock is held.
    pub fn find_matching_with<R>(
        &self,
        descriptor: &[u8],
        tag: TypeTag,
        f: impl FnOnce(CellHandle, &[u8]) -> R,
    ) -> Option<R> {
        let cache = self.inner.read();
        cache
            .find_matching_descriptor(descriptor, tag)
            .map(|(cell, entry)| f(cell, entry.descriptor()))
    }

    pub fn resolve_security(&self, cell: CellHandle) -> Result<Option<SecurityRef>, CacheError> {
        let cache = self.inner.read();
        cache.resolve_security(cell)
    }

    /// See [`SecurityCache::assign_to_owner`].
    ///
    /// # Panics
    ///
    /// Panics if `cell` is neither NIL nor cached.
    pub fn assign_to_owner<O: SecurityOwner + ?Sized>(&self, owner: &mut O, cell: CellHandle) {
        let cache = self.inner.read();
        cache.assign_to_owner(owner, cell);
    }

    pub fn len(&self) -> usize {
        let cache = self.inner.read();
        cache.len()
    }

    pub fn is_empty(&self) -> bool {
        let cache = self.inner.read();
        cache.is_empty()
    }

    pub fn into_inner(self) -> SecurityCache {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::store::memory::{MemoryHive, sample_descriptor};

    #[test]
    fn concurrent_cache_basic_ops() {
        let mut hive = MemoryHive::new();
        hive.push_security(CellHandle::new(0x20), sample_descriptor(1, 32));
        hive.push_security(CellHandle::new(0x40), sample_descriptor(2, 32));
        let cache = ConcurrentSecurityCache::new();
        cache.rebuild(&hive).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.find_index(CellHandle::new(0x40)), Ok(1));
        assert_eq!(
            cache.find_matching_with(&sample_descriptor(2, 32), TypeTag::Stable, |cell, _| cell),
            Some(CellHandle::new(0x40))
        );
        assert!(cache.remove(CellHandle::new(0x20)));
        assert!(cache.try_write().is_some());
        let guard = cache.read();
        assert!(cache.try_write().is_none());
        drop(guard);
        assert_eq!(cache.into_inner().len(), 1);
    }

    #[test]
    fn readers_share_the_lock() {
        let mut hive = MemoryHive::new();
        for raw in 1..=32u32 {
            hive.push_security(CellHandle::new(raw * 8), sample_descriptor(raw, 24));
        }
        let cache = Arc::new(ConcurrentSecurityCache::new());
        cache.rebuild(&hive).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for raw in 1..=32u32 {
                        assert!(cache.resolve_security(CellHandle::new(raw * 8)).unwrap().is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        cache.read().check_invariants().unwrap();
    }
}
