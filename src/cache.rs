//! Security-descriptor cache of one hive.
//!
//! Keeps one owned copy of every security descriptor a hive's keys refer to,
//! indexed two ways: by cell handle (a sorted backing array searched with a
//! hinted binary search) and by content (64 hash chains keyed by the
//! descriptor's ConvKey). Key nodes hold weak [`SecurityRef`] handles into the
//! cache rather than their own copies.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                            SecurityCache                                 │
//! │                                                                          │
//! │  index (SortedCellIndex)          entries (SlotArena<SecurityEntry>)     │
//! │  ┌──────────────┬────────┐        ┌────────┬──────────────────────────┐  │
//! │  │ cell         │ entry  │        │ SlotId │ cell, tag, conv_key,     │  │
//! │  ├──────────────┼────────┤        │        │ descriptor, links        │  │
//! │  │ 0x8000_0040  │ id_2  ─┼──────► │ id_2   │ ...                      │  │
//! │  │ 0x0000_0020  │ id_0  ─┼──────► │ id_0   │ ...                      │  │
//! │  │ 0x0000_0188  │ id_1  ─┼──────► │ id_1   │ ...                      │  │
//! │  └──────────────┴────────┘        └────────┴────────────▲─────────────┘  │
//! │   sorted by compare_cells                               │                │
//! │                                   chains (HashChains<64>)                │
//! │                                   bucket = conv_key % 64 ────┘           │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Operations
//!
//! | Operation                  | Description                                   | Complexity   |
//! |----------------------------|-----------------------------------------------|--------------|
//! | `add`                      | Copy a cell's descriptor into the cache       | O(n) shift   |
//! | `find_index`               | Position of a cell (or its insertion point)   | O(log n)     |
//! | `find_matching_descriptor` | Cached cell with byte-identical descriptor    | O(1) avg     |
//! | `remove`                   | Drop a cell's entry; capacity is kept         | O(n) shift   |
//! | `rebuild`                  | Re-sync with the hive, reusing allocations    | O(n²) worst  |
//! | `resolve_security`         | Weak handle for a key node's security cell    | O(log n)     |
//!
//! ## Locking
//!
//! The cache is a plain single-threaded structure. Hosts serialize access with
//! one reader/writer lock per hive: shared for `find_index`,
//! `find_matching_descriptor` and `resolve_security`/`assign_to_owner`,
//! exclusive for every `&mut self` method, held across the whole of a
//! `rebuild`. See `ConcurrentSecurityCache` (feature `concurrency`).
//!
//! ## Example Usage
//!
//! ```rust
//! use seccache::cache::SecurityCache;
//! use seccache::cell::{CellHandle, TypeTag};
//! use seccache::store::memory::{MemoryHive, sample_descriptor};
//!
//! let mut hive = MemoryHive::new();
//! hive.push_security(CellHandle::new(0x20), sample_descriptor(7, 64));
//! hive.push_security(CellHandle::new(0x90), sample_descriptor(7, 64));
//!
//! let mut cache = SecurityCache::new();
//! cache.add(&hive, CellHandle::new(0x90)).unwrap();
//! cache.add(&hive, CellHandle::new(0x20)).unwrap();
//! assert_eq!(cache.find_index(CellHandle::new(0x90)), Ok(1));
//!
//! // Content lookup finds the first cell cached with these bytes.
//! let (cell, _) = cache
//!     .find_matching_descriptor(&sample_descriptor(7, 64), TypeTag::Stable)
//!     .unwrap();
//! assert_eq!(cell, CellHandle::new(0x90));
//! ```

use log::{debug, error, info, warn};

use crate::cell::{CellHandle, TypeTag, compare_cells};
use crate::ds::hash_chains::{ChainLinks, Chained, HashChains};
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::ds::sorted_index::{
    BULK_GROWTH, GrowthMode, INCREMENTAL_GROWTH, IndexEntry, SortedCellIndex,
};
use crate::error::{CacheError, CorruptionKind, InvariantError};
use crate::hash::{ConvKey, conv_key};
#[cfg(feature = "metrics")]
use crate::metrics::counters::SecurityCacheCounters;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::SecurityCacheMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider};
use crate::store::traits::{CellStore, SecurityChain};
use crate::traits::SecurityOwner;

/// Number of content hash chains.
pub const SECURITY_HASH_BUCKETS: usize = 64;

// ---------------------------------------------------------------------------
// SecurityEntry / SecurityRef
// ---------------------------------------------------------------------------

/// Cached copy of one security cell's descriptor.
#[derive(Debug)]
pub struct SecurityEntry {
    cell: CellHandle,
    type_tag: TypeTag,
    conv_key: ConvKey,
    descriptor: Vec<u8>,
    links: ChainLinks,
}

impl SecurityEntry {
    /// Hive cell this copy mirrors.
    pub fn cell(&self) -> CellHandle {
        self.cell
    }

    pub fn conv_key(&self) -> ConvKey {
        self.conv_key
    }

    pub fn descriptor(&self) -> &[u8] {
        &self.descriptor
    }

    pub fn descriptor_len(&self) -> usize {
        self.descriptor.len()
    }

    /// Classification the store reported when the cell was cached.
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    pub(crate) fn relocate(&mut self, cell: CellHandle) {
        self.cell = cell;
    }

    fn matches(&self, key: ConvKey, tag: TypeTag, descriptor: &[u8]) -> bool {
        self.conv_key == key
            && self.type_tag == tag
            && self.descriptor.len() == descriptor.len()
            && self.descriptor == descriptor
    }
}

impl Chained for SecurityEntry {
    fn chain_key(&self) -> u32 {
        self.conv_key
    }

    fn links(&self) -> &ChainLinks {
        &self.links
    }

    fn links_mut(&mut self) -> &mut ChainLinks {
        &mut self.links
    }
}

/// Weak handle to a cached entry, held by key nodes.
///
/// The handle does not keep the entry alive. Once its cell leaves the cache
/// [`SecurityCache::entry`] returns `None`; a slot reused for another cell is
/// never returned because the cell is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecurityRef {
    cell: CellHandle,
    slot: SlotId,
}

impl SecurityRef {
    pub fn cell(&self) -> CellHandle {
        self.cell
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }
}

/// A stale entry picked for in-place reuse while a rebuild runs.
///
/// Only [`SecurityCache::rebuild`] produces these; other callers of
/// [`SecurityCache::add_with`] pass `None`.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct ReusedEntry(SlotId);

// ---------------------------------------------------------------------------
// SecurityCache
// ---------------------------------------------------------------------------

/// Security-descriptor cache of one hive.
#[derive(Debug)]
pub struct SecurityCache {
    pub(crate) index: SortedCellIndex,
    pub(crate) entries: SlotArena<SecurityEntry>,
    chains: HashChains<SECURITY_HASH_BUCKETS>,
    bulk_growth: usize,
    incremental_growth: usize,
    #[cfg(feature = "metrics")]
    metrics: SecurityCacheCounters,
}

impl SecurityCache {
    /// Creates an empty cache with the default growth increments.
    pub fn new() -> Self {
        Self::with_growth(BULK_GROWTH, INCREMENTAL_GROWTH)
    }

    pub(crate) fn with_growth(bulk_growth: usize, incremental_growth: usize) -> Self {
        Self {
            index: SortedCellIndex::new(),
            entries: SlotArena::new(),
            chains: HashChains::new(),
            bulk_growth,
            incremental_growth,
            #[cfg(feature = "metrics")]
            metrics: SecurityCacheCounters::default(),
        }
    }

    pub(crate) fn reserve_exact(&mut self, capacity: usize) -> Result<(), CacheError> {
        self.index.reserve_exact(capacity)?;
        Ok(())
    }

    /// Returns the cache to its freshly created state, dropping every entry.
    pub fn init(&mut self) {
        self.destroy_all();
    }

    /// Number of cached cells.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Slots allocated in the backing array.
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Position of the last successful lookup.
    pub fn hit_hint(&self) -> Option<usize> {
        self.index.hit_hint()
    }

    pub fn bulk_growth(&self) -> usize {
        self.bulk_growth
    }

    pub fn incremental_growth(&self) -> usize {
        self.incremental_growth
    }

    // -- lookup ------------------------------------------------------------

    /// Finds `cell` in the backing array.
    ///
    /// `Ok(index)` if cached, otherwise `Err(index)` with the position where
    /// it would be inserted. A hit seeds the next search.
    pub fn find_index(&self, cell: CellHandle) -> Result<usize, usize> {
        #[cfg(feature = "metrics")]
        {
            let hint = self.index.hit_hint();
            let mut probes = 0;
            let result = self.index.search_counting(cell, &mut probes);
            self.metrics
                .record_lookup(probes, matches!(result, Ok(i) if hint == Some(i)));
            result
        }
        #[cfg(not(feature = "metrics"))]
        {
            self.index.search(cell)
        }
    }

    /// Returns `true` if `cell` is cached.
    pub fn contains(&self, cell: CellHandle) -> bool {
        self.find_index(cell).is_ok()
    }

    /// Cached entry of `cell`.
    pub fn get(&self, cell: CellHandle) -> Option<&SecurityEntry> {
        let index = self.find_index(cell).ok()?;
        self.entry_at(index).map(|(_, entry)| entry)
    }

    /// Entry at backing-array position `index`.
    pub fn entry_at(&self, index: usize) -> Option<(CellHandle, &SecurityEntry)> {
        let slot = self.index.get(index)?;
        self.entries.get(slot.entry).map(|entry| (slot.cell, entry))
    }

    /// Resolves a weak handle; `None` once its cell has left the cache.
    pub fn entry(&self, security: SecurityRef) -> Option<&SecurityEntry> {
        self.entries
            .get(security.slot)
            .filter(|entry| entry.cell == security.cell)
    }

    /// Cached cells and their entries in backing-array order.
    pub fn iter(&self) -> impl Iterator<Item = (CellHandle, &SecurityEntry)> {
        self.index
            .as_slice()
            .iter()
            .filter_map(|slot| self.entries.get(slot.entry).map(|entry| (slot.cell, entry)))
    }

    /// Finds a cached cell of type `tag` whose descriptor equals `descriptor`.
    ///
    /// Scans the chain selected by the descriptor's ConvKey from the head, so
    /// the earliest cached match wins.
    pub fn find_matching_descriptor(
        &self,
        descriptor: &[u8],
        tag: TypeTag,
    ) -> Option<(CellHandle, &SecurityEntry)> {
        let key = conv_key(descriptor);
        let mut _steps = 0u64;
        let found = self
            .chains
            .iter_bucket(&self.entries, key)
            .map(|(_, entry)| entry)
            .find(|entry| {
                _steps += 1;
                entry.matches(key, tag, descriptor)
            })
            .map(|entry| (entry.cell, entry));
        #[cfg(feature = "metrics")]
        self.metrics.record_match(_steps, found.is_some());
        found
    }

    /// Weak handle for `cell`, as a key node would store it.
    ///
    /// `Ok(None)` for [`CellHandle::NIL`] (no security). A non-NIL cell that
    /// is not cached yields [`CacheError::FatalInconsistency`]: every cell a
    /// key refers to must have been added.
    pub fn resolve_security(&self, cell: CellHandle) -> Result<Option<SecurityRef>, CacheError> {
        if cell.is_nil() {
            return Ok(None);
        }
        let index = self
            .find_index(cell)
            .map_err(|_| CacheError::FatalInconsistency { cell })?;
        let slot = self
            .index
            .get(index)
            .ok_or(CacheError::FatalInconsistency { cell })?;
        Ok(Some(SecurityRef {
            cell,
            slot: slot.entry,
        }))
    }

    /// Points `owner` at the cached entry of `cell`, or at nothing for NIL.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is not NIL and not cached. The cache must hold every
    /// cell a key node refers to; a miss means the host's state is corrupt.
    pub fn assign_to_owner<O: SecurityOwner + ?Sized>(&self, owner: &mut O, cell: CellHandle) {
        match self.resolve_security(cell) {
            Ok(security) => owner.set_security(security),
            Err(err) => {
                error!("security cache missing cell {cell} assigned to a key: {err}");
                panic!("{err}");
            }
        }
    }

    // -- mutation ----------------------------------------------------------

    /// Caches `cell` in steady state. Adding a cached cell is a no-op.
    pub fn add<S: CellStore + ?Sized>(
        &mut self,
        store: &S,
        cell: CellHandle,
    ) -> Result<(), CacheError> {
        self.add_with(store, cell, GrowthMode::Incremental, None)
    }

    /// Caches `cell`, growing the backing array per `mode` if it is full and
    /// copying into `reuse` instead of allocating a new entry when given.
    ///
    /// The cell is mapped before the backing array grows, so a fetch failure
    /// leaves capacity untouched. On error nothing is inserted and no mapping
    /// is left outstanding; a supplied `reuse` entry is freed.
    pub fn add_with<S: CellStore + ?Sized>(
        &mut self,
        store: &S,
        cell: CellHandle,
        mode: GrowthMode,
        reuse: Option<ReusedEntry>,
    ) -> Result<(), CacheError> {
        let position = match self.find_index(cell) {
            Ok(_) => {
                #[cfg(feature = "metrics")]
                self.metrics.inc_add_duplicate();
                self.discard_reused(reuse);
                return Ok(());
            }
            Err(position) => position,
        };

        let Some(mapped) = store.map(cell) else {
            warn!("security cell {cell} could not be mapped");
            self.discard_reused(reuse);
            return Err(CacheError::FetchFailed { cell });
        };
        let type_tag = store.cell_type(cell);

        match self
            .index
            .reserve_slot(mode, self.bulk_growth, self.incremental_growth)
        {
            Ok(true) => {
                debug!(
                    "security cache grew to {} slots ({:?})",
                    self.index.capacity(),
                    mode
                );
                #[cfg(feature = "metrics")]
                self.metrics.inc_grow();
            }
            Ok(false) => {}
            Err(_) => {
                warn!("security cache could not grow past {} slots", self.index.capacity());
                self.discard_reused(reuse);
                return Err(CacheError::OutOfMemory);
            }
        }

        let reused = reuse
            .map(|ReusedEntry(slot)| slot)
            .filter(|slot| self.entries.contains(*slot));
        let slot = match reused {
            Some(slot) => {
                if let Err(err) = self.refill_entry(slot, cell, type_tag, &mapped) {
                    self.entries.remove(slot);
                    return Err(err);
                }
                #[cfg(feature = "metrics")]
                self.metrics.inc_rebuild_reused();
                slot
            }
            None => {
                let mut descriptor = Vec::new();
                descriptor.try_reserve_exact(mapped.len())?;
                descriptor.extend_from_slice(&mapped);
                let key = conv_key(&descriptor);
                let slot = self.entries.try_insert(SecurityEntry {
                    cell,
                    type_tag,
                    conv_key: key,
                    descriptor,
                    links: ChainLinks::default(),
                })?;
                #[cfg(feature = "metrics")]
                if mode == GrowthMode::Bulk {
                    self.metrics.inc_rebuild_fresh();
                }
                slot
            }
        };

        self.chains.push_back(&mut self.entries, slot);
        drop(mapped);

        self.index.insert(position, IndexEntry { cell, entry: slot });
        #[cfg(feature = "metrics")]
        self.metrics.inc_add();
        Ok(())
    }

    fn refill_entry(
        &mut self,
        slot: SlotId,
        cell: CellHandle,
        type_tag: TypeTag,
        descriptor: &[u8],
    ) -> Result<(), CacheError> {
        if let Some(entry) = self.entries.get_mut(slot) {
            entry.descriptor.clear();
            entry.descriptor.try_reserve_exact(descriptor.len())?;
            entry.descriptor.extend_from_slice(descriptor);
            entry.cell = cell;
            entry.type_tag = type_tag;
            entry.conv_key = conv_key(&entry.descriptor);
            entry.links = ChainLinks::default();
        }
        Ok(())
    }

    /// Drops the entry of `cell`. Returns `false` if it was not cached.
    ///
    /// The backing array keeps its capacity.
    pub fn remove(&mut self, cell: CellHandle) -> bool {
        let Ok(position) = self.find_index(cell) else {
            return false;
        };
        let Some(removed) = self.index.remove(position) else {
            return false;
        };
        self.chains.unlink(&mut self.entries, removed.entry);
        self.entries.remove(removed.entry);
        #[cfg(feature = "metrics")]
        self.metrics.inc_remove();
        true
    }

    /// Reallocates the backing array to exactly [`len`](Self::len) slots.
    ///
    /// Returns `false` if the allocation failed; the cache is unchanged and
    /// still usable in that case.
    pub fn shrink_to_fit(&mut self) -> bool {
        let before = self.index.capacity();
        match self.index.shrink_to_fit() {
            Ok(()) => {
                debug!(
                    "security cache shrunk from {} to {} slots",
                    before,
                    self.index.capacity()
                );
                true
            }
            Err(_) => {
                warn!("security cache could not shrink from {before} slots");
                false
            }
        }
    }

    /// Drops every entry and frees the backing array.
    pub fn destroy_all(&mut self) {
        self.index.clear_shrink();
        self.entries.clear_shrink();
        self.chains = HashChains::new();
    }

    // -- rebuild -------------------------------------------------------------

    /// Picks a stale entry (one not yet re-added by the running rebuild) whose
    /// allocation can hold a descriptor of `needed` bytes.
    ///
    /// Prefers an entry of exactly the needed length, then the smallest
    /// longer one. If neither exists the last stale entry is freed and `None`
    /// returned, so the following [`add_with`](Self::add_with) allocates.
    /// Returns `None` with no effect outside a rebuild.
    pub(crate) fn find_reusable_cell(&mut self, needed: usize) -> Option<ReusedEntry> {
        if self.index.stale().is_empty() {
            return None;
        }
        let mut best: Option<(usize, usize)> = None;
        let mut exact = None;
        for (offset, stale) in self.index.stale().iter().enumerate() {
            let Some(len) = self.entries.get(stale.entry).map(SecurityEntry::descriptor_len)
            else {
                continue;
            };
            if len == needed {
                exact = Some(offset);
                break;
            }
            if len > needed && best.is_none_or(|(_, best_len)| len < best_len) {
                best = Some((offset, len));
            }
        }

        if let Some(offset) = exact.or(best.map(|(offset, _)| offset)) {
            let taken = self.index.take_stale(offset)?;
            debug!(
                "reusing entry of {} for a {needed}-byte descriptor",
                taken.cell
            );
            return Some(ReusedEntry(taken.entry));
        }

        if let Some(last) = self.index.pop_stale() {
            debug!("no reusable entry for {needed} bytes; freeing {}", last.cell);
            self.entries.remove(last.entry);
        }
        None
    }

    /// Frees an entry picked by [`find_reusable_cell`](Self::find_reusable_cell)
    /// that will not be used.
    pub(crate) fn discard_reused(&mut self, reuse: Option<ReusedEntry>) {
        if let Some(ReusedEntry(slot)) = reuse {
            self.entries.remove(slot);
        }
    }

    /// Rebuilds the cache from the hive's chain of security cells.
    ///
    /// Walks the circular list from its root, checking each back link and
    /// validating each descriptor, and re-adds every cell in bulk mode.
    /// Entries of the previous contents are reused for descriptors of a
    /// fitting size; whatever is left over is freed.
    ///
    /// On error the walk stops: the cache holds the cells added so far and is
    /// otherwise consistent. Hosts treat a failed rebuild as hive corruption.
    pub fn rebuild<S: SecurityChain + ?Sized>(&mut self, store: &S) -> Result<(), CacheError> {
        let previous = self.index.begin_rebuild();
        self.chains.reset(&mut self.entries);

        let result = self.walk_security_chain(store);

        for stale in self.index.drain_stale() {
            self.entries.remove(stale.entry);
        }

        match &result {
            Ok(()) => info!(
                "security cache rebuilt: {} cells (previously {previous})",
                self.index.len()
            ),
            Err(err) => warn!(
                "security cache rebuild aborted after {} cells: {err}",
                self.index.len()
            ),
        }
        result
    }

    fn walk_security_chain<S: SecurityChain + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<(), CacheError> {
        let root = store.root_cell();
        if root.is_nil() {
            return Ok(());
        }

        let corrupt = |cell, reason| CacheError::StructuralCorruption { cell, reason };
        let mut current = root;
        let mut last = CellHandle::NIL;

        loop {
            if !last.is_nil() {
                let found_prev = store
                    .prev(current)
                    .ok_or(corrupt(current, CorruptionKind::UnmappableLink))?;
                if found_prev != last {
                    return Err(corrupt(
                        current,
                        CorruptionKind::BrokenBackLink {
                            expected_prev: last,
                            found_prev,
                        },
                    ));
                }
            }

            let needed = {
                let mapped = store
                    .map(current)
                    .ok_or(CacheError::FetchFailed { cell: current })?;
                if !store.validate_descriptor(&mapped) {
                    return Err(corrupt(current, CorruptionKind::InvalidDescriptor));
                }
                mapped.len()
            };

            if self.index.search(current).is_ok() {
                return Err(corrupt(current, CorruptionKind::DuplicateCell));
            }

            let reuse = self.find_reusable_cell(needed);
            self.add_with(store, current, GrowthMode::Bulk, reuse)?;

            last = current;
            current = store
                .next(current)
                .ok_or(corrupt(current, CorruptionKind::UnmappableLink))?;
            if current == root {
                break;
            }
        }

        let root_prev = store
            .prev(root)
            .ok_or(corrupt(root, CorruptionKind::UnmappableLink))?;
        if root_prev != last {
            return Err(corrupt(
                root,
                CorruptionKind::BrokenBackLink {
                    expected_prev: last,
                    found_prev: root_prev,
                },
            ));
        }
        Ok(())
    }

    // -- diagnostics ---------------------------------------------------------

    /// Checks the structural invariants of the cache.
    ///
    /// The backing array must be strictly sorted and within capacity, every
    /// slot must point at an entry for the same cell whose ConvKey matches
    /// its descriptor, and every entry must sit in the chain its key selects.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let live = self.index.as_slice();
        if self.index.occupied() != live.len() {
            return Err(InvariantError::new(format!(
                "{} stale slots outside a rebuild",
                self.index.occupied() - live.len()
            )));
        }
        if live.len() > self.index.capacity() {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                live.len(),
                self.index.capacity()
            )));
        }
        for pair in live.windows(2) {
            if compare_cells(pair[0].cell, pair[1].cell) != std::cmp::Ordering::Less {
                return Err(InvariantError::new(format!(
                    "cells {} and {} out of order",
                    pair[0].cell, pair[1].cell
                )));
            }
        }
        for slot in live {
            let entry = self.entries.get(slot.entry).ok_or_else(|| {
                InvariantError::new(format!("cell {} points at a freed entry", slot.cell))
            })?;
            if entry.cell != slot.cell {
                return Err(InvariantError::new(format!(
                    "slot for {} holds entry of {}",
                    slot.cell, entry.cell
                )));
            }
            if entry.conv_key != conv_key(&entry.descriptor) {
                return Err(InvariantError::new(format!(
                    "stale conv key for {}",
                    slot.cell
                )));
            }
            let expected = HashChains::<SECURITY_HASH_BUCKETS>::bucket_of(entry.conv_key);
            if entry.links.bucket() != Some(expected) {
                return Err(InvariantError::new(format!(
                    "entry of {} not in bucket {expected}",
                    slot.cell
                )));
            }
        }
        if self.entries.len() != live.len() || self.chains.len() != live.len() {
            return Err(InvariantError::new(format!(
                "{} slots, {} entries, {} chained",
                live.len(),
                self.entries.len(),
                self.chains.len()
            )));
        }
        Ok(())
    }

    /// Entries in the content chain at `bucket`.
    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.chains.chain_len(&self.entries, bucket)
    }
}

#[cfg(feature = "metrics")]
impl MetricsSnapshotProvider<SecurityCacheMetricsSnapshot> for SecurityCache {
    fn snapshot(&self) -> SecurityCacheMetricsSnapshot {
        self.metrics
            .snapshot(self.index.len(), self.index.capacity())
    }
}

#[cfg(feature = "metrics")]
impl MetricsReset for SecurityCache {
    fn reset_metrics(&self) {
        self.metrics.reset();
    }
}

impl Default for SecurityCache {
    fn default() -> Self {
        Self::new()
    }
}
