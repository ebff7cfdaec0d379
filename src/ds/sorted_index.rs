//! Position-indexed backing array of the security cache.
//!
//! Holds `(cell, entry)` pairs strictly ordered by
//! [`compare_cells`](crate::cell::compare_cells) and finds cells with a binary
//! search seeded by the last hit.
//!
//! ## Architecture
//!
//! ```text
//!   entries (Vec<IndexEntry>)                         capacity
//!   ┌────────────────────────────┬──────────────────┬─────────┐
//!   │ live: sorted by cell order │ stale (rebuild)  │ unused  │
//!   └────────────────────────────┴──────────────────┴─────────┘
//!   0                          live               len      capacity
//! ```
//!
//! Outside a rebuild the stale region is empty. During a rebuild every entry
//! starts out stale and is either moved back into the live region (reused) or
//! dropped; see [`SecurityCache::rebuild`](crate::cache::SecurityCache::rebuild).
//!
//! ## Capacity
//!
//! `capacity` is the logical size of the array. It grows by a fixed increment
//! when an insert finds the array full (a page-sized step for bulk loads, a
//! small step otherwise), never shrinks on removal, and only drops through
//! [`SortedCellIndex::shrink_to_fit`] or [`SortedCellIndex::clear_shrink`].
//! All growth is fallible and leaves the array untouched on failure.

use std::cmp::Ordering;
use std::collections::TryReserveError;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::cell::{CellHandle, compare_cells};
use crate::ds::slot_arena::SlotId;

/// Entries added per growth step in steady-state inserts.
pub const INCREMENTAL_GROWTH: usize = 16;

/// Entries added per growth step during bulk loads: one 4 KiB page worth.
pub const BULK_GROWTH: usize = 4096 / std::mem::size_of::<IndexEntry>();

const NO_HINT: usize = usize::MAX;

/// One slot of the backing array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub cell: CellHandle,
    pub entry: SlotId,
}

/// How the array should grow when an insert finds it full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthMode {
    /// Populating from scratch (initial load or rebuild).
    Bulk,
    /// Single-cell insert in steady state.
    Incremental,
}

#[derive(Debug)]
pub struct SortedCellIndex {
    entries: Vec<IndexEntry>,
    live: usize,
    capacity: usize,
    hit_hint: AtomicUsize,
}

impl SortedCellIndex {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            live: 0,
            capacity: 0,
            hit_hint: AtomicUsize::new(NO_HINT),
        }
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Logical capacity of the array.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Last successful search position, if any.
    #[inline]
    pub fn hit_hint(&self) -> Option<usize> {
        match self.hit_hint.load(AtomicOrdering::Relaxed) {
            NO_HINT => None,
            hint => Some(hint),
        }
    }

    #[inline]
    pub fn clear_hint(&self) {
        self.hit_hint.store(NO_HINT, AtomicOrdering::Relaxed);
    }

    /// Live entries in cell order.
    #[inline]
    pub fn as_slice(&self) -> &[IndexEntry] {
        &self.entries[..self.live]
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&IndexEntry> {
        self.as_slice().get(index)
    }

    /// Searches the live region for `cell`.
    ///
    /// Returns `Ok(index)` when found and `Err(index)` with the position that
    /// keeps the array sorted otherwise, like [`slice::binary_search`]. A hit
    /// becomes the seed of the next search.
    pub fn search(&self, cell: CellHandle) -> Result<usize, usize> {
        self.search_counting(cell, &mut 0)
    }

    /// [`search`](Self::search), adding the number of comparisons to `probes`.
    pub fn search_counting(&self, cell: CellHandle, probes: &mut u64) -> Result<usize, usize> {
        let count = self.live;
        if count == 0 {
            return Err(0);
        }
        let entries = &self.entries[..count];

        let mut low = 0usize;
        let mut high = count - 1;
        let mut current = match self.hit_hint() {
            Some(hint) if hint < count => hint,
            _ => count / 2,
        };

        loop {
            if high - low <= 1 {
                // Window of one or two: settle linearly.
                for (index, candidate) in entries.iter().enumerate().take(high + 1).skip(low) {
                    *probes += 1;
                    match compare_cells(cell, candidate.cell) {
                        Ordering::Equal => {
                            self.hit_hint.store(index, AtomicOrdering::Relaxed);
                            return Ok(index);
                        }
                        Ordering::Less => return Err(index),
                        Ordering::Greater => {}
                    }
                }
                return Err(high + 1);
            }

            *probes += 1;
            match compare_cells(cell, entries[current].cell) {
                Ordering::Equal => {
                    self.hit_hint.store(current, AtomicOrdering::Relaxed);
                    return Ok(current);
                }
                Ordering::Less => high = current,
                Ordering::Greater => low = current,
            }
            current = low + (high - low) / 2;
        }
    }

    /// Makes room for one more entry, growing by the `mode` increment if the
    /// array is full. Returns whether it grew.
    pub fn reserve_slot(
        &mut self,
        mode: GrowthMode,
        bulk_growth: usize,
        incremental_growth: usize,
    ) -> Result<bool, TryReserveError> {
        if self.entries.len() < self.capacity {
            return Ok(false);
        }
        let step = match mode {
            GrowthMode::Bulk => bulk_growth,
            GrowthMode::Incremental => incremental_growth,
        };
        let new_capacity = self.capacity + step.max(1);
        self.entries
            .try_reserve_exact(new_capacity - self.entries.len())?;
        self.capacity = new_capacity;
        Ok(true)
    }

    /// Reserves exactly `capacity` slots up front.
    pub fn reserve_exact(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        if capacity <= self.capacity {
            return Ok(());
        }
        self.entries
            .try_reserve_exact(capacity - self.entries.len())?;
        self.capacity = capacity;
        Ok(())
    }

    /// Inserts at a position returned by [`search`](Self::search).
    ///
    /// # Panics
    ///
    /// Panics if no slot was reserved or `index` is past the live region.
    pub fn insert(&mut self, index: usize, entry: IndexEntry) {
        assert!(self.entries.len() < self.capacity, "no reserved slot");
        assert!(index <= self.live, "insert position out of range");
        self.entries.insert(index, entry);
        self.live += 1;
    }

    /// Removes the live entry at `index`; capacity is unchanged.
    pub fn remove(&mut self, index: usize) -> Option<IndexEntry> {
        if index >= self.live {
            return None;
        }
        self.live -= 1;
        Some(self.entries.remove(index))
    }

    /// Reallocates to exactly the number of live entries.
    ///
    /// On failure the array keeps its current allocation.
    pub fn shrink_to_fit(&mut self) -> Result<(), TryReserveError> {
        debug_assert_eq!(self.entries.len(), self.live, "shrink during rebuild");
        if self.capacity == self.live {
            return Ok(());
        }
        let mut compacted = Vec::new();
        compacted.try_reserve_exact(self.live)?;
        compacted.extend_from_slice(&self.entries[..self.live]);
        self.entries = compacted;
        self.capacity = self.live;
        Ok(())
    }

    /// Drops every entry and frees the array.
    pub fn clear_shrink(&mut self) {
        self.entries = Vec::new();
        self.live = 0;
        self.capacity = 0;
        self.clear_hint();
    }

    /// Mutable access to the live region, for in-place cell rewrites.
    ///
    /// Callers must call [`resort`](Self::resort) if they change the order.
    pub fn as_mut_slice(&mut self) -> &mut [IndexEntry] {
        &mut self.entries[..self.live]
    }

    /// Restores cell order of the live region.
    pub fn resort(&mut self) {
        self.entries[..self.live].sort_unstable_by(|a, b| compare_cells(a.cell, b.cell));
        self.clear_hint();
    }

    // -- rebuild support ---------------------------------------------------

    /// Moves every live entry into the stale region and returns how many
    /// there were.
    pub fn begin_rebuild(&mut self) -> usize {
        let previous = self.live;
        self.live = 0;
        self.clear_hint();
        previous
    }

    /// Entries not yet re-added during a rebuild.
    pub fn stale(&self) -> &[IndexEntry] {
        &self.entries[self.live..]
    }

    /// Removes the stale entry at `offset` within [`stale`](Self::stale).
    pub fn take_stale(&mut self, offset: usize) -> Option<IndexEntry> {
        let index = self.live + offset;
        if index >= self.entries.len() {
            return None;
        }
        Some(self.entries.remove(index))
    }

    /// Removes the last stale entry.
    pub fn pop_stale(&mut self) -> Option<IndexEntry> {
        if self.entries.len() > self.live {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Removes and returns all stale entries.
    pub fn drain_stale(&mut self) -> std::vec::Drain<'_, IndexEntry> {
        self.entries.drain(self.live..)
    }

    /// Total slots in use, live and stale.
    pub fn occupied(&self) -> usize {
        self.entries.len()
    }
}

impl Default for SortedCellIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::TypeTag;

    fn entry(raw: u32, slot: usize) -> IndexEntry {
        IndexEntry {
            cell: CellHandle::new(raw),
            entry: SlotId(slot),
        }
    }

    fn add(index: &mut SortedCellIndex, raw: u32, mode: GrowthMode) {
        let cell = CellHandle::new(raw);
        let pos = index.search(cell).unwrap_err();
        index
            .reserve_slot(mode, BULK_GROWTH, INCREMENTAL_GROWTH)
            .unwrap();
        index.insert(pos, entry(raw, raw as usize));
    }

    fn assert_sorted(index: &SortedCellIndex) {
        for pair in index.as_slice().windows(2) {
            assert_eq!(compare_cells(pair[0].cell, pair[1].cell), Ordering::Less);
        }
    }

    #[test]
    fn empty_index_inserts_at_zero() {
        let index = SortedCellIndex::new();
        assert_eq!(index.search(CellHandle::new(5)), Err(0));
        assert_eq!(index.hit_hint(), None);
    }

    #[test]
    fn search_finds_every_entry_and_insertion_points() {
        let mut index = SortedCellIndex::new();
        for raw in (1..=50u32).map(|i| i * 10) {
            add(&mut index, raw, GrowthMode::Incremental);
        }
        for (pos, raw) in (1..=50u32).map(|i| i * 10).enumerate() {
            assert_eq!(index.search(CellHandle::new(raw)), Ok(pos));
            assert_eq!(index.hit_hint(), Some(pos));
        }
        assert_eq!(index.search(CellHandle::new(5)), Err(0));
        assert_eq!(index.search(CellHandle::new(15)), Err(1));
        assert_eq!(index.search(CellHandle::new(495)), Err(49));
        assert_eq!(index.search(CellHandle::new(1000)), Err(50));
    }

    #[test]
    fn stale_or_out_of_range_hint_is_harmless() {
        let mut index = SortedCellIndex::new();
        for raw in [10, 20, 30, 40] {
            add(&mut index, raw, GrowthMode::Incremental);
        }
        assert_eq!(index.search(CellHandle::new(40)), Ok(3));
        index.remove(3);
        index.remove(2);
        assert_eq!(index.hit_hint(), Some(3));
        assert_eq!(index.search(CellHandle::new(20)), Ok(1));
        assert_eq!(index.search(CellHandle::new(40)), Err(2));
    }

    #[test]
    fn inserts_keep_signed_cell_order() {
        let mut index = SortedCellIndex::new();
        let cells = [
            CellHandle::new(0x40),
            CellHandle::with_tag(0x40, TypeTag::Volatile),
            CellHandle::new(0x10),
            CellHandle::with_tag(0x10, TypeTag::Volatile),
            CellHandle::new(0x7fff_fff0),
        ];
        for (slot, cell) in cells.iter().enumerate() {
            let pos = index.search(*cell).unwrap_err();
            index
                .reserve_slot(GrowthMode::Incremental, BULK_GROWTH, INCREMENTAL_GROWTH)
                .unwrap();
            index.insert(pos, IndexEntry { cell: *cell, entry: SlotId(slot) });
        }
        assert_sorted(&index);
        assert_eq!(
            index.as_slice()[0].cell,
            CellHandle::with_tag(0x40, TypeTag::Volatile)
        );
        assert_eq!(index.as_slice()[4].cell, CellHandle::new(0x7fff_fff0));
    }

    #[test]
    fn incremental_growth_steps_by_sixteen() {
        let mut index = SortedCellIndex::new();
        assert_eq!(index.capacity(), 0);
        for raw in 1..=16u32 {
            add(&mut index, raw, GrowthMode::Incremental);
        }
        assert_eq!(index.capacity(), 16);
        let grew = index
            .reserve_slot(GrowthMode::Incremental, BULK_GROWTH, INCREMENTAL_GROWTH)
            .unwrap();
        assert!(grew);
        assert_eq!(index.capacity(), 32);
    }

    #[test]
    fn bulk_growth_steps_by_a_page() {
        let mut index = SortedCellIndex::new();
        add(&mut index, 1, GrowthMode::Bulk);
        assert_eq!(index.capacity(), BULK_GROWTH);
        assert_eq!(BULK_GROWTH * std::mem::size_of::<IndexEntry>(), 4096);
    }

    #[test]
    fn remove_keeps_capacity() {
        let mut index = SortedCellIndex::new();
        for raw in [1, 2, 3] {
            add(&mut index, raw, GrowthMode::Incremental);
        }
        assert_eq!(index.remove(1), Some(entry(2, 2)));
        assert_eq!(index.remove(5), None);
        assert_eq!(index.len(), 2);
        assert_eq!(index.capacity(), INCREMENTAL_GROWTH);
    }

    #[test]
    fn shrink_to_fit_compacts_capacity() {
        let mut index = SortedCellIndex::new();
        for raw in [1, 2, 3] {
            add(&mut index, raw, GrowthMode::Bulk);
        }
        index.shrink_to_fit().unwrap();
        assert_eq!(index.capacity(), 3);
        assert_eq!(index.search(CellHandle::new(2)), Ok(1));
        assert_sorted(&index);
    }

    #[test]
    fn rebuild_regions() {
        let mut index = SortedCellIndex::new();
        for raw in [1, 2, 3, 4] {
            add(&mut index, raw, GrowthMode::Incremental);
        }
        assert_eq!(index.begin_rebuild(), 4);
        assert!(index.is_empty());
        assert_eq!(index.stale().len(), 4);
        assert_eq!(index.search(CellHandle::new(1)), Err(0));

        assert_eq!(index.take_stale(2), Some(entry(3, 3)));
        assert_eq!(index.pop_stale(), Some(entry(4, 4)));
        index
            .reserve_slot(GrowthMode::Bulk, BULK_GROWTH, INCREMENTAL_GROWTH)
            .unwrap();
        index.insert(0, entry(9, 3));
        assert_eq!(index.len(), 1);
        assert_eq!(index.stale(), &[entry(1, 1), entry(2, 2)]);
        assert_eq!(index.drain_stale().count(), 2);
        assert_eq!(index.occupied(), 1);
        assert_eq!(index.capacity(), INCREMENTAL_GROWTH);
    }

    #[test]
    fn resort_restores_order() {
        let mut index = SortedCellIndex::new();
        for raw in [10, 20, 30] {
            add(&mut index, raw, GrowthMode::Incremental);
        }
        index.as_mut_slice()[0].cell = CellHandle::new(40);
        index.resort();
        assert_sorted(&index);
        assert_eq!(index.search(CellHandle::new(40)), Ok(2));
    }
}
