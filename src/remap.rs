//! Cell relocation support for hive saves.
//!
//! Saving or compacting a hive moves stable cells to new offsets. The saver
//! asks the cache for a remap array with [`SecurityCache::build_remap_array`],
//! fills in the new offset of every stable security cell, and hands the array
//! back through [`SecurityCache::apply_remap`] so the cache follows the move.
//! Volatile cells never move and are mapped to themselves from the start.

use rustc_hash::FxHashSet;

use log::debug;

use crate::cache::{SecurityCache, SecurityEntry};
use crate::cell::{CellHandle, TypeTag};
use crate::ds::sorted_index::IndexEntry;
use crate::error::CacheError;

/// Old and new location of one cached security cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemapEntry {
    pub old_cell: CellHandle,
    /// [`CellHandle::NIL`] until the saver assigns a location.
    pub new_cell: CellHandle,
}

impl RemapEntry {
    pub fn is_assigned(&self) -> bool {
        !self.new_cell.is_nil()
    }
}

impl SecurityCache {
    /// One [`RemapEntry`] per cached cell, in backing-array order.
    ///
    /// Volatile cells map to themselves; stable cells map to
    /// [`CellHandle::NIL`]. Fails only if the array cannot be allocated.
    pub fn build_remap_array(&self) -> Result<Vec<RemapEntry>, CacheError> {
        let live = self.index.as_slice();
        let mut remap = Vec::new();
        remap.try_reserve_exact(live.len())?;
        remap.extend(live.iter().map(|slot| RemapEntry {
            old_cell: slot.cell,
            new_cell: match self.slot_type(slot) {
                TypeTag::Volatile => slot.cell,
                TypeTag::Stable => CellHandle::NIL,
            },
        }));
        Ok(remap)
    }

    /// Moves every cached stable cell to its `new_cell`.
    ///
    /// `remap` must be the array from [`build_remap_array`](Self::build_remap_array)
    /// with every stable entry assigned, and the cache must not have changed
    /// since. A stable cell keeps the type bit of its handle when it moves. The whole array is checked before anything is rewritten, so on
    /// error the cache is untouched. Volatile entries are left alone.
    ///
    /// Weak [`SecurityRef`](crate::cache::SecurityRef)s taken before the move
    /// stop resolving for relocated cells.
    pub fn apply_remap(&mut self, remap: &[RemapEntry]) -> Result<(), CacheError> {
        let live = self.index.as_slice();
        if remap.len() != live.len() {
            let expected = live.get(remap.len()).map_or(CellHandle::NIL, |slot| slot.cell);
            let found = remap.get(live.len()).map_or(CellHandle::NIL, |e| e.old_cell);
            return Err(CacheError::RemapMismatch { expected, found });
        }

        let mut targets = FxHashSet::default();
        targets.try_reserve(remap.len())?;
        for (slot, entry) in live.iter().zip(remap) {
            if slot.cell != entry.old_cell {
                return Err(CacheError::RemapMismatch {
                    expected: slot.cell,
                    found: entry.old_cell,
                });
            }
            let target = match self.slot_type(slot) {
                TypeTag::Volatile => slot.cell,
                TypeTag::Stable => {
                    if !entry.is_assigned() {
                        return Err(CacheError::UnassignedRemap { cell: slot.cell });
                    }
                    if entry.new_cell.type_tag() != slot.cell.type_tag() {
                        return Err(CacheError::RemapMismatch {
                            expected: slot.cell,
                            found: entry.new_cell,
                        });
                    }
                    entry.new_cell
                }
            };
            if !targets.insert(target) {
                return Err(CacheError::RemapMismatch {
                    expected: slot.cell,
                    found: target,
                });
            }
        }

        let mut moved = 0usize;
        for (slot, entry) in self.index.as_mut_slice().iter_mut().zip(remap) {
            let Some(cached) = self.entries.get_mut(slot.entry) else {
                continue;
            };
            if cached.type_tag() == TypeTag::Volatile || slot.cell == entry.new_cell {
                continue;
            }
            slot.cell = entry.new_cell;
            cached.relocate(entry.new_cell);
            moved += 1;
        }
        self.index.resort();
        debug!("security cache followed {moved} relocated cells");
        Ok(())
    }

    fn slot_type(&self, slot: &IndexEntry) -> TypeTag {
        self.entries
            .get(slot.entry)
            .map_or(slot.cell.type_tag(), SecurityEntry::type_tag)
    }
}
