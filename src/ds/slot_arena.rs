//! Slot arena holding cached security entries.
//!
//! Values are addressed by [`SlotId`]; freed slots go on a free list and are
//! reused by later inserts. Growth is fallible: [`SlotArena::try_insert`]
//! reports allocation failure instead of aborting.

use std::collections::TryReserveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Inserts `value`, reusing a free slot when one exists.
    ///
    /// On allocation failure the arena is unchanged and `value` is dropped.
    pub fn try_insert(&mut self, value: T) -> Result<SlotId, TryReserveError> {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(value);
            idx
        } else {
            self.slots.try_reserve(1)?;
            // The free list must be able to take every slot back without allocating.
            self.free_list
                .try_reserve(self.slots.len() + 1 - self.free_list.len())?;
            self.slots.push(Some(value));
            self.slots.len() - 1
        };
        self.len += 1;
        Ok(SlotId(idx))
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        let value = slot.take()?;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.slots
            .get(id.0)
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every value and releases the slot storage.
    pub fn clear_shrink(&mut self) {
        self.slots = Vec::new();
        self.free_list = Vec::new();
        self.len = 0;
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
