//! Storage collaborators of the security cache.
//!
//! The cache never owns hive storage. It borrows a [`CellStore`] for the
//! duration of each call that needs descriptor bytes, and a
//! [`SecurityChain`] when rebuilding from the hive's list of security cells.

use std::fmt;
use std::ops::Deref;

use crate::cell::{CellHandle, TypeTag};

/// Maps security cells of a hive to their descriptor bytes.
pub trait CellStore {
    /// Maps the descriptor bytes of `cell`; `None` if the region cannot be mapped.
    ///
    /// Every successful call must be paired with exactly one [`release`](Self::release).
    /// Prefer [`map`](Self::map), which pairs them automatically.
    fn fetch(&self, cell: CellHandle) -> Option<&[u8]>;

    /// Releases a mapping obtained from [`fetch`](Self::fetch).
    fn release(&self, cell: CellHandle);

    /// Storage classification of `cell`.
    fn cell_type(&self, cell: CellHandle) -> TypeTag {
        cell.type_tag()
    }

    /// Structural validation of a descriptor read from the hive.
    fn validate_descriptor(&self, descriptor: &[u8]) -> bool;

    /// Maps `cell` and returns a guard that releases the mapping on drop.
    fn map(&self, cell: CellHandle) -> Option<MappedCell<'_, Self>> {
        let bytes = self.fetch(cell)?;
        Some(MappedCell {
            store: self,
            cell,
            bytes,
        })
    }
}

/// The hive's circular doubly linked list of security cells.
pub trait SecurityChain: CellStore {
    /// First cell of the chain, or [`CellHandle::NIL`] if the hive has none.
    fn root_cell(&self) -> CellHandle;

    /// Forward link of `cell`; `None` if the links cannot be read.
    fn next(&self, cell: CellHandle) -> Option<CellHandle>;

    /// Back link of `cell`; `None` if the links cannot be read.
    fn prev(&self, cell: CellHandle) -> Option<CellHandle>;
}

/// Descriptor bytes of a mapped cell; releases the mapping when dropped.
pub struct MappedCell<'a, S: CellStore + ?Sized> {
    store: &'a S,
    cell: CellHandle,
    bytes: &'a [u8],
}

impl<S: CellStore + ?Sized> MappedCell<'_, S> {
    pub fn cell(&self) -> CellHandle {
        self.cell
    }
}

impl<S: CellStore + ?Sized> Deref for MappedCell<'_, S> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl<S: CellStore + ?Sized> Drop for MappedCell<'_, S> {
    fn drop(&mut self) {
        self.store.release(self.cell);
    }
}

impl<S: CellStore + ?Sized> fmt::Debug for MappedCell<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedCell")
            .field("cell", &self.cell)
            .field("len", &self.bytes.len())
            .finish()
    }
}
