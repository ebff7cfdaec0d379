//! In-memory hive implementing [`CellStore`] and [`SecurityChain`].
//!
//! ## Architecture
//! - Security cells are kept in an `FxHashMap<CellHandle, SecurityCell>`;
//!   each cell carries its descriptor and its forward/back chain links.
//! - Cells added through [`MemoryHive::push_security`] join the circular
//!   chain at the tail (just before the root), like the hive's own list of
//!   security cells. [`MemoryHive::insert_loose`] stores a cell outside the
//!   chain.
//! - Mapping accounting: every `fetch` and `release` is counted, so callers
//!   can check that no mapping leaks.
//!
//! ## Fault Injection
//! - [`MemoryHive::set_unmappable`]: `fetch` fails for the cell.
//! - [`MemoryHive::set_unreadable_links`]: `next`/`prev` fail for the cell.
//! - [`MemoryHive::set_back_link`]: overwrite a back link to simulate a torn chain.
//! - [`MemoryHive::set_validator`]: replace the descriptor validator.
//!
//! ## Example Usage
//! ```rust
//! use seccache::cell::CellHandle;
//! use seccache::store::memory::{MemoryHive, sample_descriptor};
//! use seccache::store::traits::{CellStore, SecurityChain};
//!
//! let mut hive = MemoryHive::new();
//! hive.push_security(CellHandle::new(0x20), sample_descriptor(1, 32));
//! hive.push_security(CellHandle::new(0x80), sample_descriptor(2, 48));
//!
//! assert_eq!(hive.root_cell(), CellHandle::new(0x20));
//! assert_eq!(hive.next(CellHandle::new(0x80)), Some(CellHandle::new(0x20)));
//! assert_eq!(hive.map(CellHandle::new(0x80)).unwrap().len(), 48);
//! assert_eq!(hive.outstanding_mappings(), 0);
//! ```
//!
//! ## Thread Safety
//! - `MemoryHive` is `Send + Sync`; counters are relaxed atomics and the
//!   cell map is only mutated through `&mut self`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::cell::CellHandle;
use crate::store::traits::{CellStore, SecurityChain};

/// Smallest well-formed self-relative security descriptor header, in bytes.
pub const MIN_DESCRIPTOR_LEN: usize = 20;

/// Revision byte of a well-formed descriptor.
pub const DESCRIPTOR_REVISION: u8 = 1;

/// Header check applied by the default validator: minimum length and revision.
pub fn descriptor_header_ok(descriptor: &[u8]) -> bool {
    descriptor.len() >= MIN_DESCRIPTOR_LEN && descriptor[0] == DESCRIPTOR_REVISION
}

/// Builds a descriptor of `len` bytes (at least the header size) that passes
/// [`descriptor_header_ok`]; different seeds give different contents.
pub fn sample_descriptor(seed: u32, len: usize) -> Vec<u8> {
    let len = len.max(MIN_DESCRIPTOR_LEN);
    let mut bytes = vec![0u8; len];
    bytes[0] = DESCRIPTOR_REVISION;
    bytes[2..4].copy_from_slice(&0x8004u16.to_le_bytes());
    for (i, byte) in bytes.iter_mut().enumerate().skip(4) {
        *byte = (seed.wrapping_mul(31).wrapping_add(i as u32) % 251) as u8;
    }
    bytes
}

#[derive(Debug, Clone)]
struct SecurityCell {
    descriptor: Vec<u8>,
    flink: CellHandle,
    blink: CellHandle,
    in_chain: bool,
}

/// Hive storage held entirely in memory.
pub struct MemoryHive {
    cells: FxHashMap<CellHandle, SecurityCell>,
    root: CellHandle,
    unmappable: FxHashSet<CellHandle>,
    unreadable_links: FxHashSet<CellHandle>,
    validator: fn(&[u8]) -> bool,
    fetches: AtomicU64,
    releases: AtomicU64,
}

impl MemoryHive {
    pub fn new() -> Self {
        Self {
            cells: FxHashMap::default(),
            root: CellHandle::NIL,
            unmappable: FxHashSet::default(),
            unreadable_links: FxHashSet::default(),
            validator: descriptor_header_ok,
            fetches: AtomicU64::new(0),
            releases: AtomicU64::new(0),
        }
    }

    /// Stores `cell` and appends it to the tail of the security chain.
    ///
    /// If `cell` already exists its descriptor is replaced and its chain
    /// position kept.
    pub fn push_security(&mut self, cell: CellHandle, descriptor: Vec<u8>) {
        if let Some(existing) = self.cells.get_mut(&cell) {
            if existing.in_chain {
                existing.descriptor = descriptor;
                return;
            }
        }

        let (flink, blink) = if self.root.is_nil() {
            self.root = cell;
            (cell, cell)
        } else {
            let root = self.root;
            let tail = self.cells.get(&root).map(|c| c.blink).unwrap_or(root);
            if let Some(tail_cell) = self.cells.get_mut(&tail) {
                tail_cell.flink = cell;
            }
            if let Some(root_cell) = self.cells.get_mut(&root) {
                root_cell.blink = cell;
            }
            (root, tail)
        };

        self.cells.insert(
            cell,
            SecurityCell {
                descriptor,
                flink,
                blink,
                in_chain: true,
            },
        );
    }

    /// Stores `cell` without linking it into the security chain.
    pub fn insert_loose(&mut self, cell: CellHandle, descriptor: Vec<u8>) {
        if let Some(existing) = self.cells.get_mut(&cell) {
            existing.descriptor = descriptor;
            return;
        }
        self.cells.insert(
            cell,
            SecurityCell {
                descriptor,
                flink: CellHandle::NIL,
                blink: CellHandle::NIL,
                in_chain: false,
            },
        );
    }

    /// Replaces the descriptor of an existing cell. Returns `false` if absent.
    pub fn set_descriptor(&mut self, cell: CellHandle, descriptor: Vec<u8>) -> bool {
        match self.cells.get_mut(&cell) {
            Some(existing) => {
                existing.descriptor = descriptor;
                true
            }
            None => false,
        }
    }

    /// Removes `cell`, unlinking it from the chain. Returns its descriptor.
    pub fn remove_security(&mut self, cell: CellHandle) -> Option<Vec<u8>> {
        let removed = self.cells.remove(&cell)?;
        if removed.in_chain {
            if removed.flink == cell {
                self.root = CellHandle::NIL;
            } else {
                if let Some(prev) = self.cells.get_mut(&removed.blink) {
                    prev.flink = removed.flink;
                }
                if let Some(next) = self.cells.get_mut(&removed.flink) {
                    next.blink = removed.blink;
                }
                if self.root == cell {
                    self.root = removed.flink;
                }
            }
        }
        Some(removed.descriptor)
    }

    /// Overwrites the back link of `cell`.
    pub fn set_back_link(&mut self, cell: CellHandle, prev: CellHandle) {
        if let Some(existing) = self.cells.get_mut(&cell) {
            existing.blink = prev;
        }
    }

    /// Overwrites the forward link of `cell`.
    pub fn set_forward_link(&mut self, cell: CellHandle, next: CellHandle) {
        if let Some(existing) = self.cells.get_mut(&cell) {
            existing.flink = next;
        }
    }

    pub fn set_unmappable(&mut self, cell: CellHandle, unmappable: bool) {
        if unmappable {
            self.unmappable.insert(cell);
        } else {
            self.unmappable.remove(&cell);
        }
    }

    pub fn set_unreadable_links(&mut self, cell: CellHandle, unreadable: bool) {
        if unreadable {
            self.unreadable_links.insert(cell);
        } else {
            self.unreadable_links.remove(&cell);
        }
    }

    pub fn set_validator(&mut self, validator: fn(&[u8]) -> bool) {
        self.validator = validator;
    }

    /// Cells of the chain in forward order starting at the root.
    pub fn chain(&self) -> Vec<CellHandle> {
        let mut out = Vec::new();
        let mut current = self.root;
        while !current.is_nil() && out.len() <= self.cells.len() {
            out.push(current);
            current = match self.cells.get(&current) {
                Some(cell) if cell.flink != self.root => cell.flink,
                _ => break,
            };
        }
        out
    }

    pub fn descriptor(&self, cell: CellHandle) -> Option<&[u8]> {
        self.cells.get(&cell).map(|c| c.descriptor.as_slice())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Successful fetches so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Fetches not yet released.
    pub fn outstanding_mappings(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed) - self.releases.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for MemoryHive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHive")
            .field("cells", &self.cells.len())
            .field("root", &self.root)
            .field("fetches", &self.fetch_count())
            .field("outstanding", &self.outstanding_mappings())
            .finish()
    }
}

impl Default for MemoryHive {
    fn default() -> Self {
        Self::new()
    }
}

impl CellStore for MemoryHive {
    fn fetch(&self, cell: CellHandle) -> Option<&[u8]> {
        if self.unmappable.contains(&cell) {
            return None;
        }
        let bytes = self.cells.get(&cell)?.descriptor.as_slice();
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Some(bytes)
    }

    fn release(&self, _cell: CellHandle) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    fn validate_descriptor(&self, descriptor: &[u8]) -> bool {
        (self.validator)(descriptor)
    }
}

impl SecurityChain for MemoryHive {
    fn root_cell(&self) -> CellHandle {
        self.root
    }

    fn next(&self, cell: CellHandle) -> Option<CellHandle> {
        if self.unreadable_links.contains(&cell) {
            return None;
        }
        self.cells
            .get(&cell)
            .filter(|c| c.in_chain)
            .map(|c| c.flink)
    }

    fn prev(&self, cell: CellHandle) -> Option<CellHandle> {
        if self.unreadable_links.contains(&cell) {
            return None;
        }
        self.cells
            .get(&cell)
            .filter(|c| c.in_chain)
            .map(|c| c.blink)
    }
}
