//! Fixed-size table of doubly linked hash chains over a shared `SlotArena`.
//!
//! Each value stored in the arena carries its own [`ChainLinks`]; the table
//! only keeps a head and tail per bucket. Unlinking a value given its
//! `SlotId` is O(1) and needs no search.
//!
//! ## Architecture
//!
//! ```text
//!   heads/tails ([Option<SlotId>; N])        arena (SlotArena<T>)
//!   ┌────────┬──────────────────┐            ┌────────┬──────────────────────────────┐
//!   │ bucket │ head      tail   │            │ SlotId │ links { prev, next, bucket } │
//!   ├────────┼──────────────────┤            ├────────┼──────────────────────────────┤
//!   │   0    │ None      None   │            │ id_1   │ { None,  id_4, Some(1) }     │
//!   │   1    │ id_1      id_4 ──┼──────────► │ id_4   │ { id_1,  None, Some(1) }     │
//!   │   2    │ id_2      id_2   │            │ id_2   │ { None,  None, Some(2) }     │
//!   └────────┴──────────────────┘            └────────┴──────────────────────────────┘
//!
//!   bucket = chain_key % N; push_back appends at the tail, lookups scan from head.
//! ```
//!
//! ## Performance
//! - `push_back`: O(1)
//! - `unlink`: O(1)
//! - `iter_bucket`: O(chain length)
//! - `reset`: O(n)

use crate::ds::slot_arena::{SlotArena, SlotId};

/// Link state embedded in every chained value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainLinks {
    prev: Option<SlotId>,
    next: Option<SlotId>,
    bucket: Option<usize>,
}

impl ChainLinks {
    /// Returns `true` while the value is a member of some chain.
    pub fn is_linked(&self) -> bool {
        self.bucket.is_some()
    }

    pub fn bucket(&self) -> Option<usize> {
        self.bucket
    }
}

/// A value that can live in a [`HashChains`] table.
pub trait Chained {
    /// Key whose residue selects the bucket.
    fn chain_key(&self) -> u32;
    fn links(&self) -> &ChainLinks;
    fn links_mut(&mut self) -> &mut ChainLinks;
}

#[derive(Debug)]
/// `N` chains of arena values linked through their embedded [`ChainLinks`].
pub struct HashChains<const N: usize> {
    heads: [Option<SlotId>; N],
    tails: [Option<SlotId>; N],
    len: usize,
}

impl<const N: usize> HashChains<N> {
    /// Creates a table with every chain empty.
    pub fn new() -> Self {
        Self {
            heads: [None; N],
            tails: [None; N],
            len: 0,
        }
    }

    /// Bucket selected by `key`.
    #[inline]
    pub fn bucket_of(key: u32) -> usize {
        key as usize % N
    }

    /// Number of linked values across all chains.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `id` to the tail of its bucket's chain.
    ///
    /// Returns `false` if `id` is not in `arena` or is already linked.
    pub fn push_back<T: Chained>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        let Some(value) = arena.get_mut(id) else {
            return false;
        };
        if value.links().is_linked() {
            return false;
        }
        let bucket = Self::bucket_of(value.chain_key());
        let old_tail = self.tails[bucket];
        *value.links_mut() = ChainLinks {
            prev: old_tail,
            next: None,
            bucket: Some(bucket),
        };

        if let Some(old_tail) = old_tail {
            if let Some(tail_value) = arena.get_mut(old_tail) {
                tail_value.links_mut().next = Some(id);
            }
        } else {
            self.heads[bucket] = Some(id);
        }
        self.tails[bucket] = Some(id);
        self.len += 1;
        true
    }

    /// Unlinks `id` from whichever chain holds it.
    ///
    /// Returns `false` if `id` is not in `arena` or not linked.
    pub fn unlink<T: Chained>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        let links = match arena.get(id) {
            Some(value) => *value.links(),
            None => return false,
        };
        let Some(bucket) = links.bucket else {
            return false;
        };

        if let Some(prev_id) = links.prev {
            if let Some(prev_value) = arena.get_mut(prev_id) {
                prev_value.links_mut().next = links.next;
            }
        } else {
            self.heads[bucket] = links.next;
        }

        if let Some(next_id) = links.next {
            if let Some(next_value) = arena.get_mut(next_id) {
                next_value.links_mut().prev = links.prev;
            }
        } else {
            self.tails[bucket] = links.prev;
        }

        if let Some(value) = arena.get_mut(id) {
            *value.links_mut() = ChainLinks::default();
        }
        self.len -= 1;
        true
    }

    /// Empties every chain, clearing the links of the values that were linked.
    pub fn reset<T: Chained>(&mut self, arena: &mut SlotArena<T>) {
        for bucket in 0..N {
            let mut current = self.heads[bucket].take();
            while let Some(id) = current {
                current = arena.get_mut(id).and_then(|value| {
                    let next = value.links().next;
                    *value.links_mut() = ChainLinks::default();
                    next
                });
            }
            self.tails[bucket] = None;
        }
        self.len = 0;
    }

    /// Iterates the chain that `key` selects, from head to tail.
    pub fn iter_bucket<'a, T: Chained>(
        &'a self,
        arena: &'a SlotArena<T>,
        key: u32,
    ) -> ChainIter<'a, T> {
        ChainIter {
            arena,
            current: self.heads[Self::bucket_of(key)],
        }
    }

    /// Number of values in the chain at `bucket`.
    pub fn chain_len<T: Chained>(&self, arena: &SlotArena<T>, bucket: usize) -> usize {
        ChainIter {
            arena,
            current: self.heads.get(bucket).copied().flatten(),
        }
        .count()
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants<T: Chained>(&self, arena: &SlotArena<T>) {
        let mut total = 0usize;
        for bucket in 0..N {
            if self.heads[bucket].is_none() || self.tails[bucket].is_none() {
                assert!(self.heads[bucket].is_none());
                assert!(self.tails[bucket].is_none());
                continue;
            }
            let mut current = self.heads[bucket];
            let mut prev = None;
            while let Some(id) = current {
                let value = arena.get(id).expect("chained value missing");
                let links = value.links();
                assert_eq!(links.prev, prev);
                assert_eq!(links.bucket, Some(bucket));
                assert_eq!(Self::bucket_of(value.chain_key()), bucket);
                if links.next.is_none() {
                    assert_eq!(self.tails[bucket], Some(id));
                }
                prev = Some(id);
                current = links.next;
                total += 1;
                assert!(total <= self.len);
            }
        }
        assert_eq!(total, self.len);
    }
}

impl<const N: usize> Default for HashChains<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(SlotId, &T)` pairs of one chain, head to tail.
pub struct ChainIter<'a, T> {
    arena: &'a SlotArena<T>,
    current: Option<SlotId>,
}

impl<'a, T: Chained> Iterator for ChainIter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let value = self.arena.get(id)?;
        self.current = value.links().next;
        Some((id, value))
    }
}
