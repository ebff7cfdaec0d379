pub mod hash_chains;
pub mod slot_arena;
pub mod sorted_index;

pub use hash_chains::{ChainLinks, Chained, HashChains};
pub use slot_arena::{SlotArena, SlotId};
pub use sorted_index::{GrowthMode, IndexEntry, SortedCellIndex};
