pub use crate::builder::SecurityCacheBuilder;
pub use crate::cache::{SECURITY_HASH_BUCKETS, SecurityCache, SecurityEntry, SecurityRef};
pub use crate::cell::{CellHandle, TypeTag, compare_cells};
#[cfg(feature = "concurrency")]
pub use crate::concurrent::ConcurrentSecurityCache;
pub use crate::ds::sorted_index::GrowthMode;
pub use crate::error::{CacheError, ConfigError, CorruptionKind, InvariantError};
pub use crate::hash::{ConvKey, conv_key};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::SecurityCacheMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::{MetricsReset, MetricsSnapshotProvider};
pub use crate::remap::RemapEntry;
pub use crate::store::memory::MemoryHive;
pub use crate::store::traits::{CellStore, MappedCell, SecurityChain};
pub use crate::traits::SecurityOwner;
