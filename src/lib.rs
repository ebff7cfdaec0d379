//! seccache: the security-descriptor cache of a registry hive.
//!
//! A hive stores each distinct security descriptor once, in a security cell,
//! and key nodes refer to those cells. [`SecurityCache`](cache::SecurityCache)
//! mirrors every security cell of one hive in memory so the key layer can
//! resolve a key's security by cell and find an existing cell for a
//! descriptor before writing a new one.
//!
//! Hive storage stays outside the crate: operations borrow a
//! [`CellStore`](store::traits::CellStore) (or a
//! [`SecurityChain`](store::traits::SecurityChain) for rebuilds) per call.
//! [`MemoryHive`](store::memory::MemoryHive) is an in-memory implementation.

pub mod builder;
pub mod cache;
pub mod cell;
#[cfg(feature = "concurrency")]
pub mod concurrent;
pub mod ds;
pub mod error;
pub mod hash;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod prelude;
pub mod remap;
pub mod store;
pub mod traits;
