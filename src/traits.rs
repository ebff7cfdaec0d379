//! Seams between the security cache and the key-node layer.
//!
//! A key node does not own its security descriptor; it holds a weak
//! [`SecurityRef`] into the hive's [`SecurityCache`](crate::cache::SecurityCache),
//! set through [`SecurityCache::assign_to_owner`](crate::cache::SecurityCache::assign_to_owner).
//!
//! ## Example
//!
//! ```rust
//! use seccache::cache::{SecurityCache, SecurityRef};
//! use seccache::cell::CellHandle;
//! use seccache::store::memory::{MemoryHive, sample_descriptor};
//! use seccache::traits::SecurityOwner;
//!
//! #[derive(Default)]
//! struct KeyControlBlock {
//!     security: Option<SecurityRef>,
//! }
//!
//! impl SecurityOwner for KeyControlBlock {
//!     fn set_security(&mut self, security: Option<SecurityRef>) {
//!         self.security = security;
//!     }
//!
//!     fn security(&self) -> Option<SecurityRef> {
//!         self.security
//!     }
//! }
//!
//! let mut hive = MemoryHive::new();
//! hive.push_security(CellHandle::new(0x20), sample_descriptor(1, 40));
//! let mut cache = SecurityCache::new();
//! cache.rebuild(&hive).unwrap();
//!
//! let mut kcb = KeyControlBlock::default();
//! cache.assign_to_owner(&mut kcb, CellHandle::new(0x20));
//! let entry = cache.entry(kcb.security().unwrap()).unwrap();
//! assert_eq!(entry.descriptor_len(), 40);
//! ```

pub use crate::cache::SecurityRef;

/// Holder of a weak reference to a cached security descriptor.
pub trait SecurityOwner {
    /// Replaces the held reference; `None` means the owner has no security.
    fn set_security(&mut self, security: Option<SecurityRef>);

    fn security(&self) -> Option<SecurityRef>;
}
