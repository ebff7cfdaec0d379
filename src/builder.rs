//! Builder for security caches with non-default growth or preallocation.
//!
//! [`SecurityCache::new`] covers the usual case. The builder lets a host
//! tune how the backing array grows and reserve room up front, e.g. when the
//! number of security cells of a hive is known before the first rebuild.
//!
//! ## Example
//!
//! ```rust
//! use seccache::builder::SecurityCacheBuilder;
//!
//! let cache = SecurityCacheBuilder::new()
//!     .incremental_growth(8)
//!     .initial_capacity(100)
//!     .build();
//! assert_eq!(cache.capacity(), 100);
//! assert!(cache.is_empty());
//! ```

use crate::cache::SecurityCache;
use crate::ds::sorted_index::{BULK_GROWTH, INCREMENTAL_GROWTH};
use crate::error::ConfigError;

/// Builder for creating [`SecurityCache`] instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityCacheBuilder {
    incremental_growth: usize,
    bulk_growth: usize,
    initial_capacity: usize,
}

impl SecurityCacheBuilder {
    /// Starts from the default growth increments and no preallocation.
    pub fn new() -> Self {
        Self {
            incremental_growth: INCREMENTAL_GROWTH,
            bulk_growth: BULK_GROWTH,
            initial_capacity: 0,
        }
    }

    /// Slots added when a single add finds the backing array full.
    pub fn incremental_growth(mut self, slots: usize) -> Self {
        self.incremental_growth = slots;
        self
    }

    /// Slots added when a bulk load (rebuild) finds the backing array full.
    pub fn bulk_growth(mut self, slots: usize) -> Self {
        self.bulk_growth = slots;
        self
    }

    /// Slots reserved before the first add.
    pub fn initial_capacity(mut self, slots: usize) -> Self {
        self.initial_capacity = slots;
        self
    }

    /// Builds the cache, rejecting zero growth increments and reporting a
    /// failed preallocation.
    pub fn try_build(self) -> Result<SecurityCache, ConfigError> {
        if self.incremental_growth == 0 {
            return Err(ConfigError::new("incremental growth must be > 0"));
        }
        if self.bulk_growth == 0 {
            return Err(ConfigError::new("bulk growth must be > 0"));
        }
        let mut cache = SecurityCache::with_growth(self.bulk_growth, self.incremental_growth);
        if self.initial_capacity > 0 {
            cache.reserve_exact(self.initial_capacity).map_err(|err| {
                ConfigError::new(format!(
                    "initial capacity of {} slots: {err}",
                    self.initial_capacity
                ))
            })?;
        }
        Ok(cache)
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics on the configurations [`try_build`](Self::try_build) rejects.
    pub fn build(self) -> SecurityCache {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("invalid security cache configuration: {err}"),
        }
    }
}

impl Default for SecurityCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
