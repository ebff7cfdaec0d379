//! Error types for the seccache library.
//!
//! ## Key Components
//!
//! - [`CacheError`]: Returned by cache operations (allocation failure, a cell
//!   the store cannot map, a corrupt security chain, a missing cell that must
//!   be cached, an invalid remap array).
//! - [`CorruptionKind`]: Which structural check failed during a rebuild.
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//! - [`ConfigError`]: Returned when builder parameters are invalid
//!   (e.g. a zero growth increment).
//!
//! ## Example Usage
//!
//! ```
//! use seccache::builder::SecurityCacheBuilder;
//! use seccache::error::ConfigError;
//!
//! let bad: Result<_, ConfigError> = SecurityCacheBuilder::new()
//!     .incremental_growth(0)
//!     .try_build();
//! assert!(bad.is_err());
//! ```

use std::fmt;

use thiserror::Error;

use crate::cell::CellHandle;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Structural check that failed while walking the hive's security chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptionKind {
    /// The cell's back link does not point at the previously visited cell.
    BrokenBackLink {
        expected_prev: CellHandle,
        found_prev: CellHandle,
    },
    /// The descriptor bytes failed the store's validator.
    InvalidDescriptor,
    /// The chain links of the cell could not be read.
    UnmappableLink,
    /// The chain visits the same cell twice before closing.
    DuplicateCell,
}

impl fmt::Display for CorruptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptionKind::BrokenBackLink {
                expected_prev,
                found_prev,
            } => write!(
                f,
                "back link points at {found_prev}, expected {expected_prev}"
            ),
            CorruptionKind::InvalidDescriptor => f.write_str("descriptor failed validation"),
            CorruptionKind::UnmappableLink => f.write_str("chain links could not be mapped"),
            CorruptionKind::DuplicateCell => f.write_str("cell visited twice"),
        }
    }
}

/// Error returned by security cache operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// An allocation (entry, descriptor copy, array growth) failed.
    #[error("out of memory")]
    OutOfMemory,
    /// The store could not map the bytes of a cell.
    #[error("cell {cell} could not be fetched from the store")]
    FetchFailed { cell: CellHandle },
    /// The security chain or one of its descriptors is corrupt.
    #[error("security chain corrupt at cell {cell}: {reason}")]
    StructuralCorruption {
        cell: CellHandle,
        reason: CorruptionKind,
    },
    /// A cell that must be cached is missing.
    #[error("security cell {cell} is not cached")]
    FatalInconsistency { cell: CellHandle },
    /// A remap entry for a stable cell has no new cell assigned.
    #[error("no relocation assigned for stable cell {cell}")]
    UnassignedRemap { cell: CellHandle },
    /// The remap array does not describe the cache's current contents.
    #[error("remap array out of step with cache: expected {expected}, found {found}")]
    RemapMismatch {
        expected: CellHandle,
        found: CellHandle,
    },
}

impl CacheError {
    /// Returns `true` for errors that indicate a bug elsewhere in the host
    /// rather than a recoverable condition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CacheError::FatalInconsistency { .. })
    }
}

impl From<std::collections::TryReserveError> for CacheError {
    fn from(_: std::collections::TryReserveError) -> Self {
        CacheError::OutOfMemory
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`SecurityCache::check_invariants`](crate::cache::SecurityCache::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`SecurityCacheBuilder::try_build`](crate::builder::SecurityCacheBuilder::try_build).
///
/// # Example
///
/// ```
/// use seccache::builder::SecurityCacheBuilder;
///
/// let err = SecurityCacheBuilder::new().bulk_growth(0).try_build().unwrap_err();
/// assert!(err.to_string().contains("bulk"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
