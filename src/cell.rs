//! Cell handles and the signed-magnitude cell ordering.
//!
//! A [`CellHandle`] addresses a variable-length record in the hive's backing
//! storage. The top bit is a storage type tag ([`TypeTag`]): stable cells live
//! in the persisted part of the hive, volatile cells only in memory.
//!
//! ## Ordering
//!
//! The security cache keeps its backing array sorted by [`compare_cells`],
//! which is *not* plain integer order:
//!
//! ```text
//!   handle      tag   magnitude   signed key
//!   0x8000_0010  V       0x10        -16
//!   0x8000_0004  V       0x04         -4
//!   0x0000_0004  S       0x04         +4
//!   0x0000_0010  S       0x10        +16
//! ```
//!
//! Volatile handles sort before stable ones, and within each group they are
//! ordered by magnitude (descending for volatile, ascending for stable).

use std::cmp::Ordering;
use std::fmt;

/// Storage classification carried in a cell handle's top bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Persisted storage (tag bit clear).
    Stable,
    /// In-memory storage (tag bit set).
    Volatile,
}

/// Opaque handle of a cell in the backing store.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellHandle(u32);

impl CellHandle {
    /// Bit reserved for the storage type tag.
    pub const TYPE_MASK: u32 = 0x8000_0000;

    /// Sentinel meaning "no cell"; used for "no security" and "not yet assigned".
    pub const NIL: CellHandle = CellHandle(u32::MAX);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Builds a handle from a magnitude and a type tag.
    ///
    /// The magnitude's top bit is ignored.
    #[inline]
    pub const fn with_tag(magnitude: u32, tag: TypeTag) -> Self {
        let magnitude = magnitude & !Self::TYPE_MASK;
        match tag {
            TypeTag::Stable => Self(magnitude),
            TypeTag::Volatile => Self(magnitude | Self::TYPE_MASK),
        }
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_nil(self) -> bool {
        self.0 == Self::NIL.0
    }

    #[inline]
    pub const fn type_tag(self) -> TypeTag {
        if self.0 & Self::TYPE_MASK != 0 {
            TypeTag::Volatile
        } else {
            TypeTag::Stable
        }
    }

    /// The handle with its type tag stripped.
    #[inline]
    pub const fn magnitude(self) -> u32 {
        self.0 & !Self::TYPE_MASK
    }

    /// Signed sort key: the magnitude, negated when the tag bit is set.
    #[inline]
    pub const fn signed_key(self) -> i64 {
        let magnitude = self.magnitude() as i64;
        match self.type_tag() {
            TypeTag::Stable => magnitude,
            TypeTag::Volatile => -magnitude,
        }
    }
}

impl fmt::Debug for CellHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            f.write_str("CellHandle(NIL)")
        } else {
            write!(f, "CellHandle({:#010x})", self.0)
        }
    }
}

impl fmt::Display for CellHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for CellHandle {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Orders two cell handles by their signed-magnitude key.
///
/// `0x0000_0000` and `0x8000_0000` share the key `0`; the raw value breaks
/// that tie so distinct handles never compare equal.
#[inline]
pub fn compare_cells(a: CellHandle, b: CellHandle) -> Ordering {
    a.signed_key()
        .cmp(&b.signed_key())
        .then_with(|| b.raw().cmp(&a.raw()))
}
