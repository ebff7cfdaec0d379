//! Counters for the security cache (feature `metrics`).
//!
//! The cache records into [`counters::SecurityCacheCounters`] and exposes a
//! point-in-time [`snapshot::SecurityCacheMetricsSnapshot`] through
//! [`traits::MetricsSnapshotProvider`].

pub mod counters;
pub mod snapshot;
pub mod traits;
