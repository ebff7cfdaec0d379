//! Read side of the metrics: snapshotting and resetting.
//!
//! Recording stays inside the cache; consumers (tests, benches, a host's
//! monitoring) only see these traits.

/// Snapshot provider for tests and benches.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}
