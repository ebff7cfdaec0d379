use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::SecurityCacheMetricsSnapshot;

/// Metrics counters using atomics, so lookups can record through `&self`.
///
/// All counters use `Ordering::Relaxed` for low-overhead increments.
#[derive(Debug, Default)]
pub struct SecurityCacheCounters {
    lookups: AtomicU64,
    hint_hits: AtomicU64,
    probes: AtomicU64,
    adds: AtomicU64,
    add_duplicates: AtomicU64,
    removes: AtomicU64,
    grows: AtomicU64,
    match_queries: AtomicU64,
    match_hits: AtomicU64,
    chain_steps: AtomicU64,
    rebuild_reused: AtomicU64,
    rebuild_fresh: AtomicU64,
}

impl SecurityCacheCounters {
    pub fn snapshot(&self, len: usize, capacity: usize) -> SecurityCacheMetricsSnapshot {
        SecurityCacheMetricsSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            hint_hits: self.hint_hits.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
            adds: self.adds.load(Ordering::Relaxed),
            add_duplicates: self.add_duplicates.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            grows: self.grows.load(Ordering::Relaxed),
            match_queries: self.match_queries.load(Ordering::Relaxed),
            match_hits: self.match_hits.load(Ordering::Relaxed),
            chain_steps: self.chain_steps.load(Ordering::Relaxed),
            rebuild_reused: self.rebuild_reused.load(Ordering::Relaxed),
            rebuild_fresh: self.rebuild_fresh.load(Ordering::Relaxed),
            len,
            capacity,
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.lookups,
            &self.hint_hits,
            &self.probes,
            &self.adds,
            &self.add_duplicates,
            &self.removes,
            &self.grows,
            &self.match_queries,
            &self.match_hits,
            &self.chain_steps,
            &self.rebuild_reused,
            &self.rebuild_fresh,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn record_lookup(&self, probes: u64, hint_hit: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.probes.fetch_add(probes, Ordering::Relaxed);
        if hint_hit {
            self.hint_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_match(&self, steps: u64, hit: bool) {
        self.match_queries.fetch_add(1, Ordering::Relaxed);
        self.chain_steps.fetch_add(steps, Ordering::Relaxed);
        if hit {
            self.match_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn inc_add(&self) {
        self.adds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_add_duplicate(&self) {
        self.add_duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_grow(&self) {
        self.grows.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rebuild_reused(&self) {
        self.rebuild_reused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rebuild_fresh(&self) {
        self.rebuild_fresh.fetch_add(1, Ordering::Relaxed);
    }
}
