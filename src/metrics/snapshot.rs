/// Point-in-time view of a [`SecurityCache`](crate::cache::SecurityCache)'s counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SecurityCacheMetricsSnapshot {
    pub lookups: u64,
    pub hint_hits: u64, // lookups answered at the hinted position
    pub probes: u64,    // comparisons across all lookups

    pub adds: u64,
    pub add_duplicates: u64,
    pub removes: u64,
    pub grows: u64,

    pub match_queries: u64,
    pub match_hits: u64,
    pub chain_steps: u64, // entries visited by content lookups

    pub rebuild_reused: u64,
    pub rebuild_fresh: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub capacity: usize,
}

impl SecurityCacheMetricsSnapshot {
    /// Average comparisons per lookup.
    pub fn probes_per_lookup(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.probes as f64 / self.lookups as f64
        }
    }

    /// Fraction of content lookups that found a match.
    pub fn match_hit_rate(&self) -> f64 {
        if self.match_queries == 0 {
            0.0
        } else {
            self.match_hits as f64 / self.match_queries as f64
        }
    }
}
