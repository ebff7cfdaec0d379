// ==============================================
// SECURITY CACHE SCENARIOS (integration)
// ==============================================
//
// End-to-end behavior of the cache against an in-memory hive: lookups,
// dedup, growth and failure atomicity.

mod common;

use common::{cell, initialize_logger};
use seccache::prelude::*;
use seccache::store::memory::sample_descriptor;

#[derive(Default)]
struct KeyNode {
    security: Option<SecurityRef>,
}

impl SecurityOwner for KeyNode {
    fn set_security(&mut self, security: Option<SecurityRef>) {
        self.security = security;
    }

    fn security(&self) -> Option<SecurityRef> {
        self.security
    }
}

#[test]
fn dedup_finds_existing_cell_for_identical_descriptor() {
    initialize_logger();
    let shared = sample_descriptor(42, 60);
    let mut hive = MemoryHive::new();
    hive.insert_loose(cell(10), shared.clone());
    hive.insert_loose(cell(20), shared.clone());
    hive.insert_loose(cell(30), sample_descriptor(43, 60));

    let mut cache = SecurityCache::new();
    for raw in [10, 20, 30] {
        cache.add(&hive, cell(raw)).unwrap();
    }

    let (found, entry) = cache
        .find_matching_descriptor(&shared, TypeTag::Stable)
        .expect("identical descriptor is cached");
    assert_eq!(found, cell(10));
    assert_eq!(entry.descriptor(), shared.as_slice());
    assert!(cache
        .find_matching_descriptor(&shared, TypeTag::Volatile)
        .is_none());
}

#[test]
fn key_nodes_resolve_through_weak_handles() {
    initialize_logger();
    let hive = common::chained_hive(8);
    let mut cache = SecurityCache::new();
    cache.rebuild(&hive).unwrap();

    let mut nodes: Vec<KeyNode> = (0..8).map(|_| KeyNode::default()).collect();
    for (i, node) in nodes.iter_mut().enumerate() {
        cache.assign_to_owner(node, cell((i as u32 + 1) * 0x20));
    }
    for (i, node) in nodes.iter().enumerate() {
        let entry = cache.entry(node.security().unwrap()).unwrap();
        assert_eq!(entry.cell(), cell((i as u32 + 1) * 0x20));
        assert_eq!(Some(entry.descriptor()), hive.descriptor(entry.cell()));
    }

    let mut unsecured = KeyNode::default();
    cache.assign_to_owner(&mut unsecured, CellHandle::NIL);
    assert!(unsecured.security().is_none());

    let err = cache.resolve_security(cell(0x1000)).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn failed_fetch_leaves_cache_unchanged() {
    initialize_logger();
    let mut hive = MemoryHive::new();
    hive.insert_loose(cell(0x20), sample_descriptor(1, 32));
    hive.insert_loose(cell(0x40), sample_descriptor(2, 32));
    let mut cache = SecurityCache::new();
    cache.add(&hive, cell(0x20)).unwrap();

    hive.set_unmappable(cell(0x40), true);
    let before: Vec<_> = cache.iter().map(|(c, e)| (c, e.descriptor().to_vec())).collect();
    let capacity = cache.capacity();
    assert_eq!(
        cache.add(&hive, cell(0x40)),
        Err(CacheError::FetchFailed { cell: cell(0x40) })
    );
    let after: Vec<_> = cache.iter().map(|(c, e)| (c, e.descriptor().to_vec())).collect();
    assert_eq!(before, after);
    assert_eq!(cache.capacity(), capacity);
    assert_eq!(hive.outstanding_mappings(), 0);
    cache.check_invariants().unwrap();
}

#[test]
fn failed_fetch_on_a_full_array_does_not_grow_it() {
    initialize_logger();
    let mut hive = MemoryHive::new();
    for raw in 1..=17u32 {
        hive.insert_loose(cell(raw * 0x20), sample_descriptor(raw, 24));
    }
    let mut cache = SecurityCache::new();
    for raw in 1..=16u32 {
        cache.add(&hive, cell(raw * 0x20)).unwrap();
    }
    assert_eq!(cache.capacity(), 16);

    hive.set_unmappable(cell(17 * 0x20), true);
    assert_eq!(
        cache.add(&hive, cell(17 * 0x20)),
        Err(CacheError::FetchFailed { cell: cell(17 * 0x20) })
    );
    assert_eq!(cache.capacity(), 16);
    assert_eq!(cache.len(), 16);

    hive.set_unmappable(cell(17 * 0x20), false);
    cache.add(&hive, cell(17 * 0x20)).unwrap();
    assert_eq!(cache.capacity(), 32);
    assert_eq!(hive.outstanding_mappings(), 0);
    cache.check_invariants().unwrap();
}

#[test]
fn every_fetch_is_released() {
    initialize_logger();
    let mut hive = common::chained_hive(40);
    let mut cache = SecurityCache::new();
    cache.rebuild(&hive).unwrap();
    for raw in (1..=40u32).step_by(3) {
        cache.remove(cell(raw * 0x20));
    }
    for raw in (1..=40u32).step_by(3) {
        cache.add(&hive, cell(raw * 0x20)).unwrap();
    }
    hive.set_descriptor(cell(0x20), sample_descriptor(99, 100));
    cache.rebuild(&hive).unwrap();

    assert!(hive.fetch_count() > 0);
    assert_eq!(hive.outstanding_mappings(), 0);
}

#[test]
fn capacity_only_drops_through_shrink_or_destroy() {
    initialize_logger();
    let mut hive = MemoryHive::new();
    for raw in 1..=20u32 {
        hive.insert_loose(cell(raw * 8), sample_descriptor(raw, 24));
    }
    let mut cache = SecurityCache::new();
    let mut last_capacity = 0;
    for raw in 1..=20u32 {
        cache.add(&hive, cell(raw * 8)).unwrap();
        assert!(cache.capacity() >= last_capacity);
        last_capacity = cache.capacity();
    }
    assert_eq!(last_capacity, 32);
    for raw in 1..=15u32 {
        cache.remove(cell(raw * 8));
        assert_eq!(cache.capacity(), 32);
    }
    assert!(cache.shrink_to_fit());
    assert_eq!(cache.capacity(), 5);
    cache.destroy_all();
    assert_eq!(cache.capacity(), 0);
    assert!(cache.is_empty());
}

#[test]
fn remap_follows_a_hive_save() {
    initialize_logger();
    let mut hive = MemoryHive::new();
    hive.insert_loose(cell(0x20), sample_descriptor(1, 24));
    hive.insert_loose(cell(0x40), sample_descriptor(2, 24));
    let volatile = CellHandle::with_tag(0x20, TypeTag::Volatile);
    hive.insert_loose(volatile, sample_descriptor(3, 24));
    let mut cache = SecurityCache::new();
    for c in [cell(0x20), cell(0x40), volatile] {
        cache.add(&hive, c).unwrap();
    }

    let mut remap = cache.build_remap_array().unwrap();
    for entry in remap.iter_mut().filter(|e| !e.is_assigned()) {
        entry.new_cell = CellHandle::new(0x2000 - entry.old_cell.raw());
    }
    cache.apply_remap(&remap).unwrap();

    let cells: Vec<_> = cache.iter().map(|(c, _)| c).collect();
    assert_eq!(cells, vec![volatile, cell(0x1fc0), cell(0x1fe0)]);
    assert_eq!(
        cache.get(cell(0x1fe0)).unwrap().descriptor(),
        sample_descriptor(1, 24).as_slice()
    );
    cache.check_invariants().unwrap();
}

#[cfg(feature = "metrics")]
#[test]
fn metrics_count_lookups_and_growth() {
    initialize_logger();
    let hive = common::chained_hive(20);
    let mut cache = SecurityCache::new();
    for raw in 1..=20u32 {
        cache.add(&hive, cell(raw * 0x20)).unwrap();
    }
    cache.add(&hive, cell(0x20)).unwrap();
    let _ = cache.find_matching_descriptor(&sample_descriptor(1, 24), TypeTag::Stable);

    let snapshot = cache.snapshot();
    assert_eq!(snapshot.adds, 20);
    assert_eq!(snapshot.add_duplicates, 1);
    assert_eq!(snapshot.grows, 2);
    assert_eq!(snapshot.match_queries, 1);
    assert_eq!(snapshot.len, 20);
    assert_eq!(snapshot.capacity, 32);

    cache.reset_metrics();
    assert_eq!(cache.snapshot().adds, 0);
}
