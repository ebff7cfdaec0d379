// ==============================================
// SORT INVARIANT (property tests)
// ==============================================
//
// Random add/remove sequences over stable and volatile cells, checked after
// every step against a set model.

mod common;

use std::cmp::Ordering;
use std::collections::HashSet;

use proptest::prelude::*;
use seccache::prelude::*;
use seccache::store::memory::sample_descriptor;

const MAGNITUDE_MAX: u32 = 48;
const PROPTEST_CASES: u32 = 64;

#[derive(Debug, Clone, Copy)]
enum Op {
    Add(CellHandle),
    Remove(CellHandle),
}

fn cell_strategy() -> impl Strategy<Value = CellHandle> {
    (0..MAGNITUDE_MAX, any::<bool>()).prop_map(|(magnitude, volatile)| {
        let tag = if volatile {
            TypeTag::Volatile
        } else {
            TypeTag::Stable
        };
        CellHandle::with_tag(magnitude * 8, tag)
    })
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => cell_strategy().prop_map(Op::Add),
        1 => cell_strategy().prop_map(Op::Remove),
    ]
}

fn hive_with_every_cell() -> MemoryHive {
    let mut hive = MemoryHive::new();
    for magnitude in 0..MAGNITUDE_MAX {
        for tag in [TypeTag::Stable, TypeTag::Volatile] {
            let cell = CellHandle::with_tag(magnitude * 8, tag);
            // Few distinct descriptors, so chains hold duplicates.
            hive.insert_loose(cell, sample_descriptor(magnitude % 5, 20 + (magnitude % 3) as usize));
        }
    }
    hive
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn prop_backing_array_stays_sorted(ops in proptest::collection::vec(op_strategy(), 0..200)) {
        common::initialize_logger();
        let hive = hive_with_every_cell();
        let mut cache = SecurityCache::new();
        let mut model: HashSet<CellHandle> = HashSet::new();
        let mut last_capacity = 0;

        for op in ops {
            match op {
                Op::Add(cell) => {
                    cache.add(&hive, cell).unwrap();
                    model.insert(cell);
                }
                Op::Remove(cell) => {
                    prop_assert_eq!(cache.remove(cell), model.remove(&cell));
                }
            }

            let cells: Vec<_> = cache.iter().map(|(cell, _)| cell).collect();
            for pair in cells.windows(2) {
                prop_assert_eq!(compare_cells(pair[0], pair[1]), Ordering::Less);
            }
            prop_assert_eq!(cells.len(), model.len());
            prop_assert!(cells.iter().all(|cell| model.contains(cell)));
            prop_assert!(cache.capacity() >= last_capacity);
            last_capacity = cache.capacity();
            prop_assert!(cache.check_invariants().is_ok());
        }

        for cell in &model {
            let index = cache.find_index(*cell);
            prop_assert!(index.is_ok());
            let descriptor = hive.descriptor(*cell).unwrap();
            let (found, _) = cache.find_matching_descriptor(descriptor, cell.type_tag()).unwrap();
            prop_assert_eq!(found.type_tag(), cell.type_tag());
        }
        prop_assert_eq!(hive.outstanding_mappings(), 0);
    }

    #[test]
    fn prop_add_is_idempotent(cells in proptest::collection::vec(cell_strategy(), 1..64)) {
        let hive = hive_with_every_cell();
        let mut cache = SecurityCache::new();
        for cell in &cells {
            cache.add(&hive, *cell).unwrap();
        }
        let len = cache.len();
        let buckets: Vec<_> = (0..SECURITY_HASH_BUCKETS).map(|b| cache.bucket_len(b)).collect();
        for cell in &cells {
            cache.add(&hive, *cell).unwrap();
        }
        prop_assert_eq!(cache.len(), len);
        let again: Vec<_> = (0..SECURITY_HASH_BUCKETS).map(|b| cache.bucket_len(b)).collect();
        prop_assert_eq!(buckets, again);
    }

    #[test]
    fn prop_conv_key_ignores_trailing_partial_word(
        bytes in proptest::collection::vec(any::<u8>(), 0..64),
        extra in proptest::collection::vec(any::<u8>(), 1..4),
    ) {
        let whole = bytes.len() / 4 * 4;
        let mut extended = bytes[..whole].to_vec();
        extended.extend_from_slice(&extra);
        prop_assert_eq!(conv_key(&bytes[..whole]), conv_key(&extended));
        prop_assert_eq!(conv_key(&bytes), conv_key(&bytes));
    }
}
