#![no_main]

use libfuzzer_sys::fuzz_target;
use seccache::cache::SecurityCache;
use seccache::cell::{CellHandle, TypeTag};
use seccache::store::memory::{MemoryHive, sample_descriptor};

// Fuzz arbitrary operation sequences on SecurityCache
//
// Tests random sequences of add, remove, find, match, shrink, rebuild and
// remap operations against a small hive.
fn cell_from(byte: u8) -> CellHandle {
    let tag = if byte & 0x80 != 0 {
        TypeTag::Volatile
    } else {
        TypeTag::Stable
    };
    CellHandle::with_tag(u32::from(byte & 0x3f) * 8, tag)
}

fuzz_target!(|data: &[u8]| {
    let mut hive = MemoryHive::new();
    for byte in 0..=u8::MAX {
        let cell = cell_from(byte);
        if byte & 0x40 == 0 {
            hive.push_security(cell, sample_descriptor(u32::from(byte % 7), 20 + usize::from(byte % 4)));
        }
    }

    let mut cache = SecurityCache::new();
    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 9;
        let cell = cell_from(data[idx + 1]);
        idx += 2;

        match op {
            0 | 1 => {
                // add
                cache.add(&hive, cell).unwrap();
                assert!(cache.contains(cell));
            }
            2 => {
                // remove
                let had = cache.contains(cell);
                assert_eq!(cache.remove(cell), had);
                assert!(!cache.contains(cell));
            }
            3 => {
                // find_matching_descriptor
                if let Some(bytes) = hive.descriptor(cell) {
                    let bytes = bytes.to_vec();
                    if let Some((found, entry)) = cache.find_matching_descriptor(&bytes, cell.type_tag()) {
                        assert_eq!(entry.descriptor(), bytes.as_slice());
                        assert_eq!(found.type_tag(), cell.type_tag());
                    }
                }
            }
            4 => {
                let _ = cache.shrink_to_fit();
            }
            5 => {
                // rebuild mirrors the chain
                cache.rebuild(&hive).unwrap();
                assert_eq!(cache.len(), hive.chain().len());
            }
            6 => {
                // mutate the hive between rebuilds
                hive.set_descriptor(cell, sample_descriptor(u32::from(data[idx - 1]), 20 + usize::from(data[idx - 1] % 9)));
            }
            7 => {
                // resolve_security
                match cache.resolve_security(cell) {
                    Ok(security) => {
                        let security = security.unwrap();
                        assert_eq!(cache.entry(security).unwrap().cell(), cell);
                    }
                    Err(err) => {
                        assert!(err.is_fatal());
                        assert!(!cache.contains(cell));
                    }
                }
            }
            8 => {
                // remap stable cells onto a disjoint range and back
                let mut remap = cache.build_remap_array().unwrap();
                for entry in remap.iter_mut().filter(|e| !e.is_assigned()) {
                    entry.new_cell = CellHandle::new(entry.old_cell.raw() + 0x1_0000);
                }
                cache.apply_remap(&remap).unwrap();
                let mut back = cache.build_remap_array().unwrap();
                for entry in back.iter_mut().filter(|e| !e.is_assigned()) {
                    entry.new_cell = CellHandle::new(entry.old_cell.raw() - 0x1_0000);
                }
                cache.apply_remap(&back).unwrap();
            }
            _ => unreachable!(),
        }

        cache.check_invariants().unwrap();
    }

    assert_eq!(hive.outstanding_mappings(), 0);
});
