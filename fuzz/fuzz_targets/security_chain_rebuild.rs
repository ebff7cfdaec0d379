#![no_main]

use libfuzzer_sys::fuzz_target;
use seccache::cache::SecurityCache;
use seccache::cell::CellHandle;
use seccache::store::memory::{MemoryHive, sample_descriptor};

// Fuzz rebuilds over corrupted security chains
//
// Scribbles over links, validity and mappability of a chained hive, then
// checks that a rebuild either mirrors the chain or fails leaving a
// consistent cache.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let count = u32::from(data[0] % 32) + 1;
    let mut hive = MemoryHive::new();
    for i in 1..=count {
        hive.push_security(CellHandle::new(i * 0x20), sample_descriptor(i % 6, 20 + (i as usize % 3) * 8));
    }

    let mut cache = SecurityCache::new();
    cache.rebuild(&hive).unwrap();

    let pick = |byte: u8| CellHandle::new((u32::from(byte) % (count + 1)) * 0x20);
    for chunk in data[1..].chunks_exact(3) {
        let cell = pick(chunk[1]);
        let other = pick(chunk[2]);
        match chunk[0] % 6 {
            0 => hive.set_back_link(cell, other),
            1 => hive.set_forward_link(cell, other),
            2 => hive.set_unmappable(cell, chunk[2] & 1 == 0),
            3 => hive.set_unreadable_links(cell, chunk[2] & 1 == 0),
            4 => {
                hive.set_descriptor(cell, sample_descriptor(u32::from(chunk[2]), 16 + usize::from(chunk[2] % 24)));
            }
            _ => {
                hive.remove_security(cell);
            }
        }

        match cache.rebuild(&hive) {
            Ok(()) => {
                for c in hive.chain() {
                    assert_eq!(cache.get(c).map(|e| e.descriptor()), hive.descriptor(c));
                }
            }
            Err(err) => assert!(!err.is_fatal()),
        }
        cache.check_invariants().unwrap();
        assert_eq!(hive.outstanding_mappings(), 0);
    }
});
