use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;
use seccache::cell::CellHandle;
use seccache::store::memory::{MemoryHive, sample_descriptor};

static INIT: Once = Once::new();

/// Routes `log` output of the cache through env_logger, once per test binary.
/// `RUST_LOG` overrides the default level.
pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("seccache", LevelFilter::Debug)
            .format_timestamp_millis()
            .is_test(true)
            .parse_default_env();

        let _ = builder.try_init();
    });
}

#[allow(dead_code)]
pub fn cell(raw: u32) -> CellHandle {
    CellHandle::new(raw)
}

/// Hive whose chain holds `count` cells at 0x20, 0x40, ... with descriptors
/// of varying length.
#[allow(dead_code)]
pub fn chained_hive(count: u32) -> MemoryHive {
    let mut hive = MemoryHive::new();
    for i in 1..=count {
        hive.push_security(cell(i * 0x20), sample_descriptor(i, 20 + (i as usize % 5) * 4));
    }
    hive
}
