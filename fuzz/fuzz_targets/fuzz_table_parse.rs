//! Fuzz target for dataset table parsing and statistics.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;
use zp_stats::table::parse_table;
use zp_stats::DatasetStats;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let Ok(columns) = parse_table(&text, Path::new("fuzz.csv")) {
        let stats = DatasetStats::compute(&columns);
        assert_eq!(stats.n, columns.len());
    }
});
