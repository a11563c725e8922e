//! Fuzz target for bundle layout files.
//!
//! Tests that YAML layout parsing and validation handle arbitrary input
//! without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;
use zp_bundle::BundleLayout;
use zp_config::load::parse_document;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(layout) = parse_document::<BundleLayout>(text, Path::new("zp-layout.yaml")) {
        let _ = layout.validate();
    }
});
