//! Fuzz target for checksum manifest parsing.
//!
//! Parsing arbitrary text must never panic, and rendering a parsed manifest
//! must parse back to the same entries.

#![no_main]

use libfuzzer_sys::fuzz_target;
use zp_bundle::ChecksumManifest;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let manifest = ChecksumManifest::parse(text);
    let reparsed = ChecksumManifest::parse(&manifest.render(None));
    assert_eq!(manifest.entries(), reparsed.entries());
});
