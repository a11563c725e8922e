//! Fuzz target for archive verification.
//!
//! Archives handed to `zp verify` may come from anywhere; malformed ZIP data
//! must surface as an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use zp_bundle::{ArchiveVerifier, ChecksumManifest};

fuzz_target!(|data: &[u8]| {
    let manifest = ChecksumManifest::parse(
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855  main.pdf\n",
    );
    let verifier = ArchiveVerifier::new(&manifest, "plr-prl");
    let _ = verifier.verify_reader(Cursor::new(data));
});
