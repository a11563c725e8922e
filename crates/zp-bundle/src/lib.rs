//! Checksum manifests and reproducible archives for research bundles.
//!
//! This crate covers the packaging half of a paper's reproducibility bundle:
//!
//! - [`discover`]: deterministic directory walks with exclusion rules
//! - [`hash`]: streaming SHA-256 digests
//! - [`manifest`]: the `<digest>  <path>` checksum manifest format
//! - [`layout`]: which files belong in the bundle, and where
//! - [`writer`]: ZIP archive construction under a single root folder
//! - [`reader`]: verification of archives against manifests
//!
//! # Example
//!
//! ```no_run
//! use zp_bundle::{ArchiveBuilder, ArchiveVerifier, BundleLayout, ChecksumManifest};
//! use std::path::Path;
//!
//! let layout = BundleLayout::default();
//! let root = Path::new(".");
//!
//! // Build an archive
//! let report = ArchiveBuilder::new(&layout)
//!     .build(root, Path::new("dist/plr_zenodo_abc123.zip"))
//!     .unwrap();
//!
//! // Verify it against the published checksums
//! let manifest = ChecksumManifest::load(Path::new("reports/checksums_SHA256.txt")).unwrap();
//! let verdict = ArchiveVerifier::new(&manifest, &layout.root_folder).verify(&report.path);
//! assert!(verdict.passed());
//! ```

pub mod discover;
pub mod error;
pub mod hash;
pub mod layout;
pub mod manifest;
pub mod reader;
pub mod writer;

pub use discover::{discover, ExcludeRules, FileRecord};
pub use error::{BundleError, Result};
pub use hash::{sha256_bytes, sha256_file, sha256_reader, DEFAULT_CHUNK_SIZE};
pub use layout::{
    ArchiveEntry, BundleLayout, EntryKind, OptionalFile, PrefixRule, ResolveOptions,
    ResolvedBundle, Subtree, DEFAULT_ROOT_FOLDER,
};
pub use manifest::{
    default_header, ChecksumManifest, ManifestEntry, MergeConflict, DATA_MANIFEST_FILE_NAME,
    MANIFEST_FILE_NAME,
};
pub use reader::{ArchiveOutcome, ArchiveReport, ArchiveVerifier, EntryCheck, EntryStatus, VerificationSummary};
pub use writer::{write_archive, ArchiveBuilder, BuildReport};
