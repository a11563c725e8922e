//! Archive verification against checksum manifests.
//!
//! For every manifest entry the verifier looks up `root_folder/relative_path`
//! inside the archive, streams the member through SHA-256 and compares. The
//! scan never stops at the first problem: each entry is reported and the
//! aggregate verdict comes last. Archives are opened read-only.

use crate::hash::{sha256_reader, DEFAULT_CHUNK_SIZE};
use crate::manifest::ChecksumManifest;
use crate::{BundleError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// Result of checking one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EntryStatus {
    /// Member present, digest matches.
    Ok,
    /// Member present, digest differs.
    Mismatch { expected: String, actual: String },
    /// No member at the expected path.
    Missing,
    /// Member present but could not be read back (bad CRC, truncated data).
    Corrupt { reason: String },
}

/// One checked manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryCheck {
    pub archive_path: String,
    #[serde(flatten)]
    pub status: EntryStatus,
}

impl EntryCheck {
    pub fn passed(&self) -> bool {
        self.status == EntryStatus::Ok
    }
}

/// What happened when an archive was checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ArchiveOutcome {
    /// The archive file does not exist.
    NotFound,
    /// The file exists but is not a readable ZIP.
    Unreadable { reason: String },
    /// Every manifest entry was checked.
    Checked { entries: Vec<EntryCheck> },
}

/// Verification result for one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub archive: PathBuf,
    #[serde(flatten)]
    pub outcome: ArchiveOutcome,
}

impl ArchiveReport {
    pub fn passed(&self) -> bool {
        match &self.outcome {
            ArchiveOutcome::Checked { entries } => entries.iter().all(EntryCheck::passed),
            _ => false,
        }
    }

    pub fn entries(&self) -> &[EntryCheck] {
        match &self.outcome {
            ArchiveOutcome::Checked { entries } => entries,
            _ => &[],
        }
    }

    pub fn verified_count(&self) -> usize {
        self.entries().iter().filter(|e| e.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries().iter().filter(|e| !e.passed()).count()
    }
}

/// Verification results for several archives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationSummary {
    pub archives: Vec<ArchiveReport>,
}

impl VerificationSummary {
    /// True only if there was at least one archive and every archive passed.
    pub fn all_passed(&self) -> bool {
        !self.archives.is_empty() && self.archives.iter().all(ArchiveReport::passed)
    }

    pub fn failed_archives(&self) -> usize {
        self.archives.iter().filter(|a| !a.passed()).count()
    }
}

/// Checks archives against a (possibly merged) manifest.
pub struct ArchiveVerifier<'a> {
    manifest: &'a ChecksumManifest,
    root_folder: &'a str,
}

impl<'a> ArchiveVerifier<'a> {
    pub fn new(manifest: &'a ChecksumManifest, root_folder: &'a str) -> Self {
        Self {
            manifest,
            root_folder,
        }
    }

    /// Archive member name for a manifest path.
    pub fn member_name(&self, relative_path: &str) -> String {
        format!("{}/{}", self.root_folder, relative_path)
    }

    /// Verify one archive file. Problems opening it become the report's
    /// outcome rather than an error.
    pub fn verify(&self, archive: &Path) -> ArchiveReport {
        let outcome = if !archive.is_file() {
            warn!(archive = %archive.display(), "Archive not found");
            ArchiveOutcome::NotFound
        } else {
            match File::open(archive)
                .map_err(|e| BundleError::file_io(archive, e))
                .and_then(|file| self.verify_reader(file))
            {
                Ok(entries) => ArchiveOutcome::Checked { entries },
                Err(e) => {
                    warn!(archive = %archive.display(), error = %e, "Archive unreadable");
                    ArchiveOutcome::Unreadable {
                        reason: e.to_string(),
                    }
                }
            }
        };

        let report = ArchiveReport {
            archive: archive.to_path_buf(),
            outcome,
        };
        info!(
            archive = %archive.display(),
            passed = report.passed(),
            verified = report.verified_count(),
            failed = report.failed_count(),
            "Archive verified"
        );
        report
    }

    /// Verify every archive in order.
    pub fn verify_all<P: AsRef<Path>>(&self, archives: &[P]) -> VerificationSummary {
        VerificationSummary {
            archives: archives.iter().map(|a| self.verify(a.as_ref())).collect(),
        }
    }

    /// Check every manifest entry against an open ZIP stream.
    pub fn verify_reader<R: Read + Seek>(&self, reader: R) -> Result<Vec<EntryCheck>> {
        let mut archive = ZipArchive::new(reader)?;
        let mut checks = Vec::with_capacity(self.manifest.len());

        for (relative, expected) in self.manifest.iter() {
            let name = self.member_name(relative);
            let status = match archive.by_name(&name) {
                Ok(member) => match sha256_reader(member, DEFAULT_CHUNK_SIZE) {
                    Ok(actual) if actual.eq_ignore_ascii_case(expected) => EntryStatus::Ok,
                    Ok(actual) => EntryStatus::Mismatch {
                        expected: expected.to_string(),
                        actual,
                    },
                    Err(e) => {
                        warn!(member = %name, error = %e, "Member unreadable");
                        EntryStatus::Corrupt {
                            reason: e.to_string(),
                        }
                    }
                },
                Err(ZipError::FileNotFound) => EntryStatus::Missing,
                Err(e) => {
                    warn!(member = %name, error = %e, "Member unreadable");
                    EntryStatus::Corrupt {
                        reason: e.to_string(),
                    }
                }
            };
            debug!(member = %name, status = ?status, "Checked entry");
            checks.push(EntryCheck {
                archive_path: name,
                status,
            });
        }

        Ok(checks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256_bytes;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options: FileOptions<'_, ()> = FileOptions::default();
            for (name, data) in members {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    fn manifest(entries: &[(&str, &[u8])]) -> ChecksumManifest {
        let mut m = ChecksumManifest::new();
        for (path, data) in entries {
            m.insert(*path, sha256_bytes(data));
        }
        m
    }

    #[test]
    fn test_matching_entry_ok() {
        let m = manifest(&[("reports/x.txt", b"hello")]);
        let bytes = zip_bytes(&[("plr-prl/reports/x.txt", b"hello")]);

        let checks = ArchiveVerifier::new(&m, "plr-prl")
            .verify_reader(Cursor::new(bytes))
            .unwrap();
        assert_eq!(
            checks,
            vec![EntryCheck {
                archive_path: "plr-prl/reports/x.txt".to_string(),
                status: EntryStatus::Ok,
            }]
        );
    }

    #[test]
    fn test_mismatch_does_not_stop_scan() {
        let m = manifest(&[("a.txt", b"expected"), ("b.txt", b"bee"), ("c.txt", b"sea")]);
        let bytes = zip_bytes(&[
            ("plr-prl/a.txt", b"tampered"),
            ("plr-prl/b.txt", b"bee"),
        ]);

        let checks = ArchiveVerifier::new(&m, "plr-prl")
            .verify_reader(Cursor::new(bytes))
            .unwrap();

        assert_eq!(checks.len(), 3);
        assert!(matches!(checks[0].status, EntryStatus::Mismatch { .. }));
        assert_eq!(checks[1].status, EntryStatus::Ok);
        assert_eq!(checks[2].status, EntryStatus::Missing);
    }

    #[test]
    fn test_corrupt_member_is_reported_and_scan_continues() {
        let a: &[u8] = b"alpha member payload";
        let b: &[u8] = b"bravo";
        let m = manifest(&[("a.txt", a), ("b.txt", b)]);

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let options: FileOptions<'_, ()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file("plr-prl/a.txt", options).unwrap();
            zip.write_all(a).unwrap();
            zip.start_file("plr-prl/b.txt", options).unwrap();
            zip.write_all(b).unwrap();
            zip.finish().unwrap();
        }
        let mut bytes = buffer.into_inner();
        let at = bytes.windows(a.len()).position(|w| w == a).unwrap();
        bytes[at] ^= 0xff;

        let checks = ArchiveVerifier::new(&m, "plr-prl")
            .verify_reader(Cursor::new(bytes))
            .unwrap();

        assert_eq!(checks.len(), 2);
        assert!(matches!(checks[0].status, EntryStatus::Corrupt { .. }));
        assert!(!checks[0].passed());
        assert_eq!(checks[1].status, EntryStatus::Ok);
    }

    #[test]
    fn test_wrong_root_folder_is_missing() {
        let m = manifest(&[("a.txt", b"a")]);
        let bytes = zip_bytes(&[("other/a.txt", b"a")]);
        let checks = ArchiveVerifier::new(&m, "plr-prl")
            .verify_reader(Cursor::new(bytes))
            .unwrap();
        assert_eq!(checks[0].status, EntryStatus::Missing);
    }

    #[test]
    fn test_uppercase_manifest_digest_accepted() {
        let mut m = ChecksumManifest::new();
        m.insert("a.txt", sha256_bytes(b"a").to_uppercase());
        let bytes = zip_bytes(&[("plr-prl/a.txt", b"a")]);
        let checks = ArchiveVerifier::new(&m, "plr-prl")
            .verify_reader(Cursor::new(bytes))
            .unwrap();
        assert!(checks[0].passed());
    }

    #[test]
    fn test_verify_distinguishes_not_found_and_unreadable() {
        let dir = TempDir::new().unwrap();
        let m = manifest(&[("a.txt", b"a")]);
        let verifier = ArchiveVerifier::new(&m, "plr-prl");

        let missing = verifier.verify(&dir.path().join("absent.zip"));
        assert_eq!(missing.outcome, ArchiveOutcome::NotFound);
        assert!(!missing.passed());

        let garbage = dir.path().join("garbage.zip");
        std::fs::write(&garbage, b"not a zip").unwrap();
        let unreadable = verifier.verify(&garbage);
        assert!(matches!(unreadable.outcome, ArchiveOutcome::Unreadable { .. }));
        assert!(!unreadable.passed());
    }

    #[test]
    fn test_verify_all_requires_every_archive() {
        let dir = TempDir::new().unwrap();
        let m = manifest(&[("a.txt", b"a")]);
        let good = dir.path().join("good.zip");
        let bad = dir.path().join("bad.zip");
        std::fs::write(&good, zip_bytes(&[("plr-prl/a.txt", b"a")])).unwrap();
        std::fs::write(&bad, zip_bytes(&[("plr-prl/a.txt", b"b")])).unwrap();

        let verifier = ArchiveVerifier::new(&m, "plr-prl");
        assert!(verifier.verify_all(&[&good]).all_passed());

        let summary = verifier.verify_all(&[&good, &bad]);
        assert!(!summary.all_passed());
        assert_eq!(summary.failed_archives(), 1);
        assert_eq!(summary.archives[1].failed_count(), 1);
        assert_eq!(summary.archives[0].verified_count(), 1);
    }

    #[test]
    fn test_verify_does_not_modify_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.zip");
        let bytes = zip_bytes(&[("plr-prl/a.txt", b"a")]);
        std::fs::write(&path, &bytes).unwrap();

        let m = manifest(&[("a.txt", b"a"), ("b.txt", b"b")]);
        ArchiveVerifier::new(&m, "plr-prl").verify(&path);
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_empty_summary_fails() {
        assert!(!VerificationSummary::default().all_passed());
    }

    #[test]
    fn test_report_serializes() {
        let report = ArchiveReport {
            archive: PathBuf::from("dist/a.zip"),
            outcome: ArchiveOutcome::Checked {
                entries: vec![EntryCheck {
                    archive_path: "plr-prl/a.txt".to_string(),
                    status: EntryStatus::Missing,
                }],
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "checked");
        assert_eq!(json["entries"][0]["status"], "missing");
    }
}
