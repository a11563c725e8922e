//! Checksum manifest codec.
//!
//! A manifest maps bundle-relative paths to SHA-256 digests, one entry per
//! line in the `sha256sum` layout:
//!
//! ```text
//! # SHA256 checksums (relative to plr-prl/)
//! 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08  reports/summary.csv
//! ```
//!
//! Blank lines and lines starting with `#` are ignored on read. The first
//! whitespace-separated token is the digest and the last is the path, so
//! paths containing whitespace are not representable.

use crate::hash::sha256_file;
use crate::layout::ArchiveEntry;
use crate::{BundleError, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Manifest written for the code/paper bundle.
pub const MANIFEST_FILE_NAME: &str = "checksums_SHA256.txt";

/// Manifest written when raw data is included.
pub const DATA_MANIFEST_FILE_NAME: &str = "checksums_SHA256_data.txt";

/// Header comment emitted at the top of a written manifest.
pub fn default_header(root_folder: &str) -> String {
    format!("SHA256 checksums (relative to {root_folder}/)")
}

/// One manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub relative_path: String,
    pub digest: String,
}

impl ManifestEntry {
    pub fn new(relative_path: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            digest: digest.into(),
        }
    }
}

/// Same path, different digests across merged manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub relative_path: String,
    /// Digest that was overwritten.
    pub previous: String,
    /// Digest that won.
    pub replacement: String,
}

/// Path → digest mapping, iterated in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: BTreeMap<String, String>,
}

impl ChecksumManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the digest it replaced.
    pub fn insert(
        &mut self,
        relative_path: impl Into<String>,
        digest: impl Into<String>,
    ) -> Option<String> {
        self.entries.insert(relative_path.into(), digest.into())
    }

    pub fn get(&self, relative_path: &str) -> Option<&str> {
        self.entries.get(relative_path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(relative_path, digest)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, d)| (p.as_str(), d.as_str()))
    }

    pub fn entries(&self) -> Vec<ManifestEntry> {
        self.iter().map(|(p, d)| ManifestEntry::new(p, d)).collect()
    }

    /// Hash every entry's source file. Any unreadable source is an error.
    pub fn from_entries(entries: &[ArchiveEntry]) -> Result<Self> {
        let mut manifest = Self::new();
        for entry in entries {
            let digest = sha256_file(&entry.source_path)?;
            debug!(path = %entry.relative_path, "Hashed file");
            manifest.insert(entry.relative_path.clone(), digest);
        }
        Ok(manifest)
    }

    /// Parse manifest text. Lines with fewer than two tokens are skipped.
    pub fn parse(text: &str) -> Self {
        let mut manifest = Self::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 2 {
                warn!(line = idx + 1, content = %line, "Skipping malformed manifest line");
                continue;
            }
            manifest.insert(tokens[tokens.len() - 1], tokens[0]);
        }
        manifest
    }

    /// Render as manifest text, entries sorted by path.
    pub fn render(&self, header: Option<&str>) -> String {
        let mut out = String::new();
        if let Some(header) = header {
            out.push_str("# ");
            out.push_str(header);
            out.push('\n');
        }
        for (path, digest) in self.iter() {
            out.push_str(digest);
            out.push_str("  ");
            out.push_str(path);
            out.push('\n');
        }
        out
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BundleError::file_io(path, e))?;
        let manifest = Self::parse(&text);
        debug!(path = %path.display(), entries = manifest.len(), "Loaded manifest");
        Ok(manifest)
    }

    /// Load several manifests and merge them in order; later files win.
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<(Self, Vec<MergeConflict>)> {
        let mut combined = Self::new();
        let mut conflicts = Vec::new();
        for path in paths {
            let next = Self::load(path.as_ref())?;
            conflicts.extend(combined.merge(next));
        }
        Ok((combined, conflicts))
    }

    /// Merge another manifest into this one. Entries from `other` overwrite;
    /// overwrites with a different digest are returned.
    pub fn merge(&mut self, other: ChecksumManifest) -> Vec<MergeConflict> {
        let mut conflicts = Vec::new();
        for (path, digest) in other.entries {
            if let Some(previous) = self.entries.insert(path.clone(), digest.clone()) {
                if previous != digest {
                    warn!(path = %path, "Manifest entry overridden by a later manifest");
                    conflicts.push(MergeConflict {
                        relative_path: path,
                        previous,
                        replacement: digest,
                    });
                }
            }
        }
        conflicts
    }

    /// Write the manifest. The target is replaced only once the full content
    /// is on disk.
    pub fn write(&self, path: &Path, header: Option<&str>) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| BundleError::file_io(parent, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| BundleError::file_io(parent, e))?;
        tmp.write_all(self.render(header).as_bytes())?;
        tmp.flush()?;
        tmp.persist(path)
            .map_err(|e| BundleError::file_io(path, e.error))?;

        info!(path = %path.display(), entries = self.len(), "Manifest written");
        Ok(())
    }
}

impl FromIterator<ManifestEntry> for ChecksumManifest {
    fn from_iter<I: IntoIterator<Item = ManifestEntry>>(iter: I) -> Self {
        let mut manifest = Self::new();
        for entry in iter {
            manifest.insert(entry.relative_path, entry.digest);
        }
        manifest
    }
}
