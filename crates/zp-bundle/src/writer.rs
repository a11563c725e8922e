//! Archive builder for reproducibility bundles.
//!
//! Creates ZIP archives whose members all live under the layout's root
//! folder. Output is reproducible: members are written in archive-path order
//! with fixed timestamps and permissions, so an unchanged tree produces a
//! byte-identical archive.

use crate::layout::{ArchiveEntry, BundleLayout, ResolveOptions, ResolvedBundle};
use crate::{BundleError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

/// Summary of a written archive.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Final archive location.
    pub path: PathBuf,
    /// Archive paths written, in order.
    pub members: Vec<String>,
    /// Optional targets that were absent.
    pub skipped_optional: Vec<String>,
    /// Sum of member sizes before compression.
    pub uncompressed_bytes: u64,
    /// Size of the archive file.
    pub archive_bytes: u64,
}

impl BuildReport {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Builds a bundle archive from a [`BundleLayout`].
pub struct ArchiveBuilder<'a> {
    layout: &'a BundleLayout,
    options: ResolveOptions,
}

impl<'a> ArchiveBuilder<'a> {
    pub fn new(layout: &'a BundleLayout) -> Self {
        Self {
            layout,
            options: ResolveOptions::default(),
        }
    }

    /// Include subtrees flagged as data.
    pub fn include_data(mut self, include: bool) -> Self {
        self.options.include_data = include;
        self
    }

    /// Resolve what would be written, failing on missing mandatory files.
    pub fn plan(&self, project_root: &Path) -> Result<ResolvedBundle> {
        let resolved = self.layout.resolve(project_root, self.options)?;
        resolved.require_complete()?;
        if resolved.is_empty() {
            return Err(BundleError::NothingGathered(project_root.to_path_buf()));
        }
        Ok(resolved)
    }

    /// Resolve the layout and write the archive to `out`.
    ///
    /// Nothing is created at `out` unless every member was written.
    pub fn build(&self, project_root: &Path, out: &Path) -> Result<BuildReport> {
        let resolved = self.plan(project_root)?;
        let uncompressed_bytes = write_archive(&resolved.entries, out)?;
        let archive_bytes = std::fs::metadata(out)
            .map_err(|e| BundleError::file_io(out, e))?
            .len();

        let mut members: Vec<String> = resolved
            .entries
            .iter()
            .map(|e| e.archive_path.clone())
            .collect();
        members.sort();
        members.dedup();

        info!(
            path = %out.display(),
            files = members.len(),
            bytes = uncompressed_bytes,
            compressed_bytes = archive_bytes,
            "Archive written"
        );

        Ok(BuildReport {
            path: out.to_path_buf(),
            members,
            skipped_optional: resolved.skipped_optional,
            uncompressed_bytes,
            archive_bytes,
        })
    }
}

fn member_options() -> FileOptions<'static, ()> {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644)
        .last_modified_time(DateTime::default())
}

/// Write `entries` into a deflate ZIP at `out`, returning the uncompressed
/// byte count.
///
/// Members are written in archive-path order; a repeated archive path keeps
/// its first source. The archive is assembled in a temporary file beside
/// `out` and renamed into place on success; on any error the temporary file
/// is removed and `out` is untouched.
pub fn write_archive(entries: &[ArchiveEntry], out: &Path) -> Result<u64> {
    let parent = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| BundleError::file_io(parent, e))?;

    let mut ordered: Vec<&ArchiveEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| a.archive_path.cmp(&b.archive_path));

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| BundleError::file_io(parent, e))?;
    let mut total = 0u64;
    {
        let mut zip = ZipWriter::new(tmp.as_file_mut());
        let options = member_options();
        let mut seen = BTreeSet::new();

        for entry in ordered {
            if !seen.insert(entry.archive_path.as_str()) {
                warn!(member = %entry.archive_path, "Duplicate archive path, keeping first source");
                continue;
            }
            let mut source = File::open(&entry.source_path)
                .map_err(|e| BundleError::file_io(&entry.source_path, e))?;
            zip.start_file(entry.archive_path.as_str(), options)?;
            let bytes = std::io::copy(&mut source, &mut zip)
                .map_err(|e| BundleError::file_io(&entry.source_path, e))?;
            total += bytes;
            debug!(member = %entry.archive_path, bytes, "Added file to archive");
        }

        zip.finish()?;
    }
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(out)
        .map_err(|e| BundleError::file_io(out, e.error))?;

    Ok(total)
}
