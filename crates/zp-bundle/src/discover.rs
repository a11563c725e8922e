//! Deterministic directory walking with exclusion rules.
//!
//! Discovery output is sorted by the string form of each relative path and
//! de-duplicated, so two walks over an unchanged tree produce identical
//! sequences. Manifest and archive bytes depend on that order.

use crate::{BundleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// A file found on disk during discovery.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileRecord {
    /// Forward-slash path relative to the project root. Stable identity
    /// shared by manifests and archives.
    pub relative_path: String,
    /// Where the bytes live.
    pub absolute_path: PathBuf,
}

/// Name- and extension-based exclusion predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcludeRules {
    /// Directory names pruned wherever they appear (e.g. `__pycache__`).
    pub dir_names: BTreeSet<String>,
    /// Skip any file or directory whose name starts with a dot.
    pub skip_hidden: bool,
    /// Exact file names to skip.
    pub file_names: BTreeSet<String>,
    /// Filename suffixes to skip, matched case-insensitively (`.png`, `.synctex.gz`).
    pub extensions: Vec<String>,
}

impl ExcludeRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir_name(mut self, name: impl Into<String>) -> Self {
        self.dir_names.insert(name.into());
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_names.insert(name.into());
        self
    }

    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.push(ext.into());
        self
    }

    pub fn with_hidden_skipped(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Union of two rule sets.
    pub fn merged(&self, other: &ExcludeRules) -> ExcludeRules {
        let mut merged = self.clone();
        merged.dir_names.extend(other.dir_names.iter().cloned());
        merged.file_names.extend(other.file_names.iter().cloned());
        for ext in &other.extensions {
            if !merged.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                merged.extensions.push(ext.clone());
            }
        }
        merged.skip_hidden |= other.skip_hidden;
        merged
    }

    pub fn excludes_dir(&self, name: &str) -> bool {
        (self.skip_hidden && name.starts_with('.')) || self.dir_names.contains(name)
    }

    pub fn excludes_file(&self, name: &str) -> bool {
        if self.skip_hidden && name.starts_with('.') {
            return true;
        }
        if self.file_names.contains(name) {
            return true;
        }
        let lower = name.to_ascii_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_ascii_lowercase()))
    }

    /// Check a forward-slash relative path: every directory component and the
    /// final file name.
    pub fn excludes_relative(&self, relative: &str) -> bool {
        let mut parts: Vec<&str> = relative.split('/').filter(|p| !p.is_empty()).collect();
        let Some(file_name) = parts.pop() else {
            return true;
        };
        parts.iter().any(|dir| self.excludes_dir(dir)) || self.excludes_file(file_name)
    }
}

/// Render `path` relative to `root` with forward slashes.
pub fn relative_string(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Walk `root` (or only the given `scopes` beneath it) and return every file
/// the rules do not exclude, sorted and de-duplicated by relative path.
///
/// A scope that does not exist contributes nothing. Symlinks are followed;
/// dangling links and link cycles are skipped with a warning.
pub fn discover<S: AsRef<Path>>(
    root: &Path,
    scopes: &[S],
    rules: &ExcludeRules,
) -> Result<Vec<FileRecord>> {
    if !root.is_dir() {
        return Err(BundleError::file_io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "project root is not a directory"),
        ));
    }

    let mut found: BTreeMap<String, PathBuf> = BTreeMap::new();

    if scopes.is_empty() {
        walk(root, root, rules, &mut found)?;
    } else {
        for scope in scopes {
            let start = root.join(scope.as_ref());
            if start.is_dir() {
                walk(root, &start, rules, &mut found)?;
            } else if start.is_file() {
                if let Some(rel) = relative_string(root, &start) {
                    if !rules.excludes_relative(&rel) {
                        found.entry(rel).or_insert(start);
                    }
                }
            } else {
                debug!(scope = %start.display(), "Scope does not exist, skipping");
            }
        }
    }

    debug!(root = %root.display(), files = found.len(), "Discovery complete");

    Ok(found
        .into_iter()
        .map(|(relative_path, absolute_path)| FileRecord {
            relative_path,
            absolute_path,
        })
        .collect())
}

fn walk(
    root: &Path,
    dir: &Path,
    rules: &ExcludeRules,
    found: &mut BTreeMap<String, PathBuf>,
) -> Result<()> {
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let pruned = e.depth() > 0
                && e.file_type().is_dir()
                && rules.excludes_dir(&e.file_name().to_string_lossy());
            if pruned {
                trace!(dir = %e.path().display(), "Pruned directory");
            }
            !pruned
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                if let Some(path) = unfollowable_link(&err) {
                    warn!(path = %path.display(), error = %err, "Skipping unfollowable symlink");
                    continue;
                }
                let path = err
                    .path()
                    .map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                return Err(BundleError::file_io(path, source));
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(rel) = relative_string(root, entry.path()) else {
            continue;
        };
        if rules.excludes_relative(&rel) {
            trace!(file = %rel, "Excluded file");
            continue;
        }
        found.entry(rel).or_insert_with(|| entry.into_path());
    }
    Ok(())
}

/// The link behind a walk error that comes from a dangling symlink or a
/// symlink cycle.
fn unfollowable_link(err: &walkdir::Error) -> Option<&Path> {
    let path = err.path()?;
    if err.loop_ancestor().is_some() {
        return Some(path);
    }
    fs::symlink_metadata(path)
        .ok()
        .filter(|m| m.file_type().is_symlink())
        .map(|_| path)
}
