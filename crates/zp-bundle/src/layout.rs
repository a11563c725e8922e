//! Declarative bundle layout.
//!
//! A [`BundleLayout`] says which files make up a reproducibility bundle:
//! mandatory single files, optional single files with fallback locations,
//! root-level prefix matches such as `README*`, and whole directory subtrees
//! with their own exclusions. Resolving a layout against a project root
//! yields the exact list of [`ArchiveEntry`] values that both the manifest
//! writer and the archive builder consume, so the two artifacts always agree.

use crate::discover::{discover, relative_string, ExcludeRules};
use crate::manifest::{DATA_MANIFEST_FILE_NAME, MANIFEST_FILE_NAME};
use crate::{BundleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Top-level folder every archive member lives under.
pub const DEFAULT_ROOT_FOLDER: &str = "plr-prl";

/// A single file that may live in more than one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalFile {
    /// Bundle-relative path the file is stored under.
    pub target: String,
    /// Project-relative locations tried in order; empty means `[target]`.
    #[serde(default)]
    pub candidates: Vec<String>,
}

impl OptionalFile {
    /// Optional file stored under its own path.
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            target: path.into(),
            candidates: Vec::new(),
        }
    }

    /// Optional file with an ordered fallback list.
    pub fn with_fallbacks(target: impl Into<String>, candidates: &[&str]) -> Self {
        Self {
            target: target.into(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn candidate_paths(&self) -> Vec<&str> {
        if self.candidates.is_empty() {
            vec![self.target.as_str()]
        } else {
            self.candidates.iter().map(String::as_str).collect()
        }
    }
}

/// Root-level files whose name starts with `prefix` (e.g. `README*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRule {
    pub prefix: String,
    /// Exact names that match the prefix but are left out.
    #[serde(default)]
    pub except: Vec<String>,
}

/// A directory included wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtree {
    /// Project-relative directory.
    pub path: String,
    /// Extra suffixes excluded inside this subtree only.
    #[serde(default)]
    pub exclude_extensions: Vec<String>,
    /// Only included when data inclusion is requested.
    #[serde(default)]
    pub data: bool,
}

impl Subtree {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            exclude_extensions: Vec::new(),
            data: false,
        }
    }

    pub fn excluding(mut self, extensions: &[&str]) -> Self {
        self.exclude_extensions
            .extend(extensions.iter().map(|e| e.to_string()));
        self
    }

    pub fn data_only(mut self) -> Self {
        self.data = true;
        self
    }
}

/// Bundle contents declaration. Immutable once built; pass it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleLayout {
    /// Canonical top-level folder inside the archive.
    pub root_folder: String,
    /// Files that must exist; their absence aborts archive construction.
    pub mandatory: Vec<String>,
    /// Files included when present.
    pub optional: Vec<OptionalFile>,
    /// Root-level prefix matches.
    pub prefixed: Vec<PrefixRule>,
    /// Directory subtrees.
    pub subtrees: Vec<Subtree>,
    /// Exclusions applied inside every subtree.
    pub exclude: ExcludeRules,
    /// Project-relative directory holding checksum manifests.
    pub manifest_dir: String,
}

impl Default for BundleLayout {
    fn default() -> Self {
        Self {
            root_folder: DEFAULT_ROOT_FOLDER.to_string(),
            mandatory: vec!["main.pdf".to_string(), "supplemental.pdf".to_string()],
            optional: vec![
                OptionalFile::at("manifest.yaml"),
                OptionalFile::at("Makefile"),
                OptionalFile::at("latexmkrc"),
                OptionalFile::at("plr.bib"),
                OptionalFile::with_fallbacks("CITATION.cff", &["dist/CITATION.cff", "CITATION.cff"]),
                OptionalFile::with_fallbacks("zenodo.json", &["dist/zenodo.json"]),
                OptionalFile::with_fallbacks("README_packaging.md", &["dist/README_packaging.md"]),
                OptionalFile::with_fallbacks("FILE_LISTING.txt", &["dist/FILE_LISTING.txt"]),
            ],
            prefixed: vec![PrefixRule {
                prefix: "README".to_string(),
                except: vec!["README_packaging.md".to_string()],
            }],
            subtrees: vec![
                Subtree::new("reports"),
                Subtree::new("scripts"),
                Subtree::new("figs").excluding(&[".png", ".jpg", ".jpeg"]),
                Subtree::new("data").data_only(),
            ],
            exclude: ExcludeRules::new()
                .with_hidden_skipped(true)
                .with_dir_name("__pycache__")
                .with_dir_name("dist")
                .with_file_name(".DS_Store")
                .with_extension(".aux")
                .with_extension(".log")
                .with_extension(".out")
                .with_extension(".toc")
                .with_extension(".synctex")
                .with_extension(".synctex.gz")
                .with_extension(".tmp"),
            manifest_dir: "reports".to_string(),
        }
    }
}

/// Options applied when resolving a layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Include subtrees flagged `data`.
    pub include_data: bool,
}

/// Why a file is in the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Mandatory,
    Optional,
    Prefixed,
    Subtree,
}

/// One resolved archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Bundle-relative path, the manifest key.
    pub relative_path: String,
    /// `root_folder/relative_path`.
    pub archive_path: String,
    /// File contributing the bytes.
    pub source_path: PathBuf,
    pub kind: EntryKind,
}

/// Result of resolving a layout against a project tree.
#[derive(Debug, Clone, Default)]
pub struct ResolvedBundle {
    /// Members sorted by relative path.
    pub entries: Vec<ArchiveEntry>,
    /// Mandatory files that were not found.
    pub missing_mandatory: Vec<String>,
    /// Optional targets with no existing candidate.
    pub skipped_optional: Vec<String>,
}

impl ResolvedBundle {
    /// Fail if any mandatory file is absent.
    pub fn require_complete(&self) -> Result<()> {
        if self.missing_mandatory.is_empty() {
            Ok(())
        } else {
            Err(BundleError::MissingMandatory(self.missing_mandatory.clone()))
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries whose file name matches one of `names`.
    pub fn without_file_names(mut self, names: &[&str]) -> Self {
        self.entries.retain(|e| {
            let name = e.relative_path.rsplit('/').next().unwrap_or(&e.relative_path);
            !names.contains(&name)
        });
        self
    }

    /// Drop the entry read from `source`, if any.
    pub fn without_source(mut self, source: &Path) -> Self {
        self.entries.retain(|e| e.source_path.as_path() != source);
        self
    }
}

impl BundleLayout {
    /// Archive path for a bundle-relative path.
    pub fn archive_path(&self, relative: &str) -> String {
        format!("{}/{}", self.root_folder, relative)
    }

    /// Default manifest location for the given data mode.
    pub fn manifest_path(&self, project_root: &Path, include_data: bool) -> PathBuf {
        let name = if include_data {
            DATA_MANIFEST_FILE_NAME
        } else {
            MANIFEST_FILE_NAME
        };
        project_root.join(&self.manifest_dir).join(name)
    }

    /// Manifest files that exist under the project, in load order.
    pub fn existing_manifests(&self, project_root: &Path) -> Vec<PathBuf> {
        [false, true]
            .into_iter()
            .map(|data| self.manifest_path(project_root, data))
            .filter(|p| p.is_file())
            .collect()
    }

    /// File names of manifests; never listed inside a manifest.
    pub fn manifest_file_names() -> [&'static str; 2] {
        [MANIFEST_FILE_NAME, DATA_MANIFEST_FILE_NAME]
    }

    /// Exclusions in force inside `subtree`.
    pub fn subtree_rules(&self, subtree: &Subtree) -> ExcludeRules {
        let mut rules = self.exclude.clone();
        for ext in &subtree.exclude_extensions {
            rules = rules.with_extension(ext.clone());
        }
        rules
    }

    /// Reject layouts whose paths are absolute or climb out of the root.
    pub fn validate(&self) -> Result<()> {
        if self.root_folder.is_empty() || self.root_folder.contains(['/', '\\']) {
            return Err(BundleError::InvalidLayoutPath {
                path: self.root_folder.clone(),
                reason: "root folder must be a single non-empty path component".to_string(),
            });
        }

        let mut paths: Vec<&str> = Vec::new();
        paths.extend(self.mandatory.iter().map(String::as_str));
        for opt in &self.optional {
            paths.push(&opt.target);
            paths.extend(opt.candidates.iter().map(String::as_str));
        }
        paths.extend(self.subtrees.iter().map(|s| s.path.as_str()));
        paths.push(&self.manifest_dir);

        for path in paths {
            check_relative(path)?;
        }
        for rule in &self.prefixed {
            if rule.prefix.is_empty() || rule.prefix.contains(['/', '\\']) {
                return Err(BundleError::InvalidLayoutPath {
                    path: rule.prefix.clone(),
                    reason: "prefix must be a non-empty file name prefix".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Resolve the layout against `project_root`.
    ///
    /// Missing mandatory files are recorded, not raised; call
    /// [`ResolvedBundle::require_complete`] where they are fatal. When two
    /// rules yield the same relative path the earlier rule wins (mandatory,
    /// optional, prefixed, subtrees).
    pub fn resolve(&self, project_root: &Path, options: ResolveOptions) -> Result<ResolvedBundle> {
        self.validate()?;

        let mut entries: BTreeMap<String, ArchiveEntry> = BTreeMap::new();
        let mut resolved = ResolvedBundle::default();

        for rel in &self.mandatory {
            let source = project_root.join(rel);
            if source.is_file() {
                self.add_entry(&mut entries, rel, source, EntryKind::Mandatory);
            } else {
                warn!(file = %rel, "Mandatory file missing");
                resolved.missing_mandatory.push(rel.clone());
            }
        }

        for opt in &self.optional {
            let found = opt
                .candidate_paths()
                .into_iter()
                .map(|c| project_root.join(c))
                .find(|p| p.is_file());
            match found {
                Some(source) => {
                    self.add_entry(&mut entries, &opt.target, source, EntryKind::Optional)
                }
                None => {
                    debug!(target_file = %opt.target, "Optional file absent, skipping");
                    resolved.skipped_optional.push(opt.target.clone());
                }
            }
        }

        for rule in &self.prefixed {
            for (name, source) in prefixed_files(project_root, rule)? {
                if self.exclude.excludes_file(&name) {
                    continue;
                }
                self.add_entry(&mut entries, &name, source, EntryKind::Prefixed);
            }
        }

        for subtree in &self.subtrees {
            if subtree.data && !options.include_data {
                debug!(subtree = %subtree.path, "Data subtree not requested");
                continue;
            }
            let rules = self.subtree_rules(subtree);
            for record in discover(project_root, &[subtree.path.as_str()], &rules)? {
                self.add_entry(
                    &mut entries,
                    &record.relative_path,
                    record.absolute_path,
                    EntryKind::Subtree,
                );
            }
        }

        resolved.entries = entries.into_values().collect();
        debug!(
            entries = resolved.entries.len(),
            missing = resolved.missing_mandatory.len(),
            skipped = resolved.skipped_optional.len(),
            "Layout resolved"
        );
        Ok(resolved)
    }

    fn add_entry(
        &self,
        entries: &mut BTreeMap<String, ArchiveEntry>,
        relative: &str,
        source: PathBuf,
        kind: EntryKind,
    ) {
        entries
            .entry(relative.to_string())
            .or_insert_with(|| ArchiveEntry {
                relative_path: relative.to_string(),
                archive_path: self.archive_path(relative),
                source_path: source,
                kind,
            });
    }
}

fn check_relative(path: &str) -> Result<()> {
    let p = Path::new(path);
    let bad = path.is_empty()
        || p.is_absolute()
        || p
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if bad {
        return Err(BundleError::InvalidLayoutPath {
            path: path.to_string(),
            reason: "must be a relative path inside the project".to_string(),
        });
    }
    Ok(())
}

fn prefixed_files(project_root: &Path, rule: &PrefixRule) -> Result<Vec<(String, PathBuf)>> {
    let mut matches = Vec::new();
    let dir = fs::read_dir(project_root).map_err(|e| BundleError::file_io(project_root, e))?;
    for entry in dir {
        let entry = entry.map_err(|e| BundleError::file_io(project_root, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = relative_string(project_root, &path) else {
            continue;
        };
        if name.starts_with(&rule.prefix) && !rule.except.iter().any(|e| e == &name) {
            matches.push((name, path));
        }
    }
    matches.sort();
    Ok(matches)
}
