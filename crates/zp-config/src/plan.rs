//! File reorganization plans.
//!
//! A plan maps a destination folder to the files that belong in it. Plans
//! are loaded from JSON (`.json`) or YAML, or taken from
//! [`MovePlan::default`].

use crate::load::load_document;
use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_BASE: &str = "main";
pub const DEFAULT_BRANCH: &str = "reorganize/dist-scripts-reports";
pub const DEFAULT_COMMIT_MESSAGE: &str =
    "chore: reorganize files into dist/, scripts/, and reports/";
pub const DEFAULT_PR_TITLE: &str = "chore: reorganize files into dist/, scripts/, and reports/";
pub const DEFAULT_PR_BODY: &str = "\
This PR reorganizes the repository structure to improve clarity and reproducibility.

- Moved metadata files to dist/
- Moved helper scripts to scripts/
- Moved reports into reports/
- Left top-level files (README, LICENSE, Makefile, CHANGELOG) untouched

This matches the intended structure and makes it easier for referees and collaborators to navigate.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovePlan {
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Default for MovePlan {
    fn default() -> Self {
        let group = |files: &[&str]| files.iter().map(|f| f.to_string()).collect::<Vec<_>>();
        let mut groups = BTreeMap::new();
        groups.insert(
            "dist".to_string(),
            group(&[
                "CITATION.cff",
                "zenodo.json",
                "README_packaging.md",
                "FILE_LISTING.txt",
            ]),
        );
        groups.insert(
            "scripts".to_string(),
            group(&[
                "prereg_pack.py",
                "zenodo_pack.py",
                "zenodo_preflight.py",
                "verify_archive.py",
                "make_checksums.py",
                "check_summary.py",
            ]),
        );
        groups.insert("reports".to_string(), group(&["check_summary.csv"]));
        Self { groups }
    }
}

/// One source → destination move, both relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl MovePlan {
    pub fn load(path: &Path) -> Result<Self> {
        load_document(path)
    }

    pub fn file_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Expand the plan into moves, folder by folder.
    ///
    /// Sources are flattened to their file name under the folder unless
    /// `preserve_paths` is set, in which case their relative path is kept.
    pub fn moves(&self, preserve_paths: bool) -> Result<Vec<PlannedMove>> {
        let mut moves = Vec::with_capacity(self.file_count());
        for (folder, files) in &self.groups {
            if folder.is_empty() {
                return Err(ConfigError::InvalidPlan("empty destination folder".to_string()));
            }
            for file in files {
                let source: PathBuf = Path::new(file)
                    .components()
                    .filter(|c| !matches!(c, Component::CurDir))
                    .collect();
                let destination = if preserve_paths {
                    Path::new(folder).join(&source)
                } else {
                    let name = source.file_name().ok_or_else(|| {
                        ConfigError::InvalidPlan(format!("'{file}' has no file name"))
                    })?;
                    Path::new(folder).join(name)
                };
                if source.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidPlan(format!(
                        "empty source in folder '{folder}'"
                    )));
                }
                moves.push(PlannedMove {
                    source,
                    destination,
                });
            }
        }
        Ok(moves)
    }
}
