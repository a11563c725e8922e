//! Dataset summary manifest.
//!
//! A YAML document whose `figures` list declares the datasets to summarize:
//!
//! ```yaml
//! figures:
//!   - input: data/fig1_residuals.csv
//!     kind: residuals
//! ```
//!
//! Other top-level keys are ignored.

use crate::load::load_document;
use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use zp_stats::InputDecl;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryManifest {
    #[serde(default)]
    pub figures: Option<Vec<FigureDecl>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FigureDecl {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub kind: Option<String>,
}

impl SummaryManifest {
    pub fn load(path: &Path) -> Result<Self> {
        load_document(path)
    }

    /// Declared inputs in order; entries without an `input` are dropped.
    pub fn inputs(&self) -> Vec<InputDecl> {
        self.figures
            .iter()
            .flatten()
            .filter_map(|fig| {
                let input = fig.input.as_ref().filter(|p| !p.as_os_str().is_empty())?;
                Some(InputDecl::new(input, fig.kind.clone().unwrap_or_default()))
            })
            .collect()
    }
}
