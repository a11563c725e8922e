//! Configuration loading and validation for zp.
//!
//! This crate provides:
//! - Project root and bundle layout resolution (CLI → env → project file → defaults)
//! - Preflight validation of `CITATION.cff` and `zenodo.json`
//! - The dataset summary manifest (`figures:` list)
//! - File reorganization plans

pub mod error;
pub mod load;
pub mod plan;
pub mod preflight;
pub mod resolve;
pub mod summary;

pub use error::{ConfigError, Result};
pub use plan::{MovePlan, PlannedMove};
pub use preflight::{check_citation, check_zenodo, PreflightReport, ValidationError};
pub use resolve::{load_layout, resolve_root, ConfigSource, LoadedLayout, ResolvedRoot};
pub use summary::SummaryManifest;
