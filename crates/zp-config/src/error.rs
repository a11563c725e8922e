//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::resolve::ConfigSource;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("project root {0} is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("layout file {path} (from {origin}) does not exist")]
    LayoutNotFound { path: PathBuf, origin: ConfigSource },

    #[error("invalid bundle layout: {0}")]
    InvalidLayout(#[from] zp_bundle::BundleError),

    #[error("invalid move plan: {0}")]
    InvalidPlan(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
