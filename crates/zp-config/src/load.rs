//! Structured document loading.

use crate::{ConfigError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load a JSON (`.json`) or YAML (anything else) document.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text, path)
}

/// Parse document text, choosing the format from `path`'s extension.
pub fn parse_document<T: DeserializeOwned>(text: &str, path: &Path) -> Result<T> {
    if is_json(path) {
        serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
