//! Error types for dataset reading.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has no header row")]
    MissingHeader { path: PathBuf },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path} line {line}: '{value}' in column '{column}' is not a number")]
    InvalidValue {
        path: PathBuf,
        line: usize,
        column: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, StatsError>;
