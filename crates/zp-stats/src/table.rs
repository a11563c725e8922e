//! Minimal reader for numeric comma-separated tables.
//!
//! Only the `u`, `residual` and `sigma` columns are extracted; other columns
//! may hold anything. Empty cells read as NaN, as do cells that are absent
//! on short rows.

use crate::{Result, StatsError};
use std::path::Path;

pub const COLUMN_U: &str = "u";
pub const COLUMN_RESIDUAL: &str = "residual";
pub const COLUMN_SIGMA: &str = "sigma";

/// The three numeric columns of a dataset, row-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    pub u: Vec<f64>,
    pub residual: Vec<f64>,
    pub sigma: Vec<f64>,
}

impl Columns {
    pub fn len(&self) -> usize {
        self.u.len()
    }

    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }
}

/// Read a dataset file.
pub fn read_table(path: &Path) -> Result<Columns> {
    let text = std::fs::read_to_string(path).map_err(|source| StatsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(&text, path)
}

/// Parse dataset text; `origin` is only used in error messages.
pub fn parse_table(text: &str, origin: &Path) -> Result<Columns> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header) = lines.next().ok_or_else(|| StatsError::MissingHeader {
        path: origin.to_path_buf(),
    })?;
    let header = split_record(header.trim_start_matches('\u{feff}'));

    let index_of = |name: &str| -> Result<usize> {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| StatsError::MissingColumn {
                path: origin.to_path_buf(),
                column: name.to_string(),
            })
    };
    let iu = index_of(COLUMN_U)?;
    let ir = index_of(COLUMN_RESIDUAL)?;
    let is = index_of(COLUMN_SIGMA)?;

    let mut columns = Columns::default();
    for (idx, line) in lines {
        let fields = split_record(line);
        let cell = |i: usize, name: &str| -> Result<f64> {
            parse_cell(fields.get(i).map(String::as_str).unwrap_or("")).ok_or_else(|| {
                StatsError::InvalidValue {
                    path: origin.to_path_buf(),
                    line: idx + 1,
                    column: name.to_string(),
                    value: fields.get(i).cloned().unwrap_or_default(),
                }
            })
        };
        columns.u.push(cell(iu, COLUMN_U)?);
        columns.residual.push(cell(ir, COLUMN_RESIDUAL)?);
        columns.sigma.push(cell(is, COLUMN_SIGMA)?);
    }
    Ok(columns)
}

fn parse_cell(raw: &str) -> Option<f64> {
    let cell = raw.trim();
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    cell.to_ascii_lowercase().parse::<f64>().ok()
}

/// Split one CSV record, honouring double-quoted fields.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}
