//! Per-dataset descriptive statistics.

use crate::table::{read_table, Columns};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One declared input: a dataset path plus a free-form kind label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDecl {
    pub input: PathBuf,
    #[serde(default)]
    pub kind: String,
}

impl InputDecl {
    pub fn new(input: impl Into<PathBuf>, kind: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            kind: kind.into(),
        }
    }
}

/// Descriptive statistics of one dataset.
///
/// The `u` extrema propagate NaN. The `residual` and `sigma` statistics
/// ignore NaN values. An empty dataset yields NaN for every statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatasetStats {
    pub n: usize,
    pub min_u: f64,
    pub max_u: f64,
    pub span_u: f64,
    pub mean_abs_r: f64,
    pub max_abs_r: f64,
    /// Population variance of the residuals.
    pub var_r: f64,
    pub min_sigma: f64,
    pub max_sigma: f64,
    /// Any NaN or infinity in any of the three columns.
    pub has_nan: bool,
    /// Every consecutive difference of `u` is non-negative.
    pub monotonic_u: bool,
}

impl DatasetStats {
    pub fn compute(columns: &Columns) -> Self {
        let u = &columns.u;
        let r = &columns.residual;
        let s = &columns.sigma;

        let min_u = min_propagating(u);
        let max_u = max_propagating(u);
        let abs_r: Vec<f64> = r.iter().map(|x| x.abs()).collect();

        let has_nan = u
            .iter()
            .chain(r.iter())
            .chain(s.iter())
            .any(|x| !x.is_finite());
        let monotonic_u = u.windows(2).all(|w| w[1] - w[0] >= 0.0);

        Self {
            n: columns.len(),
            min_u,
            max_u,
            span_u: max_u - min_u,
            mean_abs_r: nan_mean(&abs_r),
            max_abs_r: nan_max(&abs_r),
            var_r: nan_var(r),
            min_sigma: nan_min(s),
            max_sigma: nan_max(s),
            has_nan,
            monotonic_u,
        }
    }
}

fn min_propagating(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|x| x.is_nan()) {
        return f64::NAN;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_propagating(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|x| x.is_nan()) {
        return f64::NAN;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn non_nan(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter(|x| !x.is_nan())
}

fn nan_min(values: &[f64]) -> f64 {
    non_nan(values).reduce(f64::min).unwrap_or(f64::NAN)
}

fn nan_max(values: &[f64]) -> f64 {
    non_nan(values).reduce(f64::max).unwrap_or(f64::NAN)
}

fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = non_nan(values).fold((0.0, 0usize), |(s, c), x| (s + x, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

fn nan_var(values: &[f64]) -> f64 {
    let mean = nan_mean(values);
    if mean.is_nan() {
        return f64::NAN;
    }
    let (sum_sq, count) = non_nan(values).fold((0.0, 0usize), |(s, c), x| {
        let d = x - mean;
        (s + d * d, c + 1)
    });
    sum_sq / count as f64
}

/// A summarized dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub input: String,
    pub kind: String,
    #[serde(flatten)]
    pub stats: DatasetStats,
}

/// A declared input that produced no row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedInput {
    pub input: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
    pub skipped: Vec<SkippedInput>,
}

/// Summarize declared inputs in order.
///
/// Relative inputs are read from under `base` but reported as declared.
/// Missing or unreadable inputs are skipped and recorded rather than
/// aborting the run.
pub fn summarize(base: &Path, inputs: &[InputDecl]) -> Summary {
    let mut summary = Summary::default();
    for decl in inputs {
        let input = decl.input.display().to_string();
        let path = base.join(&decl.input);
        if !path.is_file() {
            debug!(input = %input, "declared input not found, skipping");
            summary.skipped.push(SkippedInput {
                input,
                reason: "not found".to_string(),
            });
            continue;
        }
        match read_table(&path) {
            Ok(columns) => summary.rows.push(SummaryRow {
                input,
                kind: decl.kind.clone(),
                stats: DatasetStats::compute(&columns),
            }),
            Err(err) => {
                warn!(input = %input, error = %err, "unreadable input, skipping");
                summary.skipped.push(SkippedInput {
                    input,
                    reason: err.to_string(),
                });
            }
        }
    }
    summary
}
