//! Dataset summary statistics.
//!
//! Reads delimited tables with `u`, `residual` and `sigma` columns and
//! reduces each to a fixed row of descriptive statistics, rendered as a CSV
//! table or a pipe-delimited (Markdown) table.

pub mod error;
pub mod render;
pub mod stats;
pub mod table;

pub use error::{Result, StatsError};
pub use render::{format_float, render_csv, render_markdown, FIELDS};
pub use stats::{summarize, DatasetStats, InputDecl, SkippedInput, Summary, SummaryRow};
pub use table::{read_table, Columns};
