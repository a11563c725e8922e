//! Shared types for the zp reproducibility-bundle tools.
//!
//! Every command reports progress as status lines carrying a severity
//! prefix (`[ok]`, `[warn]`, `[fail]`) and exits with a code derived from the
//! worst severity it saw. The types here keep that vocabulary identical
//! across crates.

pub mod output;
pub mod status;

pub use output::OutputFormat;
pub use status::{Severity, StatusLine, StatusLog};
