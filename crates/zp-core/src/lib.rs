//! zp core library
//!
//! Everything behind the `zp` binary:
//! - CLI definition and exit codes
//! - Logging initialization
//! - Git and code-host collaborators
//! - The reorganization engine
//! - One runner per command
//!
//! The binary entry point is in `main.rs`.

pub mod cli;
pub mod commands;
pub mod exit_codes;
pub mod logging;
pub mod reorg;
pub mod vcs;
