//! `zp preflight`: validate bundle metadata before packaging.

use super::{CommandError, CommandReport, Context};
use crate::cli::PreflightArgs;
use crate::exit_codes::ExitCode;
use serde_json::json;
use zp_config::preflight::{CITATION_FILE, ZENODO_FILE};
use zp_config::PreflightReport;

pub fn run_preflight(ctx: &Context, args: &PreflightArgs) -> Result<CommandReport, CommandError> {
    let citation = ctx.path_or(args.citation.as_deref(), &format!("dist/{CITATION_FILE}"));
    let zenodo = ctx.path_or(args.zenodo.as_deref(), &format!("dist/{ZENODO_FILE}"));

    let checked = PreflightReport::run(&citation, &zenodo);
    let mut report = CommandReport::new("preflight");
    for line in checked.lines().lines {
        report.line(line);
    }
    if !checked.passed() {
        report.exit = ExitCode::CheckFailed;
    }

    Ok(report.with_data(&json!({
        "citation": citation,
        "zenodo": zenodo,
        "passed": checked.passed(),
    })))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::touch;
    use super::*;
    use tempfile::TempDir;

    const CITATION: &str = "cff-version: 1.2.0
message: Please cite
title: A paper
date-released: 2024-01-01
license: CC-BY-4.0
authors:
  - family-names: Doe
    given-names: Jane
    affiliation: Somewhere
";

    const ZENODO: &str = r#"{
  "title": "A paper",
  "upload_type": "publication",
  "creators": [{"name": "Doe, Jane", "affiliation": "Somewhere"}],
  "description": "Reproducibility bundle",
  "license": "cc-by-4.0",
  "access_right": "open"
}"#;

    #[test]
    fn test_complete_metadata_passes() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "dist/CITATION.cff", CITATION);
        touch(dir.path(), "dist/zenodo.json", ZENODO);
        let ctx = Context::new(dir.path(), None);

        let report = run_preflight(&ctx, &PreflightArgs::default()).unwrap();
        assert_eq!(report.exit, ExitCode::Clean);
        assert!(report.text().ends_with("[ok] Preflight passed\n"));
    }

    #[test]
    fn test_missing_files_fail() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(dir.path(), None);

        let report = run_preflight(&ctx, &PreflightArgs::default()).unwrap();
        let text = report.text();
        assert_eq!(report.exit, ExitCode::CheckFailed);
        assert!(text.contains("[fail] Missing "));
        assert!(text.ends_with("[fail] Preflight failed\n"));
        assert_eq!(report.data["passed"], false);
    }

    #[test]
    fn test_explicit_paths_override_defaults() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "meta/c.cff", CITATION);
        touch(dir.path(), "meta/z.json", ZENODO);
        let ctx = Context::new(dir.path(), None);
        let args = PreflightArgs {
            citation: Some(dir.path().join("meta/c.cff")),
            zenodo: Some(dir.path().join("meta/z.json")),
        };

        assert_eq!(run_preflight(&ctx, &args).unwrap().exit, ExitCode::Clean);
    }
}
