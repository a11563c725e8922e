//! `zp summary`: per-dataset statistics table.

use super::{CommandError, CommandReport, Context};
use crate::cli::SummaryArgs;
use serde_json::json;
use std::path::Path;
use tracing::info;
use zp_config::SummaryManifest;
use zp_stats::{render_csv, render_markdown, summarize};

fn write_text(path: &Path, text: &str) -> Result<(), CommandError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CommandError::io(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| CommandError::io(path, e))
}

/// Summarize every declared input that exists.
///
/// Inputs are resolved under the project root. The CSV table is the text
/// output; skipped inputs only appear in logs and the JSON status.
pub fn run_summary(ctx: &Context, args: &SummaryArgs) -> Result<CommandReport, CommandError> {
    let manifest = SummaryManifest::load(&args.manifest)?;
    let summary = summarize(&ctx.root, &manifest.inputs());

    let mut report = CommandReport::new("summary");
    for skipped in &summary.skipped {
        report
            .status
            .warn(format!("skipped {}: {}", skipped.input, skipped.reason));
    }

    let csv = render_csv(&summary.rows);
    report.note(csv.trim_end_matches('\n'));

    let mut written = Vec::new();
    if let Some(out) = &args.out {
        write_text(out, &csv)?;
        info!(path = %out.display(), rows = summary.rows.len(), "Summary written");
        written.push(out.clone());
    }

    if args.markdown {
        let md = render_markdown(&summary.rows);
        report.diagnostic(format!("\n[markdown]\n{}", md.trim_end_matches('\n')));
        if let Some(out) = &args.out {
            let md_path = out.with_extension("md");
            write_text(&md_path, &md)?;
            written.push(md_path);
        }
    }

    Ok(report.with_data(&json!({
        "rows": summary.rows,
        "skipped": summary.skipped,
        "written": written,
    })))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::touch;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "data/a.csv", "u,residual,sigma\n1,0.1,1\n2,-0.2,1\n3,0.05,1\n");
        touch(
            dir.path(),
            "manifest.yaml",
            "figures:\n  - input: data/a.csv\n    kind: residuals\n  - input: data/gone.csv\n    kind: x\n  - kind: no-input\n",
        );
        dir
    }

    #[test]
    fn test_summary_prints_csv_and_records_skips() {
        let dir = project();
        let ctx = Context::new(dir.path(), None);
        let args = SummaryArgs {
            manifest: dir.path().join("manifest.yaml"),
            out: None,
            markdown: false,
        };

        let report = run_summary(&ctx, &args).unwrap();
        let text = report.text();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("input,kind,n,min_u,max_u,span_u,mean_abs_r,max_abs_r,var_r,min_sigma,max_sigma,has_nan,monotonic_u")
        );
        assert!(lines.next().unwrap().starts_with("data/a.csv,residuals,3,1.0,3.0,2.0,"));
        assert!(lines.next().is_none());
        assert_eq!(report.status.lines.len(), 1);
        assert!(report.status.lines[0].message.contains("data/gone.csv"));
    }

    #[test]
    fn test_out_and_markdown_files() {
        let dir = project();
        let ctx = Context::new(dir.path(), None);
        let out = dir.path().join("reports/check_summary.csv");
        let args = SummaryArgs {
            manifest: dir.path().join("manifest.yaml"),
            out: Some(out.clone()),
            markdown: true,
        };

        let report = run_summary(&ctx, &args).unwrap();
        let csv = fs::read_to_string(&out).unwrap();
        assert_eq!(csv.lines().count(), 2);
        let md = fs::read_to_string(dir.path().join("reports/check_summary.md")).unwrap();
        assert!(md.starts_with("|input|kind|n|"));
        assert_eq!(md.lines().nth(1).unwrap().split('|').filter(|c| *c == "---").count(), 13);
        assert_eq!(report.data["written"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_manifest_is_config_error() {
        let dir = TempDir::new().unwrap();
        let ctx = Context::new(dir.path(), None);
        let args = SummaryArgs {
            manifest: dir.path().join("nope.yaml"),
            out: None,
            markdown: false,
        };
        let err = run_summary(&ctx, &args).unwrap_err();
        assert_eq!(err.exit_code(), crate::exit_codes::ExitCode::ConfigError);
    }
}
