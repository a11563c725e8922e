//! End-to-end dataset summaries against real files.

use std::fs;
use tempfile::TempDir;
use zp_stats::{render_csv, render_markdown, summarize, InputDecl, FIELDS};

// ============================================================================
// Fixtures
// ============================================================================

fn write(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).expect("write fixture");
    path
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn declared_order_is_preserved_and_gaps_skipped() {
    let dir = TempDir::new().unwrap();
    let b = write(&dir, "b.csv", "u,residual,sigma\n0,0.5,2\n1,-0.5,2\n");
    write(&dir, "a.csv", "u,residual,sigma\n1,0.1,1\n2,-0.2,1\n3,0.05,1\n");

    let summary = summarize(
        dir.path(),
        &[
            InputDecl::new(&b, "second"),
            InputDecl::new("missing.csv", "gone"),
            InputDecl::new("a.csv", "first"),
        ],
    );

    let kinds: Vec<&str> = summary.rows.iter().map(|r| r.kind.as_str()).collect();
    assert_eq!(kinds, vec!["second", "first"]);
    assert_eq!(summary.rows[1].input, "a.csv");
    assert_eq!(summary.skipped.len(), 1);

    let csv = render_csv(&summary.rows);
    assert_eq!(csv.lines().count(), 3);
    assert_eq!(csv.lines().next().unwrap(), FIELDS.join(","));

    let md = render_markdown(&summary.rows);
    assert_eq!(md.lines().count(), 4);
}

#[test]
fn dataset_with_gaps_flags_nan() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "g.csv", "u,residual,sigma\n1,,1\n2,0.4,\n");

    let summary = summarize(dir.path(), &[InputDecl::new(&path, "gappy")]);
    let st = summary.rows[0].stats;
    assert!(st.has_nan);
    assert_eq!(st.mean_abs_r, 0.4);
    assert_eq!(st.min_sigma, 1.0);
    assert!(st.monotonic_u);
}

#[test]
fn no_inputs_renders_header_only() {
    let summary = summarize(std::path::Path::new("."), &[]);
    assert!(summary.rows.is_empty());
    assert_eq!(render_csv(&summary.rows).lines().count(), 1);
}
