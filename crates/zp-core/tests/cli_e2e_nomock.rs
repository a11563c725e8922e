//! End-to-end tests for the zp binary against real project trees and
//! real ZIP archives.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tempfile::TempDir;

fn zp(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("zp").expect("zp binary should exist");
    cmd.env_remove("ZP_ROOT")
        .env_remove("ZP_LAYOUT")
        .env_remove("ZP_LOG")
        .env_remove("RUST_LOG")
        .arg("--root")
        .arg(root);
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn paper() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "main.pdf", "%PDF-1.5 main");
    write(root, "supplemental.pdf", "%PDF-1.5 supplement");
    write(root, "README.md", "# Paper\n");
    write(root, "plr.bib", "@article{x}\n");
    write(root, "dist/CITATION.cff", CITATION);
    write(root, "dist/zenodo.json", ZENODO);
    write(root, "scripts/make_figs.py", "print('figs')\n");
    write(root, "scripts/__pycache__/make_figs.cpython-312.pyc", "bytecode");
    write(root, "figs/fig1.pdf", "%PDF fig");
    write(root, "figs/fig1.png", "png");
    write(root, "data/fig1.csv", "u,residual,sigma\n0,0.1,1\n1,-0.2,1\n2,0.05,2\n");
    write(root, "paper.log", "latex noise");
    dir
}

const CITATION: &str = "cff-version: 1.2.0
title: Principle of least resistance
date-released: 2024-05-01
license: CC-BY-4.0
doi: 10.5281/zenodo.XXXXXXX
authors:
  - family-names: Doe
    given-names: Jane
    affiliation: Independent
";

const ZENODO: &str = r#"{
  "title": "Principle of least resistance",
  "upload_type": "publication",
  "description": "Reproducibility bundle",
  "creators": [{"name": "Doe, Jane", "affiliation": "Independent"}],
  "license": "cc-by",
  "access_right": "open"
}"#;

fn member_names(archive: &Path) -> Vec<String> {
    let zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    names
}

// ============================================================================
// checksums → pack → verify
// ============================================================================

#[test]
fn checksums_pack_verify_roundtrip() {
    let dir = paper();
    let root = dir.path();

    zp(root)
        .arg("checksums")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ok] wrote "))
        .stdout(predicate::str::contains("checksums_SHA256.txt"));

    let manifest = fs::read_to_string(root.join("reports/checksums_SHA256.txt")).unwrap();
    assert!(manifest.starts_with("# SHA256 checksums (relative to plr-prl/)\n"));
    assert!(manifest.contains("  main.pdf\n"));
    assert!(manifest.contains("  CITATION.cff\n"));
    assert!(!manifest.contains("fig1.png"));
    assert!(!manifest.contains("__pycache__"));
    assert!(!manifest.contains("data/fig1.csv"));

    zp(root)
        .args(["pack", "--tag", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plr_zenodo_test.zip"));

    let archive = root.join("dist/plr_zenodo_test.zip");
    let names = member_names(&archive);
    assert!(names.iter().all(|n| n.starts_with("plr-prl/")));
    assert!(names.contains(&"plr-prl/main.pdf".to_string()));
    assert!(names.contains(&"plr-prl/zenodo.json".to_string()));
    assert!(names.contains(&"plr-prl/reports/checksums_SHA256.txt".to_string()));
    assert!(!names.iter().any(|n| n.ends_with(".log")));

    zp(root)
        .arg("verify")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("[ok] plr-prl/main.pdf"))
        .stdout(predicate::str::contains("files verified"))
        .stdout(predicate::str::ends_with("[ok] all archives verified\n"));
}

#[test]
fn pack_is_reproducible() {
    let dir = paper();
    let root = dir.path();
    zp(root).args(["pack", "--tag", "a"]).assert().success();
    zp(root).args(["pack", "--tag", "b"]).assert().success();

    let a = fs::read(root.join("dist/plr_zenodo_a.zip")).unwrap();
    let b = fs::read(root.join("dist/plr_zenodo_b.zip")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn pack_include_data_adds_data_subtree() {
    let dir = paper();
    let root = dir.path();
    let out = root.join("out/bundle.zip");
    zp(root)
        .args(["pack", "--include-data", "--out"])
        .arg(&out)
        .assert()
        .success();
    assert!(member_names(&out).contains(&"plr-prl/data/fig1.csv".to_string()));
}

#[test]
fn pack_missing_mandatory_creates_nothing() {
    let dir = paper();
    let root = dir.path();
    fs::remove_file(root.join("main.pdf")).unwrap();

    zp(root)
        .args(["pack", "--tag", "x"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("main.pdf"));
    assert!(!root.join("dist/plr_zenodo_x.zip").exists());
}

#[test]
fn verify_detects_tampering() {
    let dir = paper();
    let root = dir.path();
    zp(root).arg("checksums").assert().success();
    zp(root).args(["pack", "--tag", "t"]).assert().success();

    // Change a file after the manifest was written, then repack.
    write(root, "main.pdf", "%PDF-1.5 edited");
    zp(root).args(["pack", "--tag", "t2"]).assert().success();

    zp(root)
        .arg("verify")
        .arg(root.join("dist/plr_zenodo_t.zip"))
        .arg(root.join("dist/plr_zenodo_t2.zip"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[fail] checksum mismatch for plr-prl/main.pdf"))
        .stdout(predicate::str::contains("Summary for plr_zenodo_t2.zip: ✗ 1 failed"))
        .stdout(predicate::str::ends_with(
            "[fail] one or more archives failed verification\n",
        ));
}

#[test]
fn verify_reports_missing_archive() {
    let dir = paper();
    let root = dir.path();
    zp(root).arg("checksums").assert().success();

    zp(root)
        .arg("verify")
        .arg(root.join("dist/none.zip"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[fail] archive "))
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn verify_without_manifests_is_config_error() {
    let dir = paper();
    zp(dir.path())
        .args(["verify", "anything.zip"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("no checksum manifests found"));
}

#[test]
fn verify_json_output() {
    let dir = paper();
    let root = dir.path();
    zp(root).arg("checksums").assert().success();
    zp(root).args(["pack", "--tag", "j"]).assert().success();

    let output = zp(root)
        .args(["--format", "json", "verify"])
        .arg(root.join("dist/plr_zenodo_j.zip"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["command"], "verify");
    assert_eq!(doc["code"], "OK_CLEAN");
    assert_eq!(doc["data"]["passed"], true);
    assert_eq!(doc["data"]["archives"][0]["outcome"], "checked");
}

// ============================================================================
// preflight
// ============================================================================

#[test]
fn preflight_passes_with_placeholder_warning() {
    let dir = paper();
    zp(dir.path())
        .arg("preflight")
        .assert()
        .success()
        .stdout(predicate::str::contains("[warn] CITATION.cff DOI is a placeholder"))
        .stdout(predicate::str::contains("[ok] zenodo.json license looks standard"))
        .stdout(predicate::str::ends_with("[ok] Preflight passed\n"));
}

#[test]
fn preflight_fails_on_missing_field() {
    let dir = paper();
    write(
        dir.path(),
        "dist/zenodo.json",
        r#"{"title": "t", "upload_type": "publication", "creators": [{"name": "X"}]}"#,
    );
    zp(dir.path())
        .arg("preflight")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[fail] zenodo.json missing field: description"))
        .stdout(predicate::str::contains("[fail] zenodo.json creator 1 missing affiliation"))
        .stdout(predicate::str::ends_with("[fail] Preflight failed\n"));
}

// ============================================================================
// summary
// ============================================================================

#[test]
fn summary_writes_csv_and_markdown() {
    let dir = paper();
    let root = dir.path();
    write(
        root,
        "manifest.yaml",
        "figures:\n  - input: data/fig1.csv\n    kind: residuals\n  - input: data/missing.csv\n    kind: residuals\n",
    );
    let out = root.join("reports/check_summary.csv");

    zp(root)
        .arg("summary")
        .arg("--manifest")
        .arg(root.join("manifest.yaml"))
        .arg("--out")
        .arg(&out)
        .arg("--markdown")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("input,kind,n,min_u,"))
        .stdout(predicate::str::contains("data/fig1.csv,residuals,3,0.0,2.0,2.0,"))
        .stdout(predicate::str::contains("missing.csv").not())
        .stderr(predicate::str::contains("[markdown]\n|input|kind|n|"));

    assert_eq!(fs::read_to_string(&out).unwrap().lines().count(), 2);
    assert!(root.join("reports/check_summary.md").is_file());
}

// ============================================================================
// reorg
// ============================================================================

#[test]
fn reorg_dry_run_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "CITATION.cff", "cff-version: 1.2.0\n");
    write(root, "verify_archive.py", "");

    zp(root)
        .arg("reorg")
        .assert()
        .success()
        .stdout(predicate::str::contains("[plan] Proposed moves:"))
        .stdout(predicate::str::contains("✓ CITATION.cff  →  dist/CITATION.cff"))
        .stdout(predicate::str::contains("✓ verify_archive.py  →  scripts/verify_archive.py"))
        .stdout(predicate::str::contains("planned: 11"))
        .stdout(predicate::str::contains("missing: 9"));

    assert!(root.join("CITATION.cff").is_file());
    assert!(!root.join("dist").exists());
}

#[test]
fn reorg_rejects_bad_plan_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "plan.json", "{\"dist\": 3}");
    zp(dir.path())
        .arg("reorg")
        .arg("--plan-file")
        .arg(dir.path().join("plan.json"))
        .assert()
        .code(11);
}
