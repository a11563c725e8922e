//! `zp reorg --apply` against a real git repository.
//!
//! Skipped when git is not installed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process;
use tempfile::TempDir;

const IDENTITY: [(&str, &str); 4] = [
    ("GIT_AUTHOR_NAME", "zp tests"),
    ("GIT_AUTHOR_EMAIL", "zp@example.invalid"),
    ("GIT_COMMITTER_NAME", "zp tests"),
    ("GIT_COMMITTER_EMAIL", "zp@example.invalid"),
];

fn git(root: &Path, args: &[&str]) -> String {
    let output = process::Command::new("git")
        .args(args)
        .current_dir(root)
        .envs(IDENTITY)
        .output()
        .expect("git runs");
    assert!(output.status.success(), "git {args:?} failed: {output:?}");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn git_available() -> bool {
    process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    git(root, &["init", "-q"]);
    git(root, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    fs::write(root.join("CITATION.cff"), "cff-version: 1.2.0\n").unwrap();
    fs::write(root.join("make_checksums.py"), "print('x')\n").unwrap();
    fs::write(root.join("keep.txt"), "stay\n").unwrap();
    git(root, &["add", "."]);
    git(root, &["commit", "-q", "-m", "initial"]);
    dir
}

fn zp(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("zp").expect("zp binary should exist");
    cmd.env_remove("ZP_ROOT")
        .env_remove("ZP_LAYOUT")
        .envs(IDENTITY)
        .arg("--root")
        .arg(root);
    cmd
}

#[test]
fn apply_moves_and_commits_on_branch() {
    if !git_available() {
        return;
    }
    let dir = repo();
    let root = dir.path();

    zp(root)
        .args(["reorg", "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[moved] CITATION.cff → dist/CITATION.cff"))
        .stdout(predicate::str::contains("[moved] make_checksums.py → scripts/make_checksums.py"))
        .stdout(predicate::str::contains("[skip] zenodo.json (not found)"))
        .stdout(predicate::str::contains("[ok] Commit created."))
        .stdout(predicate::str::contains("  moved:   2"))
        .stdout(predicate::str::contains("  errors:  9"));

    assert!(root.join("dist/CITATION.cff").is_file());
    assert!(!root.join("CITATION.cff").exists());
    assert!(root.join("keep.txt").is_file());
    assert_eq!(
        git(root, &["rev-parse", "--abbrev-ref", "HEAD"]),
        "reorganize/dist-scripts-reports"
    );
    assert_eq!(git(root, &["status", "--porcelain"]), "");

    // A second run finds nothing to move.
    zp(root)
        .args(["reorg", "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[note] No changes to commit (already organized)."))
        .stdout(predicate::str::contains("  moved:   0"));
}

#[test]
fn apply_refuses_dirty_worktree() {
    if !git_available() {
        return;
    }
    let dir = repo();
    let root = dir.path();
    fs::write(root.join("keep.txt"), "edited\n").unwrap();

    zp(root)
        .args(["reorg", "--apply"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("working tree not clean"));
    assert!(root.join("CITATION.cff").is_file());
}
