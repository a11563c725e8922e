//! Version-control and code-host collaborators.
//!
//! The packaging commands only need a handful of black-box operations:
//! the current short revision (for default archive tags), history-preserving
//! moves, commits, pushes and opening a pull request. They are expressed as
//! the [`Vcs`] and [`CodeHost`] traits; [`GitCli`] and [`GhCli`] shell out to
//! `git` and `gh`.

use serde::Serialize;
use std::path::Path;
use std::process::{Command, Output};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum VcsError {
    #[error("{program} is not available: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("working tree not clean; commit or stash first, or pass --force")]
    DirtyWorktree,
}

pub type Result<T> = std::result::Result<T, VcsError>;

/// Version-control operations, all relative to a repository root.
pub trait Vcs {
    /// Short revision of `HEAD`, or `None` outside a work tree.
    fn short_revision(&self, root: &Path) -> Result<Option<String>>;

    /// True when there are no uncommitted changes.
    fn is_clean(&self, root: &Path) -> Result<bool>;

    /// Check out `base`, then switch to `branch`, creating it if needed.
    fn ensure_branch(&self, root: &Path, base: &str, branch: &str) -> Result<()>;

    /// History-preserving move; both paths relative to `root`.
    fn move_path(&self, root: &Path, from: &Path, to: &Path) -> Result<()>;

    fn commit(&self, root: &Path, message: &str) -> Result<()>;

    fn push(&self, root: &Path, branch: &str) -> Result<()>;
}

/// A pull request to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub title: String,
    pub body: String,
    pub base: String,
    pub head: String,
    /// `owner/repo`; defaults to the repository's own remote.
    pub repo: Option<String>,
}

/// Remote code host able to open pull requests.
pub trait CodeHost {
    fn is_available(&self) -> bool;

    /// Open the pull request, returning whatever the host printed (usually its URL).
    fn open_pull_request(&self, root: &Path, pr: &PullRequest) -> Result<String>;
}

fn run(program: &str, root: &Path, args: &[&str]) -> Result<Output> {
    debug!(program, ?args, root = %root.display(), "Running command");
    Command::new(program)
        .args(args)
        .current_dir(root)
        .output()
        .map_err(|source| VcsError::Unavailable {
            program: program.to_string(),
            source,
        })
}

fn run_checked(program: &str, root: &Path, args: &[&str]) -> Result<String> {
    let output = run(program, root, args)?;
    if !output.status.success() {
        return Err(VcsError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            status: output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| format!("exit {c}")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// [`Vcs`] backed by the `git` command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    fn git(&self, root: &Path, args: &[&str]) -> Result<String> {
        run_checked("git", root, args)
    }
}

impl Vcs for GitCli {
    fn short_revision(&self, root: &Path) -> Result<Option<String>> {
        let inside = run("git", root, &["rev-parse", "--is-inside-work-tree"])?;
        if !inside.status.success() || String::from_utf8_lossy(&inside.stdout).trim() != "true" {
            return Ok(None);
        }
        let rev = self.git(root, &["rev-parse", "--short", "HEAD"])?;
        Ok(Some(rev).filter(|r| !r.is_empty()))
    }

    fn is_clean(&self, root: &Path) -> Result<bool> {
        Ok(self.git(root, &["status", "--porcelain"])?.is_empty())
    }

    fn ensure_branch(&self, root: &Path, base: &str, branch: &str) -> Result<()> {
        let current = self.git(root, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        if current != base {
            self.git(root, &["checkout", base])?;
        }
        let listed = self.git(root, &["branch", "--list", branch])?;
        let exists = listed
            .lines()
            .map(|l| l.trim().trim_start_matches("* "))
            .any(|name| name == branch);
        if exists {
            self.git(root, &["checkout", branch])?;
        } else {
            self.git(root, &["checkout", "-b", branch])?;
        }
        Ok(())
    }

    fn move_path(&self, root: &Path, from: &Path, to: &Path) -> Result<()> {
        let from = from.to_string_lossy().into_owned();
        let to = to.to_string_lossy().into_owned();
        self.git(root, &["mv", "--", from.as_str(), to.as_str()])
            .map(|_| ())
    }

    fn commit(&self, root: &Path, message: &str) -> Result<()> {
        self.git(root, &["commit", "-m", message]).map(|_| ())
    }

    fn push(&self, root: &Path, branch: &str) -> Result<()> {
        self.git(root, &["push", "-u", "origin", branch]).map(|_| ())
    }
}

/// [`CodeHost`] backed by the GitHub CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct GhCli;

impl CodeHost for GhCli {
    fn is_available(&self) -> bool {
        Command::new("gh")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn open_pull_request(&self, root: &Path, pr: &PullRequest) -> Result<String> {
        let mut args = vec![
            "pr",
            "create",
            "--title",
            pr.title.as_str(),
            "--body",
            pr.body.as_str(),
            "--base",
            pr.base.as_str(),
            "--head",
            pr.head.as_str(),
        ];
        if let Some(repo) = &pr.repo {
            args.extend(["--repo", repo.as_str()]);
        }
        run_checked("gh", root, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_short_revision_outside_work_tree() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        assert_eq!(GitCli.short_revision(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = run_checked("zp-definitely-not-a-program", dir.path(), &[]).unwrap_err();
        assert!(matches!(err, VcsError::Unavailable { .. }));
    }

    #[test]
    fn test_failed_command_carries_stderr() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let err = run_checked("git", dir.path(), &["rev-parse", "--short", "HEAD"]).unwrap_err();
        match err {
            VcsError::CommandFailed { command, .. } => {
                assert_eq!(command, "git rev-parse --short HEAD")
            }
            other => panic!("unexpected: {other}"),
        }
    }
}
