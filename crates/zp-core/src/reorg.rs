//! Repository reorganization.
//!
//! Moves files into the canonical `dist/`, `scripts/`, `reports/` layout
//! with history-preserving moves, then optionally commits, pushes and opens
//! a pull request. Nothing touches the repository unless `apply` is set.

use crate::vcs::{CodeHost, PullRequest, Vcs, VcsError};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use zp_config::PlannedMove;

#[derive(Debug, Clone)]
pub struct ReorgOptions {
    pub apply: bool,
    /// Proceed even if the work tree has uncommitted changes.
    pub force: bool,
    pub base: String,
    pub branch: String,
    pub commit_message: String,
    pub push: bool,
    /// Open this pull request after pushing.
    pub pull_request: Option<PullRequest>,
}

/// What happened to one planned move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MoveResult {
    /// Dry run: source present, would be moved.
    Planned,
    Moved,
    /// Source and destination are already the same file.
    AlreadyInPlace,
    SourceMissing,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    #[serde(flatten)]
    pub planned: PlannedMove,
    pub source_present: bool,
    #[serde(flatten)]
    pub result: MoveResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReorgOutcome {
    pub applied: bool,
    pub moves: Vec<MoveRecord>,
    pub committed: bool,
    pub pushed: bool,
    /// Output of the code host when a pull request was opened.
    pub pull_request: Option<String>,
    pub warnings: Vec<String>,
}

impl ReorgOutcome {
    pub fn planned(&self) -> usize {
        self.moves.len()
    }

    pub fn missing(&self) -> usize {
        self.moves.iter().filter(|m| !m.source_present).count()
    }

    pub fn moved(&self) -> usize {
        self.count(|r| matches!(r, MoveResult::Moved))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, MoveResult::AlreadyInPlace))
    }

    /// Absent sources and failed moves.
    pub fn errors(&self) -> usize {
        self.count(|r| matches!(r, MoveResult::SourceMissing | MoveResult::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&MoveResult) -> bool) -> usize {
        self.moves.iter().filter(|m| pred(&m.result)).count()
    }
}

/// Applies move plans to a repository through the [`Vcs`] and [`CodeHost`]
/// collaborators.
pub struct Reorganizer<'a> {
    root: &'a Path,
    vcs: &'a dyn Vcs,
    host: &'a dyn CodeHost,
}

impl<'a> Reorganizer<'a> {
    pub fn new(root: &'a Path, vcs: &'a dyn Vcs, host: &'a dyn CodeHost) -> Self {
        Self { root, vcs, host }
    }

    /// Report what would happen without touching the repository.
    pub fn preview(&self, moves: &[PlannedMove]) -> ReorgOutcome {
        ReorgOutcome {
            moves: moves
                .iter()
                .map(|m| {
                    let present = self.root.join(&m.source).exists();
                    MoveRecord {
                        planned: m.clone(),
                        source_present: present,
                        result: if present {
                            MoveResult::Planned
                        } else {
                            MoveResult::SourceMissing
                        },
                    }
                })
                .collect(),
            ..ReorgOutcome::default()
        }
    }

    /// Dry run unless `options.apply`; otherwise move, commit, push and
    /// open the pull request as requested.
    ///
    /// Individual move failures are recorded and the remaining moves still
    /// run. Failures of the surrounding git steps abort.
    pub fn run(&self, moves: &[PlannedMove], options: &ReorgOptions) -> Result<ReorgOutcome, VcsError> {
        if !options.apply {
            return Ok(self.preview(moves));
        }

        if !options.force && !self.vcs.is_clean(self.root)? {
            return Err(VcsError::DirtyWorktree);
        }
        self.vcs
            .ensure_branch(self.root, &options.base, &options.branch)?;

        let mut outcome = ReorgOutcome {
            applied: true,
            ..ReorgOutcome::default()
        };
        for planned in moves {
            outcome.moves.push(self.apply_move(planned));
        }

        if !self.vcs.is_clean(self.root)? {
            self.vcs.commit(self.root, &options.commit_message)?;
            outcome.committed = true;
            info!(moved = outcome.moved(), "Reorganization committed");
        }

        if options.push {
            self.vcs.push(self.root, &options.branch)?;
            outcome.pushed = true;
        }

        if let Some(pr) = &options.pull_request {
            if self.host.is_available() {
                outcome.pull_request = Some(self.host.open_pull_request(self.root, pr)?);
            } else {
                warn!("Code host CLI not found, skipping pull request");
                outcome
                    .warnings
                    .push("gh not found; skipping PR creation.".to_string());
            }
        }

        Ok(outcome)
    }

    fn apply_move(&self, planned: &PlannedMove) -> MoveRecord {
        let src = self.root.join(&planned.source);
        let dst = self.root.join(&planned.destination);
        let record = |source_present: bool, result: MoveResult| MoveRecord {
            planned: planned.clone(),
            source_present,
            result,
        };

        if !src.exists() {
            return record(false, MoveResult::SourceMissing);
        }
        if dst.exists() && same_file(&src, &dst) {
            return record(true, MoveResult::AlreadyInPlace);
        }
        if let Some(parent) = dst.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return record(
                    true,
                    MoveResult::Failed {
                        reason: e.to_string(),
                    },
                );
            }
        }
        match self
            .vcs
            .move_path(self.root, &planned.source, &planned.destination)
        {
            Ok(()) => record(true, MoveResult::Moved),
            Err(e) => {
                warn!(source = %planned.source.display(), error = %e, "Move failed");
                record(
                    true,
                    MoveResult::Failed {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
