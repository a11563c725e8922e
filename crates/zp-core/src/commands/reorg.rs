//! `zp reorg`: move files into the canonical layout.

use super::{CommandError, CommandReport, Context};
use crate::cli::ReorgArgs;
use crate::reorg::{MoveResult, ReorgOptions, ReorgOutcome, Reorganizer};
use crate::vcs::{CodeHost, PullRequest, Vcs};
use zp_config::MovePlan;

fn options(args: &ReorgArgs) -> ReorgOptions {
    ReorgOptions {
        apply: args.apply,
        force: args.force,
        base: args.base.clone(),
        branch: args.branch.clone(),
        commit_message: args.commit_message.clone(),
        push: args.push,
        pull_request: args.open_pr.then(|| PullRequest {
            title: args.title.clone(),
            body: args.body.clone(),
            base: args.base.clone(),
            head: args.branch.clone(),
            repo: args.repo.clone(),
        }),
    }
}

pub fn run_reorg(
    ctx: &Context,
    args: &ReorgArgs,
    vcs: &dyn Vcs,
    host: &dyn CodeHost,
) -> Result<CommandReport, CommandError> {
    let plan = match &args.plan_file {
        Some(path) => MovePlan::load(path)?,
        None => MovePlan::default(),
    };
    let moves = plan.moves(args.preserve_paths)?;

    let reorganizer = Reorganizer::new(&ctx.root, vcs, host);
    let preview = reorganizer.preview(&moves);
    let mut report = CommandReport::new("reorg");
    describe_plan(&mut report, &preview);

    if !args.apply {
        report.note("");
        report.note("[summary] dry run (no changes applied)");
        report.note(format!("  planned: {}", preview.planned()));
        report.note(format!("  missing: {}", preview.missing()));
        report.note("Re-run with --apply to perform moves.");
        return Ok(report.with_data(&preview));
    }

    let outcome = reorganizer.run(&moves, &options(args))?;
    describe_apply(&mut report, &outcome, &args.branch);
    Ok(report.with_data(&outcome))
}

fn describe_plan(report: &mut CommandReport, preview: &ReorgOutcome) {
    report.note("[plan] Proposed moves:");
    for record in &preview.moves {
        let marker = if record.source_present { "✓" } else { "✗" };
        report.note(format!(
            "  {marker} {}  →  {}",
            record.planned.source.display(),
            record.planned.destination.display()
        ));
    }
    if preview.missing() > 0 {
        report.warn("Missing sources:");
        for record in preview.moves.iter().filter(|m| !m.source_present) {
            report.note(format!("  - {}", record.planned.source.display()));
        }
    }
}

fn describe_apply(report: &mut CommandReport, outcome: &ReorgOutcome, branch: &str) {
    for record in &outcome.moves {
        let src = record.planned.source.display();
        let dst = record.planned.destination.display();
        match &record.result {
            MoveResult::Moved => report.note(format!("[moved] {src} → {dst}")),
            MoveResult::AlreadyInPlace => report.ok(format!("{src} already at {dst}")),
            MoveResult::SourceMissing => report.note(format!("[skip] {src} (not found)")),
            MoveResult::Failed { reason } => report.fail(format!("{src} → {dst}: {reason}")),
            MoveResult::Planned => {}
        }
    }

    if outcome.committed {
        report.ok("Commit created.");
    } else {
        report.note("[note] No changes to commit (already organized).");
    }
    if outcome.pushed {
        report.ok(format!("Pushed branch {branch}."));
    }
    for warning in &outcome.warnings {
        report.warn(warning.clone());
    }
    if let Some(url) = &outcome.pull_request {
        report.ok("Pull request opened.");
        if !url.is_empty() {
            report.note(url.clone());
        }
    }

    report.note("");
    report.note("[summary] apply complete");
    report.note(format!("  moved:   {}", outcome.moved()));
    report.note(format!("  skipped: {}", outcome.skipped()));
    report.note(format!("  errors:  {}", outcome.errors()));
}
