//! `zp verify`: check archives against checksum manifests.

use super::{CommandError, CommandReport, Context};
use crate::cli::VerifyArgs;
use crate::exit_codes::ExitCode;
use serde::Serialize;
use std::path::PathBuf;
use zp_bundle::{ArchiveOutcome, ArchiveReport, ArchiveVerifier, ChecksumManifest, EntryStatus};

#[derive(Debug, Serialize)]
struct VerifyData<'a> {
    manifests: &'a [PathBuf],
    entries: usize,
    passed: bool,
    archives: &'a [ArchiveReport],
}

pub fn run_verify(ctx: &Context, args: &VerifyArgs) -> Result<CommandReport, CommandError> {
    let loaded = ctx.layout()?;
    let layout = &loaded.layout;

    let manifests = if args.manifests.is_empty() {
        layout.existing_manifests(&ctx.root)
    } else {
        args.manifests.clone()
    };
    if manifests.is_empty() {
        return Err(CommandError::NoManifests(ctx.root.join(&layout.manifest_dir)));
    }

    let (manifest, conflicts) = ChecksumManifest::load_all(&manifests)?;
    let mut report = CommandReport::new("verify");
    for conflict in &conflicts {
        report.warn(format!(
            "checksum for {} differs between manifests; using {}",
            conflict.relative_path, conflict.replacement
        ));
    }

    let summary = ArchiveVerifier::new(&manifest, &layout.root_folder).verify_all(&args.archives);
    for archive in &summary.archives {
        describe_archive(&mut report, archive);
    }

    if summary.all_passed() {
        report.ok("all archives verified");
    } else {
        report.fail("one or more archives failed verification");
        report.exit = ExitCode::CheckFailed;
    }

    Ok(report.with_data(&VerifyData {
        manifests: &manifests,
        entries: manifest.len(),
        passed: summary.all_passed(),
        archives: &summary.archives,
    }))
}

fn describe_archive(report: &mut CommandReport, archive: &ArchiveReport) {
    let shown = archive.archive.display();
    match &archive.outcome {
        ArchiveOutcome::NotFound => report.fail(format!("archive {shown} not found")),
        ArchiveOutcome::Unreadable { reason } => {
            report.fail(format!("archive {shown} unreadable: {reason}"))
        }
        ArchiveOutcome::Checked { entries } => {
            report.note(format!("=== Verifying {shown} ==="));
            for entry in entries {
                match &entry.status {
                    EntryStatus::Ok => report.ok(entry.archive_path.clone()),
                    EntryStatus::Mismatch { .. } => {
                        report.fail(format!("checksum mismatch for {}", entry.archive_path))
                    }
                    EntryStatus::Missing => {
                        report.fail(format!("missing {} in archive", entry.archive_path))
                    }
                    EntryStatus::Corrupt { reason } => report.fail(format!(
                        "unreadable member {}: {reason}",
                        entry.archive_path
                    )),
                }
            }
            let name = archive
                .archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| shown.to_string());
            if archive.passed() {
                report.note(format!(
                    "Summary for {name}: ✓ {} files verified",
                    archive.verified_count()
                ));
            } else {
                report.note(format!(
                    "Summary for {name}: ✗ {} failed, {} ok",
                    archive.failed_count(),
                    archive.verified_count()
                ));
            }
        }
    }
}
