//! `zp pack`: build the bundle archive.

use super::{CommandError, CommandReport, Context};
use crate::cli::PackArgs;
use crate::vcs::Vcs;
use chrono::Utc;
use std::path::Path;
use tracing::{debug, warn};
use zp_bundle::ArchiveBuilder;

/// Archive tag: the short revision of `HEAD`, else today's UTC date.
pub fn default_tag(root: &Path, vcs: &dyn Vcs) -> String {
    match vcs.short_revision(root) {
        Ok(Some(rev)) if !rev.is_empty() => rev,
        Ok(_) => {
            debug!("Not a git work tree, tagging with the date");
            Utc::now().format("%Y%m%d").to_string()
        }
        Err(e) => {
            warn!(error = %e, "Could not read git revision, tagging with the date");
            Utc::now().format("%Y%m%d").to_string()
        }
    }
}

pub fn run_pack(ctx: &Context, args: &PackArgs, vcs: &dyn Vcs) -> Result<CommandReport, CommandError> {
    let loaded = ctx.layout()?;
    let tag = match &args.tag {
        Some(tag) => tag.clone(),
        None => default_tag(&ctx.root, vcs),
    };
    let out = args.out.clone().unwrap_or_else(|| {
        ctx.root
            .join("dist")
            .join(format!("{}_{}.zip", args.name, tag))
    });

    let build = ArchiveBuilder::new(&loaded.layout)
        .include_data(args.include_data)
        .build(&ctx.root, &out)?;

    let mut report = CommandReport::new("pack");
    for skipped in &build.skipped_optional {
        report.note(format!("[skip] {skipped} (not found)"));
    }
    report.ok(format!(
        "wrote {} ({} files, {} bytes)",
        out.display(),
        build.member_count(),
        build.archive_bytes
    ));
    Ok(report.with_data(&build))
}
