//! `zp checksums`: hash the bundle and write its manifest.

use super::{CommandError, CommandReport, Context};
use crate::cli::ChecksumsArgs;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use zp_bundle::{default_header, BundleError, BundleLayout, ChecksumManifest, ResolveOptions};

#[derive(Debug, Serialize)]
struct ChecksumsData {
    manifest: PathBuf,
    files: usize,
    missing_mandatory: Vec<String>,
    layout_source: String,
}

/// Resolve the layout, hash every member and write the manifest.
///
/// Missing mandatory files are reported but do not stop the manifest; the
/// packaging step is where they are fatal. A relative `--out` is taken from
/// the project root, and the manifest never lists itself.
pub fn run_checksums(ctx: &Context, args: &ChecksumsArgs) -> Result<CommandReport, CommandError> {
    let loaded = ctx.layout()?;
    let layout = &loaded.layout;
    let mut report = CommandReport::new("checksums");
    let out = args
        .out
        .as_ref()
        .map(|p| ctx.root.join(p))
        .unwrap_or_else(|| layout.manifest_path(&ctx.root, args.include_data));

    let resolved = layout
        .resolve(
            &ctx.root,
            ResolveOptions {
                include_data: args.include_data,
            },
        )?
        .without_file_names(&BundleLayout::manifest_file_names())
        .without_source(&out);

    for missing in &resolved.missing_mandatory {
        report.warn(format!("missing {missing}"));
    }
    if resolved.is_empty() {
        return Err(BundleError::NothingGathered(ctx.root.clone()).into());
    }

    let manifest = ChecksumManifest::from_entries(&resolved.entries)?;
    manifest.write(&out, Some(&default_header(&layout.root_folder)))?;
    info!(path = %out.display(), files = manifest.len(), "Checksums written");

    report.ok(format!("wrote {} ({} files)", out.display(), manifest.len()));
    Ok(report.with_data(&ChecksumsData {
        manifest: out,
        files: manifest.len(),
        missing_mandatory: resolved.missing_mandatory,
        layout_source: loaded.source.to_string(),
    }))
}
