//! Command-line surface of the `zp` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use zp_common::OutputFormat;
use zp_config::plan::{
    DEFAULT_BASE, DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE, DEFAULT_PR_BODY, DEFAULT_PR_TITLE,
};

/// Package, checksum and verify a paper's reproducibility bundle
#[derive(Parser, Debug)]
#[command(name = "zp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Project root [env: ZP_ROOT] (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Bundle layout file, YAML or JSON [env: ZP_LAYOUT] (default: <root>/zp-layout.yaml, else builtin)
    #[arg(long, global = true, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the SHA-256 checksum manifest for the bundle
    Checksums(ChecksumsArgs),

    /// Build the bundle archive
    Pack(PackArgs),

    /// Verify archives against checksum manifests
    Verify(VerifyArgs),

    /// Validate CITATION.cff and zenodo.json before packaging
    Preflight(PreflightArgs),

    /// Summarize the datasets declared in a manifest
    Summary(SummaryArgs),

    /// Move files into the dist/, scripts/, reports/ layout
    Reorg(ReorgArgs),
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct ChecksumsArgs {
    /// Include data subtrees (writes the data manifest by default)
    #[arg(long)]
    pub include_data: bool,

    /// Manifest path, relative to the project root (default: reports/checksums_SHA256[_data].txt)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PackArgs {
    /// Archive path (default: <root>/dist/<name>_<tag>.zip)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Archive tag (default: short git revision, else UTC date YYYYMMDD)
    #[arg(long)]
    pub tag: Option<String>,

    /// Archive base name
    #[arg(long, default_value = "plr_zenodo")]
    pub name: String,

    /// Include data subtrees
    #[arg(long)]
    pub include_data: bool,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Checksum manifest; repeatable, later manifests win (default: the manifests under <root>/reports)
    #[arg(long = "manifest", value_name = "PATH")]
    pub manifests: Vec<PathBuf>,

    /// Archives to verify
    #[arg(required = true, value_name = "ARCHIVE")]
    pub archives: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PreflightArgs {
    /// CITATION.cff path (default: <root>/dist/CITATION.cff)
    #[arg(long, value_name = "PATH")]
    pub citation: Option<PathBuf>,

    /// zenodo.json path (default: <root>/dist/zenodo.json)
    #[arg(long, value_name = "PATH")]
    pub zenodo: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// YAML manifest with a `figures: [{input, kind}]` list
    #[arg(long, value_name = "YAML")]
    pub manifest: PathBuf,

    /// Also write the CSV table here
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Print a pipe table to stderr (and write it next to --out as .md)
    #[arg(long)]
    pub markdown: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReorgArgs {
    /// Move plan, JSON or YAML mapping folder -> [files]
    #[arg(long, value_name = "PATH")]
    pub plan_file: Option<PathBuf>,

    /// Keep nested source paths under the target folder
    #[arg(long)]
    pub preserve_paths: bool,

    /// Perform the moves (default is a dry run)
    #[arg(long)]
    pub apply: bool,

    /// Proceed even if the work tree is dirty
    #[arg(long)]
    pub force: bool,

    #[arg(long, default_value = DEFAULT_BASE)]
    pub base: String,

    #[arg(long, default_value = DEFAULT_BRANCH)]
    pub branch: String,

    #[arg(long, default_value = DEFAULT_COMMIT_MESSAGE)]
    pub commit_message: String,

    /// Push the branch after committing
    #[arg(long)]
    pub push: bool,

    /// Open a pull request with gh
    #[arg(long)]
    pub open_pr: bool,

    #[arg(long, default_value = DEFAULT_PR_TITLE)]
    pub title: String,

    #[arg(long, default_value = DEFAULT_PR_BODY)]
    pub body: String,

    /// owner/repo the pull request targets
    #[arg(long, value_name = "OWNER/REPO")]
    pub repo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verify_requires_archive() {
        assert!(Cli::try_parse_from(["zp", "verify"]).is_err());
        let cli = Cli::try_parse_from([
            "zp", "verify", "--manifest", "a.txt", "--manifest", "b.txt", "x.zip",
        ])
        .unwrap();
        match cli.command {
            Commands::Verify(args) => {
                assert_eq!(args.manifests.len(), 2);
                assert_eq!(args.archives, vec![PathBuf::from("x.zip")]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["zp", "checksums", "--format", "json", "-vv"]).unwrap();
        assert_eq!(cli.global.format, OutputFormat::Json);
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn test_reorg_defaults() {
        let cli = Cli::try_parse_from(["zp", "reorg"]).unwrap();
        match cli.command {
            Commands::Reorg(args) => {
                assert!(!args.apply);
                assert_eq!(args.base, "main");
                assert_eq!(args.branch, DEFAULT_BRANCH);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_root_and_layout_are_flag_only() {
        // ZP_ROOT and ZP_LAYOUT are read during resolution, not by the parser.
        let cli = Cli::try_parse_from(["zp", "checksums"]).unwrap();
        assert!(cli.global.root.is_none());
        assert!(cli.global.layout.is_none());
    }
}
