//! Command runners.
//!
//! Each `run_*` function does its work and returns a [`CommandReport`];
//! nothing here prints. [`execute`] wires a parsed [`Cli`] to the runners
//! and [`emit`] writes the report in the requested format. Errors never
//! cross this boundary: they become a `[fail]` line and an [`ExitCode`].

mod checksums;
mod pack;
mod preflight;
mod reorg;
mod summary;
mod verify;

pub use checksums::run_checksums;
pub use pack::{default_tag, run_pack};
pub use preflight::run_preflight;
pub use reorg::run_reorg;
pub use summary::run_summary;
pub use verify::run_verify;

use crate::cli::{Cli, Commands, GlobalOpts};
use crate::exit_codes::ExitCode;
use crate::vcs::{CodeHost, Vcs, VcsError};
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use zp_bundle::BundleError;
use zp_common::{OutputFormat, StatusLine, StatusLog};
use zp_config::{load_layout, resolve_root, ConfigError, LoadedLayout};

/// Errors that end a command early.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error("no checksum manifests found in {0}")]
    NoManifests(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CommandError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            CommandError::Config(_) | CommandError::NoManifests(_) => ExitCode::ConfigError,
            CommandError::Bundle(e) if e.is_configuration() => ExitCode::ConfigError,
            CommandError::Bundle(BundleError::Io(_) | BundleError::FileIo { .. }) => {
                ExitCode::IoError
            }
            CommandError::Bundle(_) => ExitCode::InternalError,
            CommandError::Vcs(VcsError::DirtyWorktree | VcsError::Unavailable { .. }) => {
                ExitCode::ConfigError
            }
            CommandError::Vcs(VcsError::CommandFailed { .. }) => ExitCode::InternalError,
            CommandError::Io { .. } => ExitCode::IoError,
        }
    }
}

/// Per-invocation state shared by the runners.
#[derive(Debug, Clone)]
pub struct Context {
    pub root: PathBuf,
    layout_arg: Option<PathBuf>,
}

impl Context {
    pub fn new(root: impl Into<PathBuf>, layout_arg: Option<PathBuf>) -> Self {
        Self {
            root: root.into(),
            layout_arg,
        }
    }

    /// Resolve the project root from the global options.
    pub fn from_global(global: &GlobalOpts) -> Result<Self, CommandError> {
        let root = resolve_root(global.root.as_deref())?;
        Ok(Self::new(root.path, global.layout.clone()))
    }

    /// Load the bundle layout; only the packaging commands need it.
    pub fn layout(&self) -> Result<LoadedLayout, CommandError> {
        Ok(load_layout(&self.root, self.layout_arg.as_deref())?)
    }

    /// A user-supplied path, or `default` under the project root.
    pub fn path_or(&self, given: Option<&Path>, default: &str) -> PathBuf {
        given
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.join(default))
    }
}

/// Everything a command produced.
#[derive(Debug, Clone)]
pub struct CommandReport {
    pub command: &'static str,
    pub exit: ExitCode,
    pub status: StatusLog,
    /// Machine-readable payload for `--format json`.
    pub data: serde_json::Value,
    /// Human stdout, in order.
    text: Vec<String>,
    /// Human stderr extras.
    diagnostics: Vec<String>,
}

impl CommandReport {
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            exit: ExitCode::Clean,
            status: StatusLog::new(),
            data: serde_json::Value::Null,
            text: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Record a status line and show it in text output.
    pub fn line(&mut self, line: StatusLine) {
        self.text.push(line.to_string());
        self.status.push(line);
    }

    pub fn ok(&mut self, message: impl Into<String>) {
        self.line(StatusLine::ok(message));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.line(StatusLine::warn(message));
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.line(StatusLine::fail(message));
    }

    /// Text-only output line.
    pub fn note(&mut self, line: impl Into<String>) {
        self.text.push(line.into());
    }

    /// Text written to stderr in text mode.
    pub fn diagnostic(&mut self, text: impl Into<String>) {
        self.diagnostics.push(text.into());
    }

    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        self.data = serde_json::to_value(data).unwrap_or_else(|e| json!({ "error": e.to_string() }));
        self
    }

    pub fn text(&self) -> String {
        let mut out = self.text.join("\n");
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "command": self.command,
            "exit_code": self.exit.as_i32(),
            "code": self.exit.code_name(),
            "status": self.status.lines,
            "data": self.data,
        })
    }
}

/// Run the parsed command with the given collaborators.
pub fn execute(cli: &Cli, vcs: &dyn Vcs, host: &dyn CodeHost) -> Result<CommandReport, CommandError> {
    let ctx = Context::from_global(&cli.global)?;
    debug!(root = %ctx.root.display(), "Running command");
    match &cli.command {
        Commands::Checksums(args) => run_checksums(&ctx, args),
        Commands::Pack(args) => run_pack(&ctx, args, vcs),
        Commands::Verify(args) => run_verify(&ctx, args),
        Commands::Preflight(args) => run_preflight(&ctx, args),
        Commands::Summary(args) => run_summary(&ctx, args),
        Commands::Reorg(args) => run_reorg(&ctx, args, vcs, host),
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Checksums(_) => "checksums",
        Commands::Pack(_) => "pack",
        Commands::Verify(_) => "verify",
        Commands::Preflight(_) => "preflight",
        Commands::Summary(_) => "summary",
        Commands::Reorg(_) => "reorg",
    }
}

/// Write the outcome of a command and return its exit code.
pub fn emit<O: Write, E: Write>(
    cli: &Cli,
    result: Result<CommandReport, CommandError>,
    stdout: &mut O,
    stderr: &mut E,
) -> ExitCode {
    let format = cli.global.format;
    let outcome = match result {
        Ok(report) => {
            match format {
                OutputFormat::Text => {
                    let _ = stdout.write_all(report.text().as_bytes());
                    for diag in &report.diagnostics {
                        let _ = writeln!(stderr, "{diag}");
                    }
                }
                OutputFormat::Json => {
                    let _ = writeln!(stdout, "{:#}", report.to_json());
                }
            }
            report.exit
        }
        Err(err) => {
            let code = err.exit_code();
            match format {
                OutputFormat::Text => {
                    let _ = writeln!(stderr, "{}", StatusLine::fail(err.to_string()));
                }
                OutputFormat::Json => {
                    let doc = json!({
                        "command": command_name(&cli.command),
                        "exit_code": code.as_i32(),
                        "code": code.code_name(),
                        "error": err.to_string(),
                    });
                    let _ = writeln!(stdout, "{doc:#}");
                }
            }
            code
        }
    };
    let _ = stdout.flush();
    outcome
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    pub fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Small project matching the builtin layout.
    pub fn paper_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "main.pdf", "%PDF main");
        touch(root, "supplemental.pdf", "%PDF supp");
        touch(root, "README.md", "# paper");
        touch(root, "Makefile", "all:\n");
        touch(root, "reports/notes.txt", "notes");
        touch(root, "scripts/run.py", "print('hi')\n");
        touch(root, "figs/plot.pdf", "%PDF fig");
        touch(root, "figs/plot.png", "png");
        touch(root, "data/d.csv", "u,residual,sigma\n1,0.1,1\n");
        dir
    }
}
