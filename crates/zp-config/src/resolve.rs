//! Project root and bundle layout resolution.
//!
//! Resolution order: CLI arguments → environment variables → project file → defaults.

use crate::load::load_document;
use crate::{ConfigError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;
use zp_bundle::BundleLayout;

/// Where a configuration value was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in the project root.
    ProjectFile,

    /// The process working directory.
    WorkingDirectory,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::ProjectFile => write!(f, "project file"),
            ConfigSource::WorkingDirectory => write!(f, "working directory"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_ROOT: &str = "ZP_ROOT";
pub const ENV_LAYOUT: &str = "ZP_LAYOUT";

/// Layout file looked up in the project root.
pub const LAYOUT_FILENAME: &str = "zp-layout.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoot {
    pub path: PathBuf,
    pub source: ConfigSource,
}

/// Resolve the project root: `--root`, then `ZP_ROOT`, then the working directory.
pub fn resolve_root(cli_root: Option<&Path>) -> Result<ResolvedRoot> {
    resolve_root_from(cli_root, std::env::var_os(ENV_ROOT))
}

/// Root resolution with an explicit environment value.
pub fn resolve_root_from(cli_root: Option<&Path>, env_root: Option<OsString>) -> Result<ResolvedRoot> {
    let (path, source) = if let Some(path) = cli_root {
        (path.to_path_buf(), ConfigSource::CliArgument)
    } else if let Some(env) = env_root.filter(|v| !v.is_empty()) {
        (PathBuf::from(env), ConfigSource::Environment)
    } else {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
            path: PathBuf::from("."),
            source,
        })?;
        (cwd, ConfigSource::WorkingDirectory)
    };

    if !path.is_dir() {
        return Err(ConfigError::RootNotDirectory(path));
    }
    debug!(root = %path.display(), source = %source, "resolved project root");
    Ok(ResolvedRoot { path, source })
}

/// A bundle layout together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedLayout {
    pub layout: BundleLayout,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Load the bundle layout: `--layout`, then `ZP_LAYOUT`, then
/// `<root>/zp-layout.yaml`, then the builtin default.
///
/// An explicitly named layout file that does not exist is an error; a
/// missing project file falls through to the default.
pub fn load_layout(project_root: &Path, cli_layout: Option<&Path>) -> Result<LoadedLayout> {
    load_layout_from(project_root, cli_layout, std::env::var_os(ENV_LAYOUT))
}

/// Layout loading with an explicit environment value.
pub fn load_layout_from(
    project_root: &Path,
    cli_layout: Option<&Path>,
    env_layout: Option<OsString>,
) -> Result<LoadedLayout> {
    let explicit = if let Some(path) = cli_layout {
        Some((path.to_path_buf(), ConfigSource::CliArgument))
    } else {
        env_layout
            .filter(|v| !v.is_empty())
            .map(|v| (PathBuf::from(v), ConfigSource::Environment))
    };

    let (path, source) = match explicit {
        Some((path, origin)) => {
            if !path.is_file() {
                return Err(ConfigError::LayoutNotFound { path, origin });
            }
            (path, origin)
        }
        None => {
            let candidate = project_root.join(LAYOUT_FILENAME);
            if !candidate.is_file() {
                debug!(source = %ConfigSource::BuiltinDefault, "using builtin bundle layout");
                return Ok(LoadedLayout {
                    layout: BundleLayout::default(),
                    path: None,
                    source: ConfigSource::BuiltinDefault,
                });
            }
            (candidate, ConfigSource::ProjectFile)
        }
    };

    let layout: BundleLayout = load_document(&path)?;
    layout.validate()?;
    debug!(layout = %path.display(), source = %source, "loaded bundle layout");
    Ok(LoadedLayout {
        layout,
        path: Some(path),
        source,
    })
}
