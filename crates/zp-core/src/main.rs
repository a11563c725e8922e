//! zp - reproducibility bundle tooling
//!
//! Entry point for the `zp` binary.

use clap::error::ErrorKind;
use clap::Parser;
use zp_core::cli::Cli;
use zp_core::commands::{emit, execute};
use zp_core::exit_codes::ExitCode;
use zp_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use zp_core::vcs::{GhCli, GitCli};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Clean,
                _ => ExitCode::ArgsError,
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    // JSON on stdout pairs with JSONL logs on stderr.
    let log_level = LogLevel::from_flags(cli.global.verbose, cli.global.quiet);
    let log_format = cli.global.format.is_machine().then_some(LogFormat::Jsonl);
    init_logging(&LogConfig::from_env(log_level, log_format));

    let result = execute(&cli, &GitCli, &GhCli);
    let exit_code = emit(
        &cli,
        result,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    );
    std::process::exit(exit_code.as_i32());
}
