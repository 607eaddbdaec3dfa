//! CLI module for the conformance runner
//!
//! ## Usage
//!
//! `conformance-runner [--showall] [TARGET_ARGS...]`
//!
//! - `--showall` (anywhere, any number of times) prints the detail block for every fixture.
//! - Every other argument is forwarded unchanged, in order, to the target executable for each fixture. The
//!   runner does not interpret `--help`, `--version` or `--`.
//!
//! ## Modules
//!
//! - `test_interfaces` - Discovery/execution traits and their default implementations
//! - `test_runner` - The fixture loop and console reporting
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros. Arguments are normalized first so that clap only
//! ever sees `--showall` and an escaped list of forwarded values.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod test_interfaces;
pub mod test_runner;

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::process;

use clap::Parser;

use crate::config::{ConfigError, RunnerConfig};
use test_interfaces::RunnerError;
use test_runner::RunOptions;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<RunnerError> for CliError {
    fn from(e: RunnerError) -> Self {
        CliError::failure(format!("error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::failure(format!("error: {}", e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = crate::version::RUNNER_VERSION;
const BIN_NAME: &str = "conformance-runner";

/// The only flag the runner itself understands.
pub const SHOW_ALL_FLAG: &str = "--showall";

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run conformance fixtures through a compiler or interpreter
#[derive(Parser, Debug)]
#[command(name = BIN_NAME)]
#[command(version = VERSION)]
#[command(about = "Run conformance fixtures through a compiler or interpreter", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Print the full report for every fixture, not only failures
    #[arg(long = "showall")]
    pub show_all: bool,

    /// Arguments forwarded to the target executable
    #[arg(value_name = "TARGET_ARGS", allow_hyphen_values = true)]
    pub target_args: Vec<OsString>,
}

impl Cli {
    /// Parse a full argument list (program name first).
    pub fn from_invocation<I, T>(args: I) -> CliResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Cli::try_parse_from(normalize_args(args)).map_err(|e| CliError::failure(e.to_string()))
    }
}

/// Pull every `--showall` out and escape the rest behind `--`.
///
/// The result is `[program, ("--showall")?, "--", forwarded...]`, so a forwarded `--help` or `--` reaches the
/// target instead of clap.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let program = args.next().unwrap_or_else(|| OsString::from(BIN_NAME));

    let mut show_all = false;
    let mut forwarded = Vec::new();
    for arg in args {
        if arg == SHOW_ALL_FLAG {
            show_all = true;
        } else {
            forwarded.push(arg);
        }
    }

    let mut normalized = vec![program];
    if show_all {
        normalized.push(OsString::from(SHOW_ALL_FLAG));
    }
    normalized.push(OsString::from("--"));
    normalized.extend(forwarded);
    normalized
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    match Cli::from_invocation(env::args_os()).and_then(execute) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Load configuration and run the fixtures.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = RunnerConfig::load()?;
    tracing::debug!(
        fixture_dir = %config.fixture_dir.display(),
        program = %config.target.program.display(),
        forwarded = cli.target_args.len(),
        "starting run"
    );

    let options = RunOptions {
        show_all: cli.show_all,
        target_args: cli.target_args,
    };
    test_runner::run_fixtures(&config, &options)
}

// ============================================================================
// Tests
// ============================================================================
