//! Fixture runner implementation
//!
//! ## TestReporter Trait
//!
//! The runner uses a `TestReporter` trait to separate reporting from execution. `ConsoleReporter` writes the
//! human-readable report; other formats can be added by implementing the trait.
//!
//! ## I/O Boundaries
//!
//! Discovery and execution go through the traits in `test_interfaces.rs`, so [`run_with`] can be exercised
//! without a filesystem or a target binary.
//!
//! ## Execution model
//!
//! Fixtures run one at a time, in discovery order. A failing fixture is recorded and the loop moves on; a
//! [`RunnerError`] (unreadable directory, undecodable fixture, target that cannot be launched) stops the run.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;

use conformance_core::{ClassificationPolicy, ExecutionResult, Fixture, RunSummary, Verdict};

use super::test_interfaces::{DefaultFixtureDiscovery, FixtureDiscovery, FixtureExecutor, ProcessExecutor, RunnerError};
use super::{CliError, CliResult, ExitCode};
use crate::config::RunnerConfig;

const SEPARATOR_WIDTH: usize = 80;
const ERASE_LINE: &str = "\x1b[2K";
const COLOR_RED: &str = "\x1b[0;31m";
const COLOR_GREEN: &str = "\x1b[0;32m";
const COLOR_CLEAR: &str = "\x1b[0m";

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting fixture results.
pub trait TestReporter {
    /// Called before the target is launched for a fixture
    fn on_fixture_start(&mut self, fixture: &Fixture) -> io::Result<()>;

    /// Called when a fixture could not be executed and the run is about to stop
    fn on_fixture_aborted(&mut self, _fixture: &Fixture) -> io::Result<()> {
        Ok(())
    }

    /// Called once a fixture has been executed and classified
    fn on_fixture_complete(
        &mut self,
        fixture: &Fixture,
        result: &ExecutionResult,
        verdict: Verdict,
    ) -> io::Result<()>;

    /// Called when all fixtures have completed
    fn on_run_complete(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Default console reporter.
///
/// Shows a transient `Testing <path>...` line per fixture, a detail block for failures (or for every fixture with
/// `show_all`), and a closing banner.
pub struct ConsoleReporter<W: Write> {
    out: W,
    show_all: bool,
    color: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, show_all: bool, color: bool) -> Self {
        Self { out, show_all, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn tag(&self, verdict: Verdict) -> String {
        if !self.color {
            return verdict.as_str().to_string();
        }
        let color = match verdict {
            Verdict::Pass => COLOR_GREEN,
            Verdict::Fail => COLOR_RED,
        };
        format!("{}{}{}", color, verdict, COLOR_CLEAR)
    }

    fn erase_status_line(&mut self) -> io::Result<()> {
        write!(self.out, "\r{}", ERASE_LINE)
    }
}

impl<W: Write> TestReporter for ConsoleReporter<W> {
    fn on_fixture_start(&mut self, fixture: &Fixture) -> io::Result<()> {
        write!(self.out, "Testing {}...", fixture.path.display())?;
        self.out.flush()
    }

    fn on_fixture_aborted(&mut self, _fixture: &Fixture) -> io::Result<()> {
        self.erase_status_line()?;
        self.out.flush()
    }

    fn on_fixture_complete(
        &mut self,
        fixture: &Fixture,
        result: &ExecutionResult,
        verdict: Verdict,
    ) -> io::Result<()> {
        self.erase_status_line()?;

        if !verdict.is_pass() || self.show_all {
            let separator = "-".repeat(SEPARATOR_WIDTH);
            let tag = self.tag(verdict);

            writeln!(self.out)?;
            writeln!(self.out, "{}", separator)?;
            writeln!(self.out, "[{}] {}", tag, fixture.path.display())?;
            writeln!(self.out, "{}", separator)?;
            writeln!(self.out, "stdout: \n{}", result.stdout)?;
            writeln!(self.out, "stderr: \n{}", result.stderr)?;
            writeln!(self.out, "rv: {}", result.exit_code)?;
            writeln!(self.out)?;
        }

        self.out.flush()
    }

    fn on_run_complete(&mut self, summary: &RunSummary) -> io::Result<()> {
        let separator = "=".repeat(SEPARATOR_WIDTH);
        writeln!(self.out, "{}", separator)?;

        if summary.is_success() {
            writeln!(self.out, " ** {} **", self.tag(Verdict::Pass))?;
        } else {
            writeln!(self.out, " ** {} **", self.tag(Verdict::Fail))?;
            writeln!(self.out, "Failed tests:")?;
            for path in summary.failed() {
                writeln!(self.out, "{}", path.display())?;
            }
        }

        writeln!(self.out, "{}", separator)?;
        self.out.flush()
    }
}

/// Per-invocation options taken from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Print the detail block for passing fixtures too
    pub show_all: bool,
    /// Appended to the target's command line for every fixture
    pub target_args: Vec<OsString>,
}

/// Run every fixture in the configured directory and report to stdout.
pub fn run_fixtures(config: &RunnerConfig, options: &RunOptions) -> CliResult<ExitCode> {
    let discovery = DefaultFixtureDiscovery::new(config.negative_prefix.clone());
    let executor = ProcessExecutor::new(&config.target, &options.target_args);

    let stdout = io::stdout();
    let mut reporter = ConsoleReporter::new(stdout.lock(), options.show_all, config.color.enabled());

    let summary = run_with(&discovery, &executor, &mut reporter, &config.fixture_dir, config.policy())?;

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Failures were already reported; exit non-zero without a message.
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

/// Discover, execute, classify and report, strictly one fixture at a time.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn run_with<D, E, R>(
    discovery: &D,
    executor: &E,
    reporter: &mut R,
    dir: &Path,
    policy: ClassificationPolicy,
) -> Result<RunSummary, RunnerError>
where
    D: FixtureDiscovery + ?Sized,
    E: FixtureExecutor + ?Sized,
    R: TestReporter + ?Sized,
{
    let fixtures = discovery.discover_fixtures(dir)?;
    if fixtures.is_empty() {
        tracing::warn!("no fixtures found");
    }

    let mut summary = RunSummary::new();

    for fixture in &fixtures {
        reporter.on_fixture_start(fixture)?;

        let result = match executor.execute_fixture(fixture) {
            Ok(result) => result,
            Err(e) => {
                // The execution error is the one worth surfacing.
                if let Err(report_err) = reporter.on_fixture_aborted(fixture) {
                    tracing::debug!(error = %report_err, "failed to clear status line");
                }
                return Err(e);
            }
        };

        let verdict = policy.classify(fixture.kind, result.exit_code);
        tracing::debug!(
            fixture = %fixture.path.display(),
            exit_code = result.exit_code,
            %verdict,
            "classified fixture"
        );

        reporter.on_fixture_complete(fixture, &result, verdict)?;
        summary.record(fixture, verdict);
    }

    reporter.on_run_complete(&summary)?;
    Ok(summary)
}

// ============================================================================
// Tests
// ============================================================================
