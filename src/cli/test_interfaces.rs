//! Test runner I/O boundary interfaces
//!
//! This module defines trait-based abstractions for the two operations that touch the outside world:
//! - Fixture discovery (directory listing)
//! - Fixture execution (spawning the target with the fixture on stdin)
//!
//! The loop in `test_runner` only sees these traits, so it can be driven by in-memory fakes in tests.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{ChildStdin, Command, ExitStatus, Stdio};
use std::string::FromUtf8Error;
use std::thread;

use conformance_core::{ExecutionResult, Fixture};
use thiserror::Error;

use crate::config::TargetConfig;

/// Errors that abort the whole run
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("cannot read fixture directory '{}': {source}", .dir.display())]
    Discovery {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read fixture '{}': {source}", .path.display())]
    ReadFixture {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("fixture '{}' is not valid UTF-8: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },

    #[error("failed to launch target '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to collect output of target '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report: {0}")]
    Report(#[from] io::Error),
}

// ============================================================================
// Fixture Discovery Interface
// ============================================================================

/// Find the fixtures to run.
pub trait FixtureDiscovery {
    /// List fixtures in `dir` (non-recursive).
    fn discover_fixtures(&self, dir: &Path) -> Result<Vec<Fixture>, RunnerError>;
}

// ============================================================================
// Fixture Executor Interface
// ============================================================================

/// Run the target once for a fixture and capture what it did.
pub trait FixtureExecutor {
    fn execute_fixture(&self, fixture: &Fixture) -> Result<ExecutionResult, RunnerError>;
}

// ============================================================================
// Default Implementations
// ============================================================================

/// Filesystem discovery: every regular file directly inside the directory.
pub struct DefaultFixtureDiscovery {
    negative_prefix: String,
}

impl DefaultFixtureDiscovery {
    pub fn new(negative_prefix: impl Into<String>) -> Self {
        Self {
            negative_prefix: negative_prefix.into(),
        }
    }
}

impl FixtureDiscovery for DefaultFixtureDiscovery {
    #[tracing::instrument(skip_all, fields(dir = %dir.display()))]
    fn discover_fixtures(&self, dir: &Path) -> Result<Vec<Fixture>, RunnerError> {
        let discovery_err = |source| RunnerError::Discovery {
            dir: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(discovery_err)? {
            let path = entry.map_err(discovery_err)?.path();
            if !path.is_file() {
                tracing::debug!(path = %path.display(), "skipping non-file entry");
                continue;
            }
            paths.push(path);
        }

        // Directory order is unspecified; sort for stable reports.
        paths.sort();

        let fixtures: Vec<Fixture> = paths
            .into_iter()
            .map(|path| Fixture::from_path(path, &self.negative_prefix))
            .collect();

        tracing::debug!(count = fixtures.len(), "discovered fixtures");
        Ok(fixtures)
    }
}

/// Spawns the configured target as a child process.
///
/// The command line is `<program> <configured args> <forwarded args>`.
pub struct ProcessExecutor {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessExecutor {
    pub fn new(target: &TargetConfig, forwarded_args: &[OsString]) -> Self {
        let args = target
            .args
            .iter()
            .map(OsString::from)
            .chain(forwarded_args.iter().cloned())
            .collect();

        Self {
            program: target.program.clone(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl FixtureExecutor for ProcessExecutor {
    #[tracing::instrument(skip_all, fields(fixture = %fixture.path.display()))]
    fn execute_fixture(&self, fixture: &Fixture) -> Result<ExecutionResult, RunnerError> {
        let input = read_fixture_input(&fixture.path)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Launch {
                program: self.program_name(),
                source,
            })?;

        // Feed stdin from a helper thread while this one drains stdout/stderr, so neither pipe can fill up and
        // stall the child.
        let stdin = child.stdin.take();
        let (fed, output) = thread::scope(|scope| {
            let feeder = scope.spawn(|| feed_stdin(stdin, input.as_bytes()));
            let output = child.wait_with_output();
            (feeder.join(), output)
        });

        let wait_err = |source| RunnerError::Wait {
            program: self.program_name(),
            source,
        };
        let output = output.map_err(wait_err)?;
        match fed {
            Ok(result) => result.map_err(wait_err)?,
            Err(_) => return Err(wait_err(io::Error::other("stdin writer panicked"))),
        }

        let exit_code = exit_code_of(output.status);
        tracing::debug!(exit_code, "target exited");

        Ok(ExecutionResult {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Read a fixture as UTF-8 text.
pub fn read_fixture_input(path: &Path) -> Result<String, RunnerError> {
    let bytes = fs::read(path).map_err(|source| RunnerError::ReadFixture {
        path: path.to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|source| RunnerError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn feed_stdin(stdin: Option<ChildStdin>, input: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };

    // A target that exits without reading its input is not an error.
    match stdin.write_all(input) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Exit code of a finished process; a signal termination maps to the negated signal number.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use conformance_core::FixtureKind;

    #[test]
    fn test_discovery_missing_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("test");

        let err = DefaultFixtureDiscovery::new("fail_").discover_fixtures(&missing).unwrap_err();
        assert!(matches!(err, RunnerError::Discovery { .. }));
        assert!(err.to_string().contains("cannot read fixture directory"));
    }

    #[test]
    fn test_discovery_lists_files_only_and_derives_kind() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok_basic"), "int main() { return 0; }\n").unwrap();
        fs::write(dir.path().join("fail_syntax"), "int main( {\n").unwrap();
        fs::create_dir(dir.path().join("fail_nested")).unwrap();
        fs::write(dir.path().join("fail_nested").join("ok_hidden"), "").unwrap();

        let fixtures = DefaultFixtureDiscovery::new("fail_").discover_fixtures(dir.path()).unwrap();

        assert_eq!(
            fixtures,
            vec![
                Fixture::new(dir.path().join("fail_syntax"), FixtureKind::ExpectFailure),
                Fixture::new(dir.path().join("ok_basic"), FixtureKind::ExpectSuccess),
            ]
        );
    }

    #[test]
    fn test_discovery_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let fixtures = DefaultFixtureDiscovery::new("fail_").discover_fixtures(dir.path()).unwrap();
        assert!(fixtures.is_empty());
    }

    #[test]
    fn test_read_fixture_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok_binary");
        fs::write(&path, [0x66, 0x6f, 0xff, 0xfe]).unwrap();

        let err = read_fixture_input(&path).unwrap_err();
        assert!(matches!(err, RunnerError::Decode { .. }));
    }

    #[test]
    fn test_executor_argument_order() {
        let target = TargetConfig {
            program: PathBuf::from("mono"),
            args: vec!["Frontend.exe".to_string()],
        };
        let forwarded = vec![OsString::from("--emit-ir"), OsString::from("-O2")];

        let executor = ProcessExecutor::new(&target, &forwarded);
        assert_eq!(executor.program(), Path::new("mono"));
        assert_eq!(executor.args(), &["Frontend.exe", "--emit-ir", "-O2"].map(OsString::from));
    }

    #[test]
    fn test_executor_missing_program_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok_basic");
        fs::write(&path, "x\n").unwrap();

        let target = TargetConfig {
            program: dir.path().join("no-such-frontend"),
            args: Vec::new(),
        };
        let err = ProcessExecutor::new(&target, &[])
            .execute_fixture(&Fixture::new(path, FixtureKind::ExpectSuccess))
            .unwrap_err();
        assert!(matches!(err, RunnerError::Launch { .. }));
    }

    #[cfg(unix)]
    fn sh_target(script: &str) -> TargetConfig {
        TargetConfig {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_executor_pipes_fixture_and_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok_echo");
        fs::write(&path, "hello from fixture\n").unwrap();

        let target = sh_target("cat; echo oops >&2; exit 3");
        let result = ProcessExecutor::new(&target, &[])
            .execute_fixture(&Fixture::new(path, FixtureKind::ExpectSuccess))
            .unwrap();

        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stdout, "hello from fixture\n");
        assert_eq!(result.stderr, "oops\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_executor_decodes_invalid_output_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok_bytes");
        fs::write(&path, "").unwrap();

        let result = ProcessExecutor::new(&sh_target("printf 'a\\377b'; printf 'c\\376' >&2"), &[])
            .execute_fixture(&Fixture::new(path, FixtureKind::ExpectSuccess))
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "a\u{FFFD}b");
        assert_eq!(result.stderr, "c\u{FFFD}");
    }

    #[cfg(unix)]
    #[test]
    fn test_executor_forwards_args_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok_args");
        fs::write(&path, "").unwrap();

        let forwarded = ["--", "--help", "two words"].map(OsString::from);
        let result = ProcessExecutor::new(&sh_target("printf '%s\\n' \"$@\""), &forwarded)
            .execute_fixture(&Fixture::new(path, FixtureKind::ExpectSuccess))
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "--\n--help\ntwo words\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_executor_ignores_unread_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok_large");
        fs::write(&path, "x".repeat(1 << 20)).unwrap();

        let result = ProcessExecutor::new(&sh_target("exit 0"), &[])
            .execute_fixture(&Fixture::new(path, FixtureKind::ExpectSuccess))
            .unwrap();
        assert_eq!(result.exit_code, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_executor_reports_signal_as_negative_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok_killed");
        fs::write(&path, "").unwrap();

        let result = ProcessExecutor::new(&sh_target("kill -9 $$"), &[])
            .execute_fixture(&Fixture::new(path, FixtureKind::ExpectSuccess))
            .unwrap();
        assert_eq!(result.exit_code, -9);
    }
}
