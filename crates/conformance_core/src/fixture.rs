//! Fixtures and the captured outcome of running one.

use std::path::PathBuf;

/// File-name prefix marking a fixture the target is expected to reject.
pub const DEFAULT_NEGATIVE_PREFIX: &str = "fail_";

/// What a fixture expects from the target executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixtureKind {
    /// The target should accept the input (exit code `0`).
    #[default]
    ExpectSuccess,
    /// The target should reject the input (nonzero exit code).
    ExpectFailure,
}

impl FixtureKind {
    /// Derive the kind from a bare file name.
    ///
    /// ## Examples
    ///
    /// ```
    /// use conformance_core::FixtureKind;
    ///
    /// assert_eq!(FixtureKind::from_file_name("fail_syntax", "fail_"), FixtureKind::ExpectFailure);
    /// assert_eq!(FixtureKind::from_file_name("ok_basic", "fail_"), FixtureKind::ExpectSuccess);
    /// ```
    pub fn from_file_name(file_name: &str, negative_prefix: &str) -> Self {
        if file_name.starts_with(negative_prefix) {
            FixtureKind::ExpectFailure
        } else {
            FixtureKind::ExpectSuccess
        }
    }

    pub fn is_negative(self) -> bool {
        self == FixtureKind::ExpectFailure
    }
}

/// An input file fed to the target on standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub path: PathBuf,
    pub kind: FixtureKind,
}

impl Fixture {
    pub fn new(path: impl Into<PathBuf>, kind: FixtureKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Build a fixture, deriving its kind from the final path component.
    ///
    /// The prefix is matched on the raw name, so a file name that is not valid UTF-8 still counts.
    pub fn from_path(path: impl Into<PathBuf>, negative_prefix: &str) -> Self {
        let path = path.into();
        let kind = match path.file_name() {
            Some(name) if name.as_encoded_bytes().starts_with(negative_prefix.as_bytes()) => {
                FixtureKind::ExpectFailure
            }
            _ => FixtureKind::ExpectSuccess,
        };
        Self { path, kind }
    }
}

/// Exit code and captured output of one target run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    /// Process exit code. Signal terminations are reported as the negated signal number.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}
