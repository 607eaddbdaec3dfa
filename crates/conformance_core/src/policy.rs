//! Pass/fail classification.
//!
//! ## Rules
//!
//! 1. Exit code `0` passes, anything else fails.
//! 2. [`FixtureKind::ExpectFailure`] inverts rule 1.
//! 3. The crash exit code fails unconditionally, overriding rules 1 and 2.

use std::fmt;

use crate::fixture::FixtureKind;

/// Exit code the target uses to signal that it crashed rather than rejected its input.
pub const DEFAULT_CRASH_EXIT_CODE: i32 = 2;

/// Outcome of classifying one fixture run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn from_bool(passed: bool) -> Self {
        if passed { Verdict::Pass } else { Verdict::Fail }
    }

    pub fn is_pass(self) -> bool {
        self == Verdict::Pass
    }

    /// Report tag (`PASS` / `FAIL`).
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification parameters that depend on the program under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationPolicy {
    pub crash_exit_code: i32,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            crash_exit_code: DEFAULT_CRASH_EXIT_CODE,
        }
    }
}

impl ClassificationPolicy {
    pub fn new(crash_exit_code: i32) -> Self {
        Self { crash_exit_code }
    }

    /// Classify an exit code for a fixture of the given kind.
    ///
    /// ## Examples
    ///
    /// ```
    /// use conformance_core::{ClassificationPolicy, FixtureKind, Verdict};
    ///
    /// let policy = ClassificationPolicy::default();
    /// assert_eq!(policy.classify(FixtureKind::ExpectFailure, 1), Verdict::Pass);
    /// assert_eq!(policy.classify(FixtureKind::ExpectFailure, 2), Verdict::Fail);
    /// ```
    pub fn classify(&self, kind: FixtureKind, exit_code: i32) -> Verdict {
        let mut passed = exit_code == 0;

        if kind.is_negative() {
            passed = !passed;
        }

        // Crashes always fail
        if exit_code == self.crash_exit_code {
            passed = false;
        }

        Verdict::from_bool(passed)
    }
}
