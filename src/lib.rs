#![forbid(unsafe_code)]
//! Conformance test driver for compiler and interpreter binaries
//!
//! Each file in a fixture directory is piped to a target executable's standard input. The exit code decides the
//! verdict: `0` passes, unless the fixture name starts with `fail_`, which inverts the expectation; the crash exit
//! code (`2` by default) always fails.
//!
//! ## Layout
//!
//! - [`conformance_core`] (re-exported below): fixture model and classification, no IO.
//! - [`config`]: the runner configuration file.
//! - [`cli`]: argument handling, the fixture loop and the console report.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` with `?` / `map_err`. The `cli` module enforces `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod version;

pub use cli::test_interfaces::{
    DefaultFixtureDiscovery, FixtureDiscovery, FixtureExecutor, ProcessExecutor, RunnerError,
};
pub use cli::test_runner::{ConsoleReporter, RunOptions, TestReporter, run_with};
pub use config::{ColorChoice, ConfigError, RunnerConfig, TargetConfig};
pub use conformance_core::{ClassificationPolicy, ExecutionResult, Fixture, FixtureKind, RunSummary, Verdict};
