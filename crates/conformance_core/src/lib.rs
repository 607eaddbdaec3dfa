//! Provide the fixture model and the pass/fail policy shared by the conformance runner and its tests.
//!
//! This crate is intentionally small and dependency-free. Everything in it is deterministic:
//! - a [`Fixture`] carries its [`FixtureKind`], decided once from its file name,
//! - [`ClassificationPolicy::classify`] turns an exit code into a [`Verdict`],
//! - [`RunSummary`] accumulates verdicts into the overall result.
//!
//! ## Notes
//!
//! - **No IO** and no global state: spawning the target and walking directories belongs to the runner crate.
//! - The crash sentinel is a property of the program under test, so it lives in the policy rather than in a constant.

pub mod fixture;
pub mod policy;
pub mod summary;

pub use fixture::{DEFAULT_NEGATIVE_PREFIX, ExecutionResult, Fixture, FixtureKind};
pub use policy::{ClassificationPolicy, DEFAULT_CRASH_EXIT_CODE, Verdict};
pub use summary::RunSummary;
