//! Property-based tests for the conformance runner
//!
//! These tests use proptest to check the classification rules and the loop's reporting invariants across many
//! generated exit codes, fixture names and orderings.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use conformance_runner::{
    ClassificationPolicy, ConsoleReporter, ExecutionResult, Fixture, FixtureDiscovery, FixtureExecutor, FixtureKind,
    RunnerError, Verdict, run_with,
};
use proptest::prelude::*;

// =============================================================================
// Classification Properties
// =============================================================================

proptest! {
    /// Property: positive fixtures pass iff the exit code is exactly 0
    #[test]
    fn positive_passes_iff_zero(code in any::<i32>()) {
        let verdict = ClassificationPolicy::default().classify(FixtureKind::ExpectSuccess, code);
        prop_assert_eq!(verdict.is_pass(), code == 0);
    }

    /// Property: negative fixtures pass iff the exit code is nonzero and not the crash code
    #[test]
    fn negative_passes_iff_nonzero_and_not_crash(code in any::<i32>()) {
        let verdict = ClassificationPolicy::default().classify(FixtureKind::ExpectFailure, code);
        prop_assert_eq!(verdict.is_pass(), code != 0 && code != 2);
    }

    /// Property: the crash code fails every kind, whatever value it is configured to
    #[test]
    fn crash_code_always_fails(crash in any::<i32>(), negative in any::<bool>()) {
        let kind = if negative { FixtureKind::ExpectFailure } else { FixtureKind::ExpectSuccess };
        prop_assert_eq!(ClassificationPolicy::new(crash).classify(kind, crash), Verdict::Fail);
    }

    /// Property: kind derivation only looks at the file name prefix
    #[test]
    fn kind_follows_prefix(stem in "[a-z0-9_]{0,12}", dir in "[a-z]{1,8}") {
        let negative = Fixture::from_path(Path::new(&dir).join(format!("fail_{stem}")), "fail_");
        prop_assert_eq!(negative.kind, FixtureKind::ExpectFailure);

        let positive = Fixture::from_path(Path::new("fail_dir").join(format!("ok_{stem}")), "fail_");
        prop_assert_eq!(positive.kind, FixtureKind::ExpectSuccess);
    }
}

// =============================================================================
// Loop Properties
// =============================================================================

struct ListDiscovery(Vec<Fixture>);

impl FixtureDiscovery for ListDiscovery {
    fn discover_fixtures(&self, _dir: &Path) -> Result<Vec<Fixture>, RunnerError> {
        Ok(self.0.clone())
    }
}

struct CodeTable(HashMap<PathBuf, i32>);

impl FixtureExecutor for CodeTable {
    fn execute_fixture(&self, fixture: &Fixture) -> Result<ExecutionResult, RunnerError> {
        Ok(ExecutionResult::new(self.0[&fixture.path], "", ""))
    }
}

fn case_strategy() -> impl Strategy<Value = Vec<(bool, i32)>> {
    prop::collection::vec((any::<bool>(), -3i32..5), 0..12)
}

fn fixtures_for(cases: &[(bool, i32)]) -> (Vec<Fixture>, CodeTable) {
    let mut fixtures = Vec::new();
    let mut codes = HashMap::new();
    for (i, (negative, code)) in cases.iter().enumerate() {
        let name = if *negative { format!("test/fail_{i}") } else { format!("test/ok_{i}") };
        let fixture = Fixture::from_path(name, "fail_");
        codes.insert(fixture.path.clone(), *code);
        fixtures.push(fixture);
    }
    (fixtures, CodeTable(codes))
}

fn run_order(fixtures: Vec<Fixture>, codes: &CodeTable, show_all: bool) -> (BTreeSet<PathBuf>, usize, bool) {
    let mut reporter = ConsoleReporter::new(Vec::new(), show_all, false);
    let summary = run_with(
        &ListDiscovery(fixtures),
        codes,
        &mut reporter,
        Path::new("test"),
        ClassificationPolicy::default(),
    )
    .unwrap();

    let out = String::from_utf8(reporter.into_inner()).unwrap();
    let blocks = out.matches("\nrv: ").count();
    (summary.failed().iter().cloned().collect(), blocks, summary.is_success())
}

proptest! {
    /// Property: the failed set does not depend on execution order
    #[test]
    fn failed_set_is_order_independent(cases in case_strategy()) {
        let (fixtures, codes) = fixtures_for(&cases);
        let mut reversed = fixtures.clone();
        reversed.reverse();

        let (forward, _, _) = run_order(fixtures, &codes, false);
        let (backward, _, _) = run_order(reversed, &codes, false);
        prop_assert_eq!(forward, backward);
    }

    /// Property: detail blocks appear for failures only, or for everything with show-all
    #[test]
    fn detail_blocks_follow_show_all(cases in case_strategy()) {
        let (fixtures, codes) = fixtures_for(&cases);

        let (failed, quiet_blocks, success) = run_order(fixtures.clone(), &codes, false);
        prop_assert_eq!(quiet_blocks, failed.len());
        prop_assert_eq!(success, failed.is_empty());

        let (_, loud_blocks, _) = run_order(fixtures, &codes, true);
        prop_assert_eq!(loud_blocks, cases.len());
    }
}
