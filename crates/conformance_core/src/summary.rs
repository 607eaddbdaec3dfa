//! Aggregate result of a run.

use std::path::PathBuf;

use crate::fixture::Fixture;
use crate::policy::Verdict;

/// Failed fixtures, in the order they ran, plus the number of fixtures seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    total: usize,
    failed: Vec<PathBuf>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fixture: &Fixture, verdict: Verdict) {
        self.total += 1;
        if !verdict.is_pass() {
            self.failed.push(fixture.path.clone());
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn failed(&self) -> &[PathBuf] {
        &self.failed
    }

    /// `true` when no fixture failed (an empty run succeeds).
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
