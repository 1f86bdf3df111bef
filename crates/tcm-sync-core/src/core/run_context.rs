// crates/tcm-sync-core/src/core/run_context.rs
// ============================================================================
// Module: TCM Sync Run Context
// Description: Per-session publishing state: plan, root suite, run, suite index, results.
// Purpose: Hold everything a publish session resolves before the batch submit.
// Dependencies: serde, crate::core::{identifiers, report}
// ============================================================================

//! ## Overview
//! A [`RunContext`] is created by one publish session, mutated only by that
//! session, and dropped when it ends. Suites are indexed by [`SuiteKey`]:
//! requirement-bound suites under [`SuiteKey::Requirement`] and the root suite
//! under the explicit [`SuiteKey::Unbound`] sentinel, so "no requirement" is
//! never represented by a missing key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::identifiers::PlanId;
use crate::core::identifiers::PointId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::SuiteId;
use crate::core::identifiers::WorkItemId;
use crate::core::report::ResultOutcome;

// ============================================================================
// SECTION: Suite Index
// ============================================================================

/// Key of the per-session suite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SuiteKey {
    /// Sentinel for cases not bound to any requirement (the root suite).
    Unbound,
    /// Suite bound to a requirement work item.
    Requirement(WorkItemId),
}

impl From<Option<WorkItemId>> for SuiteKey {
    fn from(requirement: Option<WorkItemId>) -> Self {
        requirement.map_or(Self::Unbound, Self::Requirement)
    }
}

/// Remote test suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSuite {
    /// Suite identifier.
    pub id: SuiteId,
    /// Suite display name.
    pub name: String,
    /// Parent suite; `None` for the root suite.
    pub parent: Option<SuiteId>,
    /// Requirement the suite is bound to, if any.
    pub requirement: Option<WorkItemId>,
}

/// Binding of one test case to one suite within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestPoint {
    /// Point identifier.
    pub id: PointId,
    /// Test case work item.
    pub test_case: WorkItemId,
    /// Suite holding the point.
    pub suite: SuiteId,
}

// ============================================================================
// SECTION: Result Rows
// ============================================================================

/// One result row destined for the batch submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    /// Test case work item.
    pub test_case: WorkItemId,
    /// Work item revision the result refers to.
    pub test_case_revision: u64,
    /// Work item title.
    pub test_case_title: String,
    /// Suite holding the point.
    pub suite: SuiteId,
    /// Suite display name.
    pub suite_name: String,
    /// Resolved test point.
    pub point: PointId,
    /// Computed outcome.
    pub outcome: ResultOutcome,
}

// ============================================================================
// SECTION: Run Context
// ============================================================================

/// Publishing state owned by one session.
///
/// # Invariants
/// - `suites` holds at most one suite per key; the sentinel maps to the root suite.
/// - `results` only grows during the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Target plan.
    plan: PlanId,
    /// Root suite of the plan.
    root_suite: SuiteId,
    /// Run opened for this session.
    run: RunId,
    /// Suite index keyed by requirement.
    suites: BTreeMap<SuiteKey, TestSuite>,
    /// Accumulated result rows.
    results: Vec<ResultRow>,
}

impl RunContext {
    /// Creates a context from resolved remote ids and the initial suite index.
    #[must_use]
    pub const fn new(
        plan: PlanId,
        root_suite: SuiteId,
        run: RunId,
        suites: BTreeMap<SuiteKey, TestSuite>,
    ) -> Self {
        Self {
            plan,
            root_suite,
            run,
            suites,
            results: Vec::new(),
        }
    }

    /// Returns the plan id.
    #[must_use]
    pub const fn plan_id(&self) -> PlanId {
        self.plan
    }

    /// Returns the root suite id.
    #[must_use]
    pub const fn root_suite_id(&self) -> SuiteId {
        self.root_suite
    }

    /// Returns the run id.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run
    }

    /// Looks up an indexed suite.
    #[must_use]
    pub fn suite(&self, key: SuiteKey) -> Option<&TestSuite> {
        self.suites.get(&key)
    }

    /// Indexes a suite under `key`, returning the indexed value.
    pub fn insert_suite(&mut self, key: SuiteKey, suite: TestSuite) -> &TestSuite {
        self.suites.entry(key).or_insert(suite)
    }

    /// Returns the number of indexed suites.
    #[must_use]
    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }

    /// Appends result rows in order.
    pub fn push_results<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = ResultRow>,
    {
        self.results.extend(rows);
    }

    /// Returns the accumulated result rows.
    #[must_use]
    pub fn results(&self) -> &[ResultRow] {
        &self.results
    }
}
