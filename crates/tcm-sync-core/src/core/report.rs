// crates/tcm-sync-core/src/core/report.rs
// ============================================================================
// Module: TCM Sync Test Reports
// Description: Execution reports and per-step outcomes.
// Purpose: Carry execution results from the report repository to the publisher.
// Dependencies: serde, crate::core::testcase
// ============================================================================

//! ## Overview
//! A [`TestReport`] pairs a synchronized [`TestCase`] with the outcomes of
//! its executed steps. A case without a discoverable report still gets a
//! report, with an empty outcome list, which publishes as failed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::testcase::TestCase;
use crate::core::testcase::TestStep;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Outcome of one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Step passed.
    Success,
    /// Step failed (or was not reached).
    Failure,
}

/// Outcome of a whole test case within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultOutcome {
    /// Every recorded step succeeded.
    Passed,
    /// No steps were recorded or at least one failed.
    Failed,
}

impl ResultOutcome {
    /// Returns the remote wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
        }
    }
}

/// Step paired with its recorded outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStepOutcome {
    /// Executed step.
    #[serde(flatten)]
    pub step: TestStep,
    /// Recorded outcome.
    pub outcome: StepOutcome,
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Execution report for one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    /// Test case the report belongs to.
    pub test_case: TestCase,
    /// Recorded step outcomes in execution order.
    pub step_outcomes: Vec<TestStepOutcome>,
}

impl TestReport {
    /// Creates a report with recorded step outcomes.
    #[must_use]
    pub const fn new(test_case: TestCase, step_outcomes: Vec<TestStepOutcome>) -> Self {
        Self {
            test_case,
            step_outcomes,
        }
    }

    /// Creates the placeholder report for a case without discoverable results.
    #[must_use]
    pub const fn missing(test_case: TestCase) -> Self {
        Self::new(test_case, Vec::new())
    }

    /// Computes the case outcome: failed when nothing was recorded, passed only
    /// when every recorded step succeeded.
    #[must_use]
    pub fn result_outcome(&self) -> ResultOutcome {
        if self.step_outcomes.is_empty() {
            return ResultOutcome::Failed;
        }
        if self.step_outcomes.iter().all(|step| step.outcome == StepOutcome::Success) {
            ResultOutcome::Passed
        } else {
            ResultOutcome::Failed
        }
    }
}
