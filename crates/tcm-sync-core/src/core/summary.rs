// crates/tcm-sync-core/src/core/summary.rs
// ============================================================================
// Module: TCM Sync Outcomes and Summaries
// Description: Per-item sync/publish outcomes and their batch summaries.
// Purpose: Give every processed item exactly one tagged outcome.
// Dependencies: serde, crate::core::{report, testcase}
// ============================================================================

//! ## Overview
//! Each test case produces exactly one [`SyncOutcome`] per sync attempt, and
//! each report exactly one [`PublishOutcome`] per publish call. Summaries fold
//! those outcomes into the counters printed after each phase.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::report::TestReport;
use crate::core::testcase::TestCase;

// ============================================================================
// SECTION: Sync Outcomes
// ============================================================================

/// Result of reconciling one test case with its work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Linked work item already matches.
    UpToDate,
    /// A new work item was created and linked.
    Created,
    /// The linked work item was patched.
    Updated,
    /// Reconciliation failed for this case.
    Failed,
}

/// Sync outcome paired with the (possibly re-tagged) case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Outcome for the case.
    pub outcome: SyncOutcome,
    /// Test case after reconciliation.
    pub test_case: TestCase,
}

/// Counters over a batch of sync outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Cases processed.
    pub total: usize,
    /// Cases that produced a new work item.
    pub created: usize,
    /// Cases whose work item was patched.
    pub updated: usize,
    /// Cases already up to date.
    pub up_to_date: usize,
    /// Cases that failed.
    pub failed: usize,
}

impl SyncSummary {
    /// Adds one outcome to the counters.
    pub const fn record(&mut self, outcome: SyncOutcome) {
        self.total += 1;
        match outcome {
            SyncOutcome::UpToDate => self.up_to_date += 1,
            SyncOutcome::Created => self.created += 1,
            SyncOutcome::Updated => self.updated += 1,
            SyncOutcome::Failed => self.failed += 1,
        }
    }

    /// Folds a batch of results into a summary.
    #[must_use]
    pub fn from_results(results: &[SyncResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result.outcome);
        }
        summary
    }
}

// ============================================================================
// SECTION: Publish Outcomes
// ============================================================================

/// Result of adding one report to the run context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Result rows were accumulated for the report.
    Successful,
    /// The report could not be added.
    Failed,
}

/// Publish outcome paired with its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResult {
    /// Outcome for the report.
    pub outcome: PublishOutcome,
    /// Report that was processed.
    pub test_report: TestReport,
}

/// Counters over a batch of publish outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishSummary {
    /// Reports processed.
    pub total: usize,
    /// Reports accumulated into the run.
    pub successful: usize,
    /// Reports that failed.
    pub failed: usize,
}

impl PublishSummary {
    /// Adds one outcome to the counters.
    pub const fn record(&mut self, outcome: PublishOutcome) {
        self.total += 1;
        match outcome {
            PublishOutcome::Successful => self.successful += 1,
            PublishOutcome::Failed => self.failed += 1,
        }
    }

    /// Folds a batch of results into a summary.
    #[must_use]
    pub fn from_results(results: &[PublishResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result.outcome);
        }
        summary
    }
}
