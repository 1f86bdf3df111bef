// crates/tcm-sync-core/tests/report_lookup.rs
// ============================================================================
// Module: Report Lookup Tests
// Description: Batch report resolution through the repository default.
// Purpose: Ensure unmatched cases get empty reports and ambiguity is listed.
// Dependencies: tcm-sync-core
// ============================================================================

//! ## Overview
//! Drives [`tcm_sync_core::TestReportRepository::find_all`] over a
//! name-keyed in-memory repository.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::collections::BTreeMap;

use tcm_sync_core::RepositoryError;
use tcm_sync_core::StepOutcome;
use tcm_sync_core::TestCase;
use tcm_sync_core::TestReport;
use tcm_sync_core::TestReportRepository;

use crate::common::case;
use crate::common::report;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reports keyed by case name; names listed more than once are ambiguous.
#[derive(Default)]
struct NamedReports {
    /// Reports per case name.
    reports: BTreeMap<String, Vec<TestReport>>,
}

impl NamedReports {
    /// Adds a report under its case name.
    fn with(mut self, report: TestReport) -> Self {
        self.reports.entry(report.test_case.name().to_string()).or_default().push(report);
        self
    }
}

impl TestReportRepository for NamedReports {
    fn find_report(&self, test_case: &TestCase) -> Result<TestReport, RepositoryError> {
        match self.reports.get(test_case.name()).map(Vec::as_slice) {
            Some([single]) => Ok(single.clone()),
            Some([]) | None => Err(RepositoryError::NotFound(test_case.name().to_string())),
            Some(_) => Err(RepositoryError::Ambiguous(test_case.name().to_string())),
        }
    }
}

// ============================================================================
// SECTION: Find All
// ============================================================================

/// Tests case without report gets an empty report.
#[test]
fn case_without_report_gets_an_empty_report() {
    let repository = NamedReports::default().with(report(case("Login"), StepOutcome::Success));

    let lookup = repository.find_all(&[case("Login"), case("Logout")]);

    assert_eq!(lookup.reports.len(), 2);
    assert_eq!(lookup.reports[0].step_outcomes.len(), 1);
    assert_eq!(lookup.reports[1].test_case.name(), "Logout");
    assert!(lookup.reports[1].step_outcomes.is_empty());
    assert!(lookup.ambiguous.is_empty());
}

/// Tests ambiguous match is listed and replaced by an empty report.
#[test]
fn ambiguous_match_is_listed_and_replaced_by_an_empty_report() {
    let repository = NamedReports::default()
        .with(report(case("Login"), StepOutcome::Success))
        .with(report(case("Login"), StepOutcome::Failure));

    let lookup = repository.find_all(&[case("Login")]);

    assert_eq!(lookup.reports, vec![TestReport::missing(case("Login"))]);
    assert_eq!(lookup.ambiguous.len(), 1);
    assert!(lookup.ambiguous[0].contains("Login"));
}
