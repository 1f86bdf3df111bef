// crates/tcm-sync-core/src/interfaces/mod.rs
// ============================================================================
// Module: TCM Sync Interfaces
// Description: Contracts for the specification repository, report repository, and VCS.
// Purpose: Define the collaborator surfaces consumed by the sync pipeline.
// Dependencies: thiserror, crate::core
// ============================================================================

//! ## Overview
//! Parsing specification files, reading execution reports, and pushing
//! modified sources are external concerns. The pipeline consumes them only
//! through these traits, so alternative formats plug in without touching the
//! coordinator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::TestCase;
use crate::core::TestReport;

// ============================================================================
// SECTION: Repository Errors
// ============================================================================

/// Errors raised by specification and report repositories.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying storage failed.
    #[error("repository io error: {0}")]
    Io(String),
    /// A stored document could not be decoded.
    #[error("repository parse error: {0}")]
    Parse(String),
    /// No document matched the lookup.
    #[error("repository entry not found: {0}")]
    NotFound(String),
    /// More than one document matched the lookup.
    #[error("repository lookup is ambiguous: {0}")]
    Ambiguous(String),
}

// ============================================================================
// SECTION: Specification Repository
// ============================================================================

/// Source of executable specifications.
pub trait TestCaseRepository {
    /// Loads every test case in repository order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the repository cannot be read.
    fn find_all(&self) -> Result<Vec<TestCase>, RepositoryError>;

    /// Persists cases whose metadata changed and returns the subset written.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when a modified case cannot be written.
    fn save_modified(&self, test_cases: &[TestCase]) -> Result<Vec<TestCase>, RepositoryError>;
}

// ============================================================================
// SECTION: Report Repository
// ============================================================================

/// Reports resolved for a batch of cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportLookup {
    /// One report per case, in case order.
    pub reports: Vec<TestReport>,
    /// Messages for cases that matched more than one report.
    pub ambiguous: Vec<String>,
}

/// Source of execution reports.
pub trait TestReportRepository {
    /// Finds the report for one case.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when no single report matches the case.
    fn find_report(&self, test_case: &TestCase) -> Result<TestReport, RepositoryError>;

    /// Returns one report per case, in case order. Cases whose report cannot
    /// be found get an empty report instead of an error; ambiguous matches
    /// are also listed in [`ReportLookup::ambiguous`].
    fn find_all(&self, test_cases: &[TestCase]) -> ReportLookup {
        let mut lookup = ReportLookup {
            reports: Vec::with_capacity(test_cases.len()),
            ambiguous: Vec::new(),
        };
        for test_case in test_cases {
            match self.find_report(test_case) {
                Ok(report) => lookup.reports.push(report),
                Err(err) => {
                    if matches!(err, RepositoryError::Ambiguous(_)) {
                        lookup.ambiguous.push(err.to_string());
                    }
                    lookup.reports.push(TestReport::missing(test_case.clone()));
                }
            }
        }
        lookup
    }
}

// ============================================================================
// SECTION: Version Control
// ============================================================================

/// Version-control errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum VcsError {
    /// A VCS command could not be run or exited unsuccessfully.
    #[error("vcs command failed: {0}")]
    Command(String),
}

/// Pushes modified specification sources to a remote.
pub trait VcsClient {
    /// Pushes the given paths. Implementations are best effort.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError`] when the push fails.
    fn sync_to_remote(&self, paths: &[String]) -> Result<(), VcsError>;
}
