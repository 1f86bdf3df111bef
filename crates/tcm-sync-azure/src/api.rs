// crates/tcm-sync-azure/src/api.rs
// ============================================================================
// Module: Azure DevOps Remote Operations
// Description: Trait describing the remote calls the adapter issues.
// Purpose: Separate request orchestration from HTTP transport.
// Dependencies: tcm-sync-core, thiserror, crate::{patch, wire}
// ============================================================================

//! ## Overview
//! [`AzureDevopsApi`] lists every remote operation the adapter needs, one
//! method per REST call. The adapter and run-context manager are written
//! against this trait only; [`crate::HttpAzureDevopsApi`] implements it over
//! HTTP and tests supply an in-memory fake.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tcm_sync_core::PlanId;
use tcm_sync_core::RunId;
use tcm_sync_core::SuiteId;
use tcm_sync_core::TmsError;
use tcm_sync_core::WorkItemId;
use thiserror::Error;

use crate::patch::PatchOperation;
use crate::wire::CreateRunRequest;
use crate::wire::CreateSuiteRequest;
use crate::wire::RunResultRecord;
use crate::wire::TestPlanRecord;
use crate::wire::TestPointRecord;
use crate::wire::TestRunRecord;
use crate::wire::TestSuiteRecord;
use crate::wire::WorkItem;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by remote operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client or request URL could not be built.
    #[error("azure devops client error: {0}")]
    Client(String),
    /// The request did not complete.
    #[error("azure devops request failed: {0}")]
    Request(String),
    /// The service answered with a non-success status.
    #[error("azure devops returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },
    /// The response body could not be decoded.
    #[error("azure devops response decode failed: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns true for a 404 status.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: 404,
                ..
            }
        )
    }
}

impl From<ApiError> for TmsError {
    fn from(err: ApiError) -> Self {
        Self::Transport(err.to_string())
    }
}

// ============================================================================
// SECTION: Pagination
// ============================================================================

/// One page of a continuation-token paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items of this page.
    pub items: Vec<T>,
    /// Token for the next page; `None` on the last page.
    pub continuation_token: Option<String>,
}

// ============================================================================
// SECTION: Remote Operations
// ============================================================================

/// Remote operations against one Azure DevOps project.
pub trait AzureDevopsApi {
    /// Fetches a work item with all fields and relations; `None` on 404.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport or non-404 status failures.
    fn get_work_item(&self, id: WorkItemId) -> Result<Option<WorkItem>, ApiError>;

    /// Creates a work item of the given type from a patch document.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn create_work_item(
        &self,
        work_item_type: &str,
        document: &[PatchOperation],
    ) -> Result<WorkItem, ApiError>;

    /// Applies a patch document to an existing work item.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn update_work_item(
        &self,
        id: WorkItemId,
        document: &[PatchOperation],
    ) -> Result<WorkItem, ApiError>;

    /// Lists one page of test plans.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn list_test_plans(
        &self,
        continuation_token: Option<&str>,
    ) -> Result<Page<TestPlanRecord>, ApiError>;

    /// Creates a test plan.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn create_test_plan(&self, name: &str) -> Result<TestPlanRecord, ApiError>;

    /// Lists every suite of a plan.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn list_test_suites(&self, plan: PlanId) -> Result<Vec<TestSuiteRecord>, ApiError>;

    /// Creates a suite under a plan.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn create_test_suite(
        &self,
        plan: PlanId,
        request: &CreateSuiteRequest,
    ) -> Result<TestSuiteRecord, ApiError>;

    /// Lists the points of one test case inside a suite.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn list_test_points(
        &self,
        plan: PlanId,
        suite: SuiteId,
        test_case: WorkItemId,
    ) -> Result<Vec<TestPointRecord>, ApiError>;

    /// Adds a test case to a suite.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn add_test_case_to_suite(
        &self,
        plan: PlanId,
        suite: SuiteId,
        test_case: WorkItemId,
    ) -> Result<(), ApiError>;

    /// Removes a test case from a suite; returns false when it was not a member.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn remove_test_case_from_suite(
        &self,
        plan: PlanId,
        suite: SuiteId,
        test_case: WorkItemId,
    ) -> Result<bool, ApiError>;

    /// Creates a test run.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn create_test_run(&self, request: &CreateRunRequest) -> Result<TestRunRecord, ApiError>;

    /// Submits result rows to a run in one batch.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn add_test_results(&self, run: RunId, results: &[RunResultRecord]) -> Result<(), ApiError>;

    /// Moves a run to a new state.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the request fails.
    fn update_test_run_state(&self, run: RunId, state: &str) -> Result<(), ApiError>;
}
