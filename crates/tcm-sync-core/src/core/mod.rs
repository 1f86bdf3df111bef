// crates/tcm-sync-core/src/core/mod.rs
// ============================================================================
// Module: TCM Sync Core Types
// Description: Canonical test-case, report, outcome, and run-context structures.
// Purpose: Provide stable, serializable types shared by adapters and collaborators.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types describe what the synchronization engine reads (test cases and
//! execution reports), what it records (outcomes and summaries), and the
//! per-session publishing state ([`RunContext`]).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod error;
pub mod identifiers;
pub mod report;
pub mod run_context;
pub mod summary;
pub mod testcase;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::TmsError;
pub use identifiers::PlanId;
pub use identifiers::PointId;
pub use identifiers::RunId;
pub use identifiers::SuiteId;
pub use identifiers::WorkItemId;
pub use report::ResultOutcome;
pub use report::StepOutcome;
pub use report::TestReport;
pub use report::TestStepOutcome;
pub use run_context::ResultRow;
pub use run_context::RunContext;
pub use run_context::SuiteKey;
pub use run_context::TestPoint;
pub use run_context::TestSuite;
pub use summary::PublishOutcome;
pub use summary::PublishResult;
pub use summary::PublishSummary;
pub use summary::SyncOutcome;
pub use summary::SyncResult;
pub use summary::SyncSummary;
pub use testcase::ParameterDef;
pub use testcase::ParameterRow;
pub use testcase::ParameterTable;
pub use testcase::StepKind;
pub use testcase::TestCase;
pub use testcase::TestMetadata;
pub use testcase::TestStep;
