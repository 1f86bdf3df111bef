// crates/tcm-sync-core/src/runtime/coordinator.rs
// ============================================================================
// Module: TCM Sync Coordinator
// Description: Create-or-update reconciliation and batch report publishing.
// Purpose: Encode control flow and outcome bookkeeping once for every adapter.
// Dependencies: crate::{core, events}
// ============================================================================

//! ## Overview
//! [`TmsAdapter`] splits into capability hooks (create, update, run-context
//! lifecycle) that a concrete test-case management system implements, and
//! provided orchestration methods that must not be overridden in practice.
//!
//! Per case the coordinator walks `Unlinked -> Created` or
//! `Linked -> {UpToDate, Updated}`; any error becomes `Failed` for that case
//! only. Per publish session it runs `Setup -> N x AddResult -> Finalize`:
//! setup and finalize errors propagate, per-report errors do not. Processing
//! is strictly sequential.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::PublishOutcome;
use crate::core::PublishResult;
use crate::core::RunContext;
use crate::core::SyncOutcome;
use crate::core::SyncResult;
use crate::core::TestCase;
use crate::core::TestMetadata;
use crate::core::TestReport;
use crate::core::TmsError;
use crate::core::WorkItemId;
use crate::events::EventSink;
use crate::events::RunPhase;
use crate::events::SyncEvent;

// ============================================================================
// SECTION: Adapter Contract
// ============================================================================

/// Capability hooks of a test-case management system plus the provided
/// orchestration routines.
pub trait TmsAdapter {
    /// Name of the single-valued tag carrying the linked work item id.
    fn linkage_tag(&self) -> &str;

    /// Sink receiving structured events from the orchestration routines.
    fn events(&self) -> &dyn EventSink;

    /// Creates a work item for an unlinked case and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when the work item cannot be created.
    fn create_test_case(&self, test_case: &TestCase) -> Result<WorkItemId, TmsError>;

    /// Patches the linked work item; returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when the work item cannot be read or patched.
    fn update_test_case(&self, id: WorkItemId, test_case: &TestCase) -> Result<bool, TmsError>;

    /// Opens a publish session.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when the plan, run, or suite index cannot be resolved.
    fn setup_run_context(&self) -> Result<RunContext, TmsError>;

    /// Accumulates result rows for one report without writing results remotely.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when the report cannot be resolved to test points.
    fn add_test_report_to_run_context(
        &self,
        report: &TestReport,
        context: &mut RunContext,
    ) -> Result<(), TmsError>;

    /// Submits accumulated results and completes the run.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when the submit or state transition fails.
    fn finalize_run_context(&self, context: &RunContext) -> Result<(), TmsError>;

    /// Compensating close invoked once when finalize fails. Defaults to a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when the compensating close fails.
    fn abandon_run_context(&self, _context: &RunContext) -> Result<(), TmsError> {
        Ok(())
    }

    /// Reads the linkage id from case metadata.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError::Validation`] when more than one id (or a non-numeric id) is tagged.
    fn find_test_case_id(&self, test_case: &TestCase) -> Result<Option<WorkItemId>, TmsError> {
        test_case.linkage_id(self.linkage_tag())
    }

    /// Writes a new linkage id back onto the case.
    fn save_test_case_id(&self, id: WorkItemId, test_case: &mut TestCase) {
        test_case.add_metadata(TestMetadata::new(self.linkage_tag(), id.to_string()));
    }

    /// Reconciles one case with its work item. Never fails: errors become
    /// [`SyncOutcome::Failed`] and are logged.
    fn sync_test_case(&self, mut test_case: TestCase) -> SyncResult {
        let outcome = match reconcile(self, &mut test_case) {
            Ok((outcome, id)) => {
                self.events().record(&SyncEvent::case_sync(
                    test_case.name(),
                    Some(id),
                    outcome,
                    None,
                ));
                outcome
            }
            Err(err) => {
                self.events().record(&SyncEvent::case_sync(
                    test_case.name(),
                    None,
                    SyncOutcome::Failed,
                    Some(&err),
                ));
                SyncOutcome::Failed
            }
        };
        SyncResult {
            outcome,
            test_case,
        }
    }

    /// Reconciles cases one at a time, in order.
    fn sync_test_cases(&self, test_cases: Vec<TestCase>) -> Vec<SyncResult> {
        test_cases.into_iter().map(|test_case| self.sync_test_case(test_case)).collect()
    }

    /// Publishes reports as one run. Per-report failures become
    /// [`PublishOutcome::Failed`]; finalize runs once setup succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when setup or finalize fails. A failed finalize
    /// triggers [`TmsAdapter::abandon_run_context`] before returning.
    fn publish_test_reports(
        &self,
        reports: Vec<TestReport>,
    ) -> Result<Vec<PublishResult>, TmsError> {
        let mut context = match self.setup_run_context() {
            Ok(context) => context,
            Err(err) => {
                self.events().record(&SyncEvent::run_context(
                    RunPhase::Setup,
                    None,
                    None,
                    0,
                    Some(&err),
                ));
                return Err(err);
            }
        };
        self.events().record(&SyncEvent::run_context(
            RunPhase::Setup,
            Some(context.plan_id()),
            Some(context.run_id()),
            0,
            None,
        ));

        let mut results = Vec::with_capacity(reports.len());
        for report in reports {
            let before = context.results().len();
            let outcome = match self.add_test_report_to_run_context(&report, &mut context) {
                Ok(()) => {
                    let rows = context.results().len() - before;
                    self.events().record(&SyncEvent::report_publish(
                        report.test_case.name(),
                        PublishOutcome::Successful,
                        rows,
                        None,
                    ));
                    PublishOutcome::Successful
                }
                Err(err) => {
                    self.events().record(&SyncEvent::report_publish(
                        report.test_case.name(),
                        PublishOutcome::Failed,
                        0,
                        Some(&err),
                    ));
                    PublishOutcome::Failed
                }
            };
            results.push(PublishResult {
                outcome,
                test_report: report,
            });
        }

        if let Err(err) = self.finalize_run_context(&context) {
            self.events().record(&SyncEvent::run_context(
                RunPhase::Finalize,
                Some(context.plan_id()),
                Some(context.run_id()),
                context.results().len(),
                Some(&err),
            ));
            let abandon = self.abandon_run_context(&context).err();
            self.events().record(&SyncEvent::run_context(
                RunPhase::Abandon,
                Some(context.plan_id()),
                Some(context.run_id()),
                context.results().len(),
                abandon.as_ref(),
            ));
            return Err(err);
        }
        self.events().record(&SyncEvent::run_context(
            RunPhase::Finalize,
            Some(context.plan_id()),
            Some(context.run_id()),
            context.results().len(),
            None,
        ));
        Ok(results)
    }
}

// ============================================================================
// SECTION: Reconciliation
// ============================================================================

/// Runs the create-or-update decision for one case.
fn reconcile<A>(
    adapter: &A,
    test_case: &mut TestCase,
) -> Result<(SyncOutcome, WorkItemId), TmsError>
where
    A: TmsAdapter + ?Sized,
{
    match adapter.find_test_case_id(test_case)? {
        Some(id) => {
            let updated = adapter.update_test_case(id, test_case)?;
            let outcome = if updated { SyncOutcome::Updated } else { SyncOutcome::UpToDate };
            Ok((outcome, id))
        }
        None => {
            let id = adapter.create_test_case(test_case)?;
            adapter.save_test_case_id(id, test_case);
            Ok((SyncOutcome::Created, id))
        }
    }
}
