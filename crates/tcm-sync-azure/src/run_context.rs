// crates/tcm-sync-azure/src/run_context.rs
// ============================================================================
// Module: Azure DevOps Run-Context Manager
// Description: Plan, suite, and test point resolution for one publish session.
// Purpose: Accumulate result rows and close the test run.
// Dependencies: tcm-sync-core, crate::{api, fields, patch, wire}
// ============================================================================

//! ## Overview
//! A publish session runs `setup -> add_report* -> finalize`:
//! - `setup` finds the plan by name (following continuation tokens) or creates
//!   it, indexes its suites by bound requirement, and opens an in-progress run.
//! - `add_report` places the case in one requirement suite per linked
//!   requirement (and takes it out of the root suite), or in the root suite
//!   when it has no requirements, then appends one result row per placement.
//!   Suites and points are created when absent; results are not written yet.
//! - `finalize` submits every accumulated row in one batch and completes the
//!   run; `abandon` moves it to the aborted state instead.
//!
//! Test point lookup retries once: when a case has no point in a suite it is
//! added to the suite and the points are queried again. A second miss is
//! [`TmsError::NotFound`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use tcm_sync_core::EventSink;
use tcm_sync_core::PlanId;
use tcm_sync_core::PointId;
use tcm_sync_core::ResultRow;
use tcm_sync_core::RunContext;
use tcm_sync_core::RunId;
use tcm_sync_core::SuiteId;
use tcm_sync_core::SuiteKey;
use tcm_sync_core::SyncEvent;
use tcm_sync_core::TestPoint;
use tcm_sync_core::TestReport;
use tcm_sync_core::TestSuite;
use tcm_sync_core::TmsError;
use tcm_sync_core::WorkItemId;

use crate::api::AzureDevopsApi;
use crate::patch::ensure_test_case_type;
use crate::wire;
use crate::wire::CreateRunRequest;
use crate::wire::CreateSuiteRequest;
use crate::wire::IdReference;
use crate::wire::RunResultRecord;
use crate::wire::ShallowReference;
use crate::wire::TestPlanRecord;
use crate::wire::TestPointRecord;
use crate::wire::TestSuiteRecord;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Session settings shared by every publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Name of the target test plan.
    pub test_plan: String,
    /// Build the run is associated with.
    pub build_id: String,
    /// Name given to created runs.
    pub run_name: String,
    /// Single-valued tag linking a case to its work item.
    pub test_case_tag: String,
    /// Multi-valued tag linking a case to requirements.
    pub requirement_tag: String,
}

// ============================================================================
// SECTION: Manager
// ============================================================================

/// Resolves remote entities for one publish session.
pub struct RunContextManager<'a, A: ?Sized> {
    /// Remote operations.
    api: &'a A,
    /// Session settings.
    settings: &'a RunSettings,
    /// Sink for remote write events.
    events: &'a dyn EventSink,
}

impl<'a, A> RunContextManager<'a, A>
where
    A: AzureDevopsApi + ?Sized,
{
    /// Creates a manager over borrowed collaborators.
    #[must_use]
    pub const fn new(api: &'a A, settings: &'a RunSettings, events: &'a dyn EventSink) -> Self {
        Self {
            api,
            settings,
            events,
        }
    }

    /// Opens a publish session.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when the plan, suites, or run cannot be resolved.
    pub fn setup(&self) -> Result<RunContext, TmsError> {
        let plan = self.resolve_plan()?;
        let plan_id = PlanId::from_raw(plan.id)
            .ok_or_else(|| TmsError::Transport("test plan has id 0".to_string()))?;
        let root_id = SuiteId::from_raw(plan.root_suite.id)
            .ok_or_else(|| TmsError::Transport(format!("test plan #{plan_id} has no root suite")))?;
        let root = TestSuite {
            id: root_id,
            name: plan.root_suite.name.clone().unwrap_or_else(|| plan.name.clone()),
            parent: None,
            requirement: None,
        };
        let suites = index_suites(root, self.api.list_test_suites(plan_id)?);

        let run = self.api.create_test_run(&CreateRunRequest {
            name: self.settings.run_name.clone(),
            plan: ShallowReference::new(plan_id),
            build: ShallowReference::new(&self.settings.build_id),
            automated: true,
            state: wire::RUN_IN_PROGRESS,
        })?;
        self.events.record(&SyncEvent::remote_write("create_test_run", format!("run #{}", run.id)));
        let run_id = RunId::from_raw(run.id)
            .ok_or_else(|| TmsError::Transport("test run has id 0".to_string()))?;

        Ok(RunContext::new(plan_id, root_id, run_id, suites))
    }

    /// Finds the configured plan by name, creating it when absent.
    fn resolve_plan(&self) -> Result<TestPlanRecord, TmsError> {
        let mut token: Option<String> = None;
        loop {
            let page = self.api.list_test_plans(token.as_deref())?;
            if let Some(plan) =
                page.items.into_iter().find(|plan| plan.name == self.settings.test_plan)
            {
                return Ok(plan);
            }
            match page.continuation_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        let plan = self.api.create_test_plan(&self.settings.test_plan)?;
        self.events
            .record(&SyncEvent::remote_write("create_test_plan", format!("plan #{}", plan.id)));
        Ok(plan)
    }

    /// Returns the suite bound to `requirement`, creating it under the root suite.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when the suite cannot be created.
    pub fn resolve_suite(
        &self,
        requirement: WorkItemId,
        context: &mut RunContext,
    ) -> Result<TestSuite, TmsError> {
        let key = SuiteKey::Requirement(requirement);
        if let Some(suite) = context.suite(key) {
            return Ok(suite.clone());
        }
        let root = context.root_suite_id();
        let record = self.api.create_test_suite(
            context.plan_id(),
            &CreateSuiteRequest {
                suite_type: wire::REQUIREMENT_SUITE,
                name: requirement.to_string(),
                parent_suite: IdReference::new(root.get()),
                requirement_id: requirement.get(),
            },
        )?;
        self.events.record(&SyncEvent::remote_write(
            "create_test_suite",
            format!("suite #{} for requirement #{requirement}", record.id),
        ));
        let id = SuiteId::from_raw(record.id)
            .ok_or_else(|| TmsError::Transport("test suite has id 0".to_string()))?;
        let suite = TestSuite {
            id,
            name: record.name,
            parent: Some(root),
            requirement: Some(requirement),
        };
        Ok(context.insert_suite(key, suite).clone())
    }

    /// Returns the point of `test_case` in `suite`, adding the case once when missing.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError::NotFound`] when no point exists after the retry, or
    /// [`TmsError::Transport`] on remote failures.
    pub fn resolve_test_point(
        &self,
        test_case: WorkItemId,
        suite: SuiteId,
        context: &RunContext,
    ) -> Result<TestPoint, TmsError> {
        let plan = context.plan_id();
        let points = self.api.list_test_points(plan, suite, test_case)?;
        if let Some(point) = first_point(&points, test_case, suite) {
            return Ok(point);
        }
        self.api.add_test_case_to_suite(plan, suite, test_case)?;
        self.events.record(&SyncEvent::remote_write(
            "add_test_case_to_suite",
            format!("test case #{test_case} to suite #{suite}"),
        ));
        let points = self.api.list_test_points(plan, suite, test_case)?;
        first_point(&points, test_case, suite).ok_or_else(|| {
            TmsError::NotFound(format!(
                "test point for test case #{test_case} in suite #{suite} of plan #{plan}"
            ))
        })
    }

    /// Resolves every suite placement of a test case.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when a suite or point cannot be resolved.
    pub fn resolve_placements(
        &self,
        test_case: WorkItemId,
        requirements: &[WorkItemId],
        context: &mut RunContext,
    ) -> Result<Vec<(TestSuite, TestPoint)>, TmsError> {
        if requirements.is_empty() {
            let root = context
                .suite(SuiteKey::Unbound)
                .cloned()
                .ok_or_else(|| TmsError::NotFound("root suite".to_string()))?;
            let point = self.resolve_test_point(test_case, root.id, context)?;
            return Ok(vec![(root, point)]);
        }
        let mut placements = Vec::with_capacity(requirements.len());
        for requirement in requirements {
            let suite = self.resolve_suite(*requirement, context)?;
            let point = self.resolve_test_point(test_case, suite.id, context)?;
            placements.push((suite, point));
        }
        let root = context.root_suite_id();
        if self.api.remove_test_case_from_suite(context.plan_id(), root, test_case)? {
            self.events.record(&SyncEvent::remote_write(
                "remove_test_case_from_suite",
                format!("test case #{test_case} from suite #{root}"),
            ));
        }
        Ok(placements)
    }

    /// Accumulates result rows for one report.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError`] when the case is unlinked, its work item is missing
    /// or mistyped, or a placement cannot be resolved.
    pub fn add_report(
        &self,
        report: &TestReport,
        context: &mut RunContext,
    ) -> Result<(), TmsError> {
        let test_case = &report.test_case;
        let id = test_case.linkage_id(&self.settings.test_case_tag)?.ok_or_else(|| {
            TmsError::Validation(format!(
                "the '{}' test case is not linked to a work item",
                test_case.name()
            ))
        })?;
        let item = self
            .api
            .get_work_item(id)?
            .ok_or_else(|| TmsError::NotFound(format!("work item #{id}")))?;
        ensure_test_case_type(id, &item)?;
        let requirements = test_case.linked_ids(&self.settings.requirement_tag)?;
        let placements = self.resolve_placements(id, &requirements, context)?;

        let outcome = report.result_outcome();
        let title = item.title().unwrap_or_else(|| test_case.name()).to_string();
        context.push_results(placements.into_iter().map(|(suite, point)| ResultRow {
            test_case: id,
            test_case_revision: item.rev,
            test_case_title: title.clone(),
            suite: suite.id,
            suite_name: suite.name,
            point: point.id,
            outcome,
        }));
        Ok(())
    }

    /// Submits accumulated rows in one batch and completes the run.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError::Transport`] when the submit or state change fails.
    pub fn finalize(&self, context: &RunContext) -> Result<(), TmsError> {
        let run = context.run_id();
        let plan = context.plan_id();
        let records: Vec<RunResultRecord> =
            context.results().iter().map(|row| result_record(plan, row)).collect();
        if !records.is_empty() {
            self.api.add_test_results(run, &records)?;
            self.events.record(&SyncEvent::remote_write(
                "add_test_results",
                format!("{} results to run #{run}", records.len()),
            ));
        }
        self.api.update_test_run_state(run, wire::RUN_COMPLETED)?;
        self.events.record(&SyncEvent::remote_write("complete_test_run", format!("run #{run}")));
        Ok(())
    }

    /// Moves the run to the aborted state.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError::Transport`] when the state change fails.
    pub fn abandon(&self, context: &RunContext) -> Result<(), TmsError> {
        let run = context.run_id();
        self.api.update_test_run_state(run, wire::RUN_ABORTED)?;
        self.events.record(&SyncEvent::remote_write("abort_test_run", format!("run #{run}")));
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Indexes suites by bound requirement; the root suite takes the unbound key.
///
/// Suites without a requirement other than the root are not indexed. When two
/// suites bind the same requirement the first listed one wins.
fn index_suites(root: TestSuite, records: Vec<TestSuiteRecord>) -> BTreeMap<SuiteKey, TestSuite> {
    let root_id = root.id;
    let mut index = BTreeMap::new();
    index.insert(SuiteKey::Unbound, root);
    for record in records {
        let (Some(id), Some(requirement)) =
            (SuiteId::from_raw(record.id), record.requirement_id.and_then(WorkItemId::from_raw))
        else {
            continue;
        };
        if id == root_id {
            continue;
        }
        index.entry(SuiteKey::Requirement(requirement)).or_insert_with(|| TestSuite {
            id,
            name: record.name,
            parent: record.parent_suite.and_then(|parent| SuiteId::from_raw(parent.id)),
            requirement: Some(requirement),
        });
    }
    index
}

/// Picks the first point belonging to `test_case`.
fn first_point(
    points: &[TestPointRecord],
    test_case: WorkItemId,
    suite: SuiteId,
) -> Option<TestPoint> {
    points
        .iter()
        .filter(|point| {
            point
                .test_case_reference
                .as_ref()
                .is_none_or(|reference| reference.id == test_case.get())
        })
        .find_map(|point| PointId::from_raw(point.id))
        .map(|id| TestPoint {
            id,
            test_case,
            suite,
        })
}

/// Converts an accumulated row into its wire form.
fn result_record(plan: PlanId, row: &ResultRow) -> RunResultRecord {
    RunResultRecord {
        test_case: ShallowReference::new(row.test_case),
        test_case_title: row.test_case_title.clone(),
        test_case_revision: row.test_case_revision,
        test_point: ShallowReference::new(row.point),
        test_suite: ShallowReference::new(row.suite).with_name(&row.suite_name),
        test_plan: ShallowReference::new(plan),
        outcome: row.outcome.as_str().to_string(),
        state: wire::RESULT_COMPLETED.to_string(),
    }
}
