// crates/tcm-sync-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for tcm-sync-core tests.
// Purpose: Provide a scriptable in-memory adapter and case builders.
// Dependencies: tcm-sync-core
// ============================================================================

//! ## Overview
//! Provides a recording [`FakeAdapter`] whose capability hooks can be scripted
//! to fail, plus helpers for building test cases and reports.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tcm_sync_core::EventSink;
use tcm_sync_core::MemoryEventSink;
use tcm_sync_core::PlanId;
use tcm_sync_core::PointId;
use tcm_sync_core::ResultRow;
use tcm_sync_core::RunContext;
use tcm_sync_core::RunId;
use tcm_sync_core::StepOutcome;
use tcm_sync_core::SuiteId;
use tcm_sync_core::TestCase;
use tcm_sync_core::TestMetadata;
use tcm_sync_core::TestReport;
use tcm_sync_core::TestStep;
use tcm_sync_core::TestStepOutcome;
use tcm_sync_core::TmsAdapter;
use tcm_sync_core::TmsError;
use tcm_sync_core::WorkItemId;

// ============================================================================
// SECTION: Fake Adapter
// ============================================================================

/// Scriptable adapter that records every hook invocation.
#[derive(Default)]
pub struct FakeAdapter {
    /// Captured events.
    pub sink: MemoryEventSink,
    /// Next id handed out by `create_test_case`.
    pub next_id: Cell<u64>,
    /// Remote titles keyed by work item id.
    pub remote_titles: RefCell<BTreeMap<u64, String>>,
    /// Write log (`create:<name>` / `update:<id>`).
    pub writes: RefCell<Vec<String>>,
    /// Case names whose create call fails with a transport error.
    pub fail_create: BTreeSet<String>,
    /// Case names whose report cannot be added.
    pub fail_report: BTreeSet<String>,
    /// Whether setup fails.
    pub fail_setup: bool,
    /// Whether finalize fails.
    pub fail_finalize: bool,
    /// Number of setup calls.
    pub setups: Cell<usize>,
    /// Row counts seen by finalize calls.
    pub finalized: RefCell<Vec<usize>>,
    /// Number of abandon calls.
    pub abandoned: Cell<usize>,
}

impl FakeAdapter {
    /// Creates an adapter that hands out ids starting at `first_id`.
    pub fn starting_at(first_id: u64) -> Self {
        let adapter = Self::default();
        adapter.next_id.set(first_id);
        adapter
    }
}

impl TmsAdapter for FakeAdapter {
    fn linkage_tag(&self) -> &str {
        "testcase"
    }

    fn events(&self) -> &dyn EventSink {
        &self.sink
    }

    fn create_test_case(&self, test_case: &TestCase) -> Result<WorkItemId, TmsError> {
        if self.fail_create.contains(test_case.name()) {
            return Err(TmsError::Transport("connection reset".to_string()));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.writes.borrow_mut().push(format!("create:{}", test_case.name()));
        self.remote_titles.borrow_mut().insert(id, test_case.name().to_string());
        Ok(WorkItemId::from_raw(id).unwrap())
    }

    fn update_test_case(&self, id: WorkItemId, test_case: &TestCase) -> Result<bool, TmsError> {
        let mut titles = self.remote_titles.borrow_mut();
        let current = titles
            .get(&id.get())
            .cloned()
            .ok_or_else(|| TmsError::Transport(format!("work item {id} does not exist")))?;
        if current == test_case.name() {
            return Ok(false);
        }
        titles.insert(id.get(), test_case.name().to_string());
        self.writes.borrow_mut().push(format!("update:{id}"));
        Ok(true)
    }

    fn setup_run_context(&self) -> Result<RunContext, TmsError> {
        self.setups.set(self.setups.get() + 1);
        if self.fail_setup {
            return Err(TmsError::Transport("plan lookup failed".to_string()));
        }
        Ok(RunContext::new(
            PlanId::from_raw(1).unwrap(),
            SuiteId::from_raw(2).unwrap(),
            RunId::from_raw(3).unwrap(),
            BTreeMap::new(),
        ))
    }

    fn add_test_report_to_run_context(
        &self,
        report: &TestReport,
        context: &mut RunContext,
    ) -> Result<(), TmsError> {
        if self.fail_report.contains(report.test_case.name()) {
            return Err(TmsError::NotFound("test point".to_string()));
        }
        let id = report.test_case.linkage_id("testcase")?.unwrap();
        context.push_results([ResultRow {
            test_case: id,
            test_case_revision: 1,
            test_case_title: report.test_case.name().to_string(),
            suite: context.root_suite_id(),
            suite_name: "root".to_string(),
            point: PointId::from_raw(id.get()).unwrap(),
            outcome: report.result_outcome(),
        }]);
        Ok(())
    }

    fn finalize_run_context(&self, context: &RunContext) -> Result<(), TmsError> {
        self.finalized.borrow_mut().push(context.results().len());
        if self.fail_finalize {
            return Err(TmsError::Transport("results submit failed".to_string()));
        }
        Ok(())
    }

    fn abandon_run_context(&self, _context: &RunContext) -> Result<(), TmsError> {
        self.abandoned.set(self.abandoned.get() + 1);
        Ok(())
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Creates a single-step case with the given name.
pub fn case(name: &str) -> TestCase {
    TestCase::new(name, format!("specs/{name}.json"))
        .with_steps(vec![TestStep::new("Given a user", "Then it works")])
}

/// Creates a case linked to the given work item ids.
pub fn linked_case(name: &str, ids: &[u64]) -> TestCase {
    let tags = ids.iter().map(|id| TestMetadata::new("testcase", id.to_string())).collect();
    case(name).with_metadata(tags)
}

/// Creates a report whose steps all carry `outcome`.
pub fn report(test_case: TestCase, outcome: StepOutcome) -> TestReport {
    let outcomes = test_case
        .steps()
        .iter()
        .map(|step| TestStepOutcome {
            step: step.clone(),
            outcome,
        })
        .collect();
    TestReport::new(test_case, outcomes)
}
