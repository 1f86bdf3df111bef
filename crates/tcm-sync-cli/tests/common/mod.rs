// crates/tcm-sync-cli/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for tcm-sync-cli tests.
// Purpose: Provide an in-memory adapter, a recording VCS client, and fixtures.
// Dependencies: serde_json, tcm-sync-core, tempfile
// ============================================================================

//! ## Overview
//! [`FakeAdapter`] hands out work item ids and accepts every report for a
//! linked case. [`RecordingVcs`] captures pushed paths. Fixture helpers write
//! specification and report documents into temp directories.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tcm_sync_core::EventSink;
use tcm_sync_core::MemoryEventSink;
use tcm_sync_core::PlanId;
use tcm_sync_core::PointId;
use tcm_sync_core::ResultRow;
use tcm_sync_core::RunContext;
use tcm_sync_core::RunId;
use tcm_sync_core::SuiteId;
use tcm_sync_core::TestCase;
use tcm_sync_core::TestMetadata;
use tcm_sync_core::TestReport;
use tcm_sync_core::TestStep;
use tcm_sync_core::TmsAdapter;
use tcm_sync_core::TmsError;
use tcm_sync_core::VcsClient;
use tcm_sync_core::VcsError;
use tcm_sync_core::WorkItemId;

// ============================================================================
// SECTION: Fake Adapter
// ============================================================================

/// In-memory adapter keyed by work item id.
#[derive(Default)]
pub struct FakeAdapter {
    /// Captured events.
    pub sink: MemoryEventSink,
    /// Next id handed out by `create_test_case`.
    pub next_id: Cell<u64>,
    /// Remote titles keyed by work item id.
    pub remote_titles: RefCell<BTreeMap<u64, String>>,
    /// Case names whose create call fails.
    pub fail_create: BTreeSet<String>,
    /// Case names seen by `add_test_report_to_run_context`.
    pub published: RefCell<Vec<String>>,
}

impl FakeAdapter {
    /// Creates an adapter handing out ids from `first_id`.
    pub fn starting_at(first_id: u64) -> Self {
        let adapter = Self::default();
        adapter.next_id.set(first_id);
        adapter
    }

    /// Marks `name` as failing on create.
    pub fn failing_create(mut self, name: &str) -> Self {
        self.fail_create.insert(name.to_string());
        self
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
        self.remote_titles.borrow_mut().insert(id, test_case.name().to_string());
        Ok(WorkItemId::from_raw(id).unwrap())
    }

    fn update_test_case(&self, id: WorkItemId, test_case: &TestCase) -> Result<bool, TmsError> {
        let mut titles = self.remote_titles.borrow_mut();
        let changed = titles.get(&id.get()).is_none_or(|title| title != test_case.name());
        titles.insert(id.get(), test_case.name().to_string());
        Ok(changed)
    }

    fn setup_run_context(&self) -> Result<RunContext, TmsError> {
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
        let id = report
            .test_case
            .linkage_id("testcase")?
            .ok_or_else(|| TmsError::Validation("test case is not linked".to_string()))?;
        self.published.borrow_mut().push(report.test_case.name().to_string());
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

    fn finalize_run_context(&self, _context: &RunContext) -> Result<(), TmsError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Recording VCS
// ============================================================================

/// VCS client that records pushes and optionally fails them.
#[derive(Default)]
pub struct RecordingVcs {
    /// Paths passed to each push.
    pub pushes: RefCell<Vec<Vec<String>>>,
    /// Error returned by every push, when set.
    pub failure: Option<String>,
}

impl VcsClient for RecordingVcs {
    fn sync_to_remote(&self, paths: &[String]) -> Result<(), VcsError> {
        self.pushes.borrow_mut().push(paths.to_vec());
        match &self.failure {
            Some(message) => Err(VcsError::Command(message.clone())),
            None => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a single-step case carrying the given metadata tags.
pub fn case(name: &str, tags: &[(&str, &str)]) -> TestCase {
    let metadata = tags.iter().map(|(tag, value)| TestMetadata::new(*tag, *value)).collect();
    TestCase::new(name, "")
        .with_steps(vec![TestStep::new("Given a user", "Then it works")])
        .with_metadata(metadata)
}

/// Writes `test_case` as `<dir>/<file>` and returns the path.
pub fn write_case(dir: &Path, file: &str, test_case: &TestCase) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, serde_json::to_vec_pretty(test_case).unwrap()).unwrap();
    path
}

/// Writes raw JSON to `<dir>/<file>` and returns the path.
pub fn write_json(dir: &Path, file: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, serde_json::to_vec(value).unwrap()).unwrap();
    path
}

/// Reads a case document back from disk.
pub fn read_case(path: &Path) -> TestCase {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}
