// crates/tcm-sync-cli/src/repository.rs
// ============================================================================
// Module: File-Backed Repositories
// Description: JSON test-case and execution-report repositories.
// Purpose: Supply the specification and report collaborators of the CLI.
// Dependencies: serde, serde_json, tcm-sync-core
// ============================================================================

//! ## Overview
//! [`JsonCaseRepository`] keeps one test-case document per `*.json` file and
//! rewrites only cases whose metadata changed. [`JsonReportRepository`] reads
//! report files holding arrays of report documents and matches them to cases
//! by linkage id, falling back to the case name. Files are visited in path
//! order and each is size-limited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tcm_sync_core::RepositoryError;
use tcm_sync_core::TestCase;
use tcm_sync_core::TestCaseRepository;
use tcm_sync_core::TestReport;
use tcm_sync_core::TestReportRepository;
use tcm_sync_core::TestStepOutcome;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of one test-case or report document.
const MAX_DOCUMENT_BYTES: u64 = 8 * 1024 * 1024;
/// Extension of repository documents.
const DOCUMENT_EXTENSION: &str = "json";

// ============================================================================
// SECTION: Test Case Repository
// ============================================================================

/// Test cases stored as one JSON document per file.
#[derive(Debug, Clone)]
pub struct JsonCaseRepository {
    /// Directory scanned for documents.
    dir: PathBuf,
}

impl JsonCaseRepository {
    /// Creates a repository over `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
        }
    }
}

impl TestCaseRepository for JsonCaseRepository {
    fn find_all(&self) -> Result<Vec<TestCase>, RepositoryError> {
        let mut test_cases = Vec::new();
        for path in list_documents(&self.dir)? {
            let mut test_case: TestCase = read_document(&path)?;
            test_case.set_source(path.to_string_lossy());
            test_cases.push(test_case);
        }
        Ok(test_cases)
    }

    fn save_modified(&self, test_cases: &[TestCase]) -> Result<Vec<TestCase>, RepositoryError> {
        let mut saved = Vec::new();
        for test_case in test_cases.iter().filter(|test_case| test_case.is_modified()) {
            let mut bytes = serde_json::to_vec_pretty(test_case)
                .map_err(|err| RepositoryError::Parse(format!("{}: {err}", test_case.name())))?;
            bytes.push(b'\n');
            fs::write(test_case.source(), bytes)
                .map_err(|err| RepositoryError::Io(format!("{}: {err}", test_case.source())))?;
            saved.push(test_case.clone());
        }
        Ok(saved)
    }
}

// ============================================================================
// SECTION: Report Repository
// ============================================================================

/// One execution report entry inside a report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Scenario name.
    pub name: String,
    /// Linked work item id, when the report carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_case_id: Option<u64>,
    /// Recorded step outcomes in execution order.
    #[serde(default)]
    pub steps: Vec<TestStepOutcome>,
}

/// Execution reports stored as JSON arrays of [`ReportDocument`].
#[derive(Debug, Clone)]
pub struct JsonReportRepository {
    /// Report entries in file order.
    documents: Vec<ReportDocument>,
    /// Linkage tag used for id matching.
    linkage_tag: String,
}

impl JsonReportRepository {
    /// Loads every report file under `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when a report file cannot be read or parsed.
    pub fn load(dir: &Path, linkage_tag: impl Into<String>) -> Result<Self, RepositoryError> {
        let mut documents = Vec::new();
        for path in list_documents(dir)? {
            let entries: Vec<ReportDocument> = read_document(&path)?;
            documents.extend(entries);
        }
        Ok(Self::from_documents(documents, linkage_tag))
    }

    /// Creates a repository over in-memory documents.
    #[must_use]
    pub fn from_documents(documents: Vec<ReportDocument>, linkage_tag: impl Into<String>) -> Self {
        Self {
            documents,
            linkage_tag: linkage_tag.into(),
        }
    }

    /// Returns documents matching the case, preferring id matches over name matches.
    fn matches(&self, test_case: &TestCase) -> Vec<&ReportDocument> {
        let linked = test_case.linkage_id(&self.linkage_tag).ok().flatten().map(|id| id.get());
        if let Some(id) = linked {
            let by_id: Vec<_> = self
                .documents
                .iter()
                .filter(|document| document.test_case_id == Some(id))
                .collect();
            if !by_id.is_empty() {
                return by_id;
            }
        }
        self.documents.iter().filter(|document| document.name == test_case.name()).collect()
    }
}

impl TestReportRepository for JsonReportRepository {
    fn find_report(&self, test_case: &TestCase) -> Result<TestReport, RepositoryError> {
        match self.matches(test_case).as_slice() {
            [] => Err(RepositoryError::NotFound(format!(
                "no report for test case '{}'",
                test_case.name()
            ))),
            [document] => Ok(TestReport::new(test_case.clone(), document.steps.clone())),
            many => Err(RepositoryError::Ambiguous(format!(
                "{} reports for test case '{}'",
                many.len(),
                test_case.name()
            ))),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Lists `*.json` files directly under `dir`, sorted by path.
fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, RepositoryError> {
    let entries = fs::read_dir(dir)
        .map_err(|err| RepositoryError::Io(format!("{}: {err}", dir.display())))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| RepositoryError::Io(err.to_string()))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Reads and decodes one size-limited JSON document.
fn read_document<T>(path: &Path) -> Result<T, RepositoryError>
where
    T: DeserializeOwned,
{
    let size = fs::metadata(path)
        .map_err(|err| RepositoryError::Io(format!("{}: {err}", path.display())))?
        .len();
    if size > MAX_DOCUMENT_BYTES {
        return Err(RepositoryError::Io(format!(
            "{}: document exceeds {MAX_DOCUMENT_BYTES} bytes",
            path.display()
        )));
    }
    let bytes =
        fs::read(path).map_err(|err| RepositoryError::Io(format!("{}: {err}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| RepositoryError::Parse(format!("{}: {err}", path.display())))
}
