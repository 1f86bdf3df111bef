// crates/tcm-sync-azure/src/wire.rs
// ============================================================================
// Module: Azure DevOps Wire Types
// Description: Serde representations of Azure DevOps REST payloads.
// Purpose: Decode responses and encode request bodies with exact field names.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Only the attributes the adapter reads are modelled; unknown attributes in
//! responses are ignored. Request bodies serialize to the camelCase shapes the
//! REST endpoints expect.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::fields;

// ============================================================================
// SECTION: Work Items
// ============================================================================

/// Work item snapshot returned by the work item tracking API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Work item id.
    pub id: u64,
    /// Revision number.
    #[serde(default)]
    pub rev: u64,
    /// Field values keyed by reference name.
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    /// Relation edges (present when relations are expanded).
    #[serde(default)]
    pub relations: Vec<WorkItemRelation>,
    /// REST URL of the work item.
    #[serde(default)]
    pub url: String,
    /// Hypermedia links.
    #[serde(default, rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<WorkItemLinks>,
}

impl WorkItem {
    /// Returns a field value as a string, when present and textual.
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Returns the work item type.
    #[must_use]
    pub fn work_item_type(&self) -> Option<&str> {
        self.field_str(fields::WORK_ITEM_TYPE)
    }

    /// Returns the work item title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.field_str(fields::TITLE)
    }

    /// Returns the identity link used as a relation target.
    ///
    /// Prefers `_links.self.href` and falls back to `url`.
    #[must_use]
    pub fn self_link(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.self_link.as_ref())
            .map(|link| link.href.as_str())
            .or_else(|| (!self.url.is_empty()).then_some(self.url.as_str()))
    }

    /// Returns true when an edge with the same kind and target exists.
    #[must_use]
    pub fn has_relation(&self, rel: &str, url: &str) -> bool {
        self.relations.iter().any(|relation| relation.rel == rel && relation.url == url)
    }
}

/// Relation edge on a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemRelation {
    /// Relation kind reference name.
    pub rel: String,
    /// Target URL.
    pub url: String,
}

/// Hypermedia links of a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemLinks {
    /// Self link.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Link>,
}

/// Single hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link target.
    pub href: String,
}

// ============================================================================
// SECTION: References
// ============================================================================

/// Numeric id reference used by the test plan API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdReference {
    /// Referenced id.
    pub id: u64,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl IdReference {
    /// Creates an unnamed reference.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self {
            id,
            name: None,
        }
    }
}

/// String id reference used by the test run API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShallowReference {
    /// Referenced id rendered as a string.
    pub id: String,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ShallowReference {
    /// Creates a reference from any displayable id.
    #[must_use]
    pub fn new(id: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// ============================================================================
// SECTION: Test Plans and Suites
// ============================================================================

/// Test plan record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPlanRecord {
    /// Plan id.
    pub id: u64,
    /// Plan name.
    pub name: String,
    /// Root suite of the plan.
    pub root_suite: IdReference,
}

/// Body for creating a test plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePlanRequest {
    /// Plan name.
    pub name: String,
}

/// Suite type bound to a requirement work item.
pub const REQUIREMENT_SUITE: &str = "requirementTestSuite";

/// Test suite record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteRecord {
    /// Suite id.
    pub id: u64,
    /// Suite name.
    pub name: String,
    /// Suite type label.
    #[serde(default)]
    pub suite_type: Option<String>,
    /// Parent suite; absent for the root suite.
    #[serde(default)]
    pub parent_suite: Option<IdReference>,
    /// Bound requirement, for requirement suites.
    #[serde(default)]
    pub requirement_id: Option<u64>,
}

/// Body for creating a requirement-bound suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuiteRequest {
    /// Suite type label.
    pub suite_type: &'static str,
    /// Suite name.
    pub name: String,
    /// Parent suite.
    pub parent_suite: IdReference,
    /// Bound requirement.
    pub requirement_id: u64,
}

/// Test point record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPointRecord {
    /// Point id.
    pub id: u64,
    /// Test case the point belongs to.
    #[serde(default)]
    pub test_case_reference: Option<IdReference>,
}

/// Entry of the add-test-cases-to-suite body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteTestCaseRequest {
    /// Test case work item.
    pub work_item: IdReference,
}

// ============================================================================
// SECTION: Test Runs
// ============================================================================

/// Run state while results are being collected.
pub const RUN_IN_PROGRESS: &str = "InProgress";
/// Run state after results were submitted.
pub const RUN_COMPLETED: &str = "Completed";
/// Run state after an aborted publish session.
pub const RUN_ABORTED: &str = "Aborted";
/// Result state for submitted rows.
pub const RESULT_COMPLETED: &str = "Completed";

/// Body for creating a test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRunRequest {
    /// Run name.
    pub name: String,
    /// Plan the run belongs to.
    pub plan: ShallowReference,
    /// Build the run is associated with.
    pub build: ShallowReference,
    /// Whether the run is automated.
    pub automated: bool,
    /// Initial state.
    pub state: &'static str,
}

/// Test run record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRunRecord {
    /// Run id.
    pub id: u64,
    /// Run name.
    #[serde(default)]
    pub name: String,
    /// Run state.
    #[serde(default)]
    pub state: String,
}

/// Body for a run state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRunRequest {
    /// Target state.
    pub state: String,
}

/// Result row submitted to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResultRecord {
    /// Test case work item.
    pub test_case: ShallowReference,
    /// Test case title.
    pub test_case_title: String,
    /// Test case revision.
    pub test_case_revision: u64,
    /// Test point the result belongs to.
    pub test_point: ShallowReference,
    /// Suite holding the test point.
    pub test_suite: ShallowReference,
    /// Plan the run belongs to.
    pub test_plan: ShallowReference,
    /// Outcome label.
    pub outcome: String,
    /// Result state.
    pub state: String,
}

// ============================================================================
// SECTION: Collections
// ============================================================================

/// Collection envelope used by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListResponse<T> {
    /// Items of the current page.
    pub value: Vec<T>,
}
