// crates/tcm-sync-azure/src/fields.rs
// ============================================================================
// Module: Azure DevOps Field Names
// Description: Work-item field references, relation kinds, and fixed values.
// Purpose: Keep remote vocabulary in one place for patches and lookups.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Reference names used when reading and patching Azure DevOps "Test Case"
//! work items.

// ============================================================================
// SECTION: Field References
// ============================================================================

/// Work item type field.
pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";
/// Work item title.
pub const TITLE: &str = "System.Title";
/// Workflow state.
pub const STATE: &str = "System.State";
/// Test automation status.
pub const AUTOMATION_STATUS: &str = "Microsoft.VSTS.TCM.AutomationStatus";
/// Encoded steps document.
pub const STEPS: &str = "Microsoft.VSTS.TCM.Steps";
/// Encoded parameter declarations.
pub const PARAMETERS: &str = "Microsoft.VSTS.TCM.Parameters";
/// Encoded parameter data table.
pub const LOCAL_DATA_SOURCE: &str = "Microsoft.VSTS.TCM.LocalDataSource";

// ============================================================================
// SECTION: Fixed Values
// ============================================================================

/// Work item type managed by the adapter.
pub const TEST_CASE_TYPE: &str = "Test Case";
/// State assigned to synchronized test cases.
pub const DESIGN_STATE: &str = "Design";
/// Automation status assigned to synchronized test cases.
pub const NOT_AUTOMATED: &str = "Not Automated";

// ============================================================================
// SECTION: Relations
// ============================================================================

/// Relation kind from a test case to the requirement it tests.
pub const TESTS_RELATION: &str = "Microsoft.VSTS.Common.TestedBy-Reverse";
/// JSON-patch path appending to the relation collection.
pub const RELATIONS_APPEND_PATH: &str = "/relations/-";

/// Returns the JSON-patch path of a field.
#[must_use]
pub fn field_path(field: &str) -> String {
    format!("/fields/{field}")
}
