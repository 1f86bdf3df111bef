// crates/tcm-sync-azure/src/patch.rs
// ============================================================================
// Module: Work Item Patch Builder
// Description: Minimal JSON-patch documents for test case work items.
// Purpose: Diff desired field values and relations against a remote snapshot.
// Dependencies: serde, serde_json, tcm-sync-core, crate::{fields, payload, wire}
// ============================================================================

//! ## Overview
//! A field missing from the remote snapshot yields `add`, a differing value
//! yields `replace`, an identical value yields nothing. Relation edges are
//! append-only: an `add` at `/relations/-` is emitted unless an edge with the
//! same kind and target already exists, and edges are never removed. An empty
//! document means the work item is up to date.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use tcm_sync_core::TestCase;
use tcm_sync_core::TmsError;
use tcm_sync_core::WorkItemId;

use crate::fields;
use crate::payload::EncodedPayload;
use crate::wire::WorkItem;

// ============================================================================
// SECTION: Patch Operations
// ============================================================================

/// JSON-patch operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    /// Adds a value.
    Add,
    /// Replaces an existing value.
    Replace,
}

/// Unit of write sent to the work item tracking API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOperation {
    /// Operation kind.
    pub op: PatchOp,
    /// Target path (`/fields/<name>` or `/relations/-`).
    pub path: String,
    /// Written value.
    pub value: Value,
}

impl PatchOperation {
    /// Creates a field operation.
    #[must_use]
    pub fn field(op: PatchOp, field: &str, value: &str) -> Self {
        Self {
            op,
            path: fields::field_path(field),
            value: Value::String(value.to_string()),
        }
    }

    /// Creates a relation append.
    #[must_use]
    pub fn relation(rel: &str, url: &str) -> Self {
        Self {
            op: PatchOp::Add,
            path: fields::RELATIONS_APPEND_PATH.to_string(),
            value: json!({ "rel": rel, "url": url }),
        }
    }

    /// Returns the field name for field operations.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.path.strip_prefix("/fields/")
    }
}

/// Appends the operation needed to bring `field` to `value`, if any.
pub fn patch_field(
    document: &mut Vec<PatchOperation>,
    field: &str,
    value: &str,
    remote: Option<&WorkItem>,
) {
    match remote.and_then(|item| item.fields.get(field)) {
        None | Some(Value::Null) => {
            document.push(PatchOperation::field(PatchOp::Add, field, value));
        }
        Some(Value::String(current)) if current == value => {}
        Some(_) => document.push(PatchOperation::field(PatchOp::Replace, field, value)),
    }
}

/// Appends a relation edge unless the remote snapshot already has it.
pub fn patch_relation(
    document: &mut Vec<PatchOperation>,
    rel: &str,
    url: &str,
    remote: Option<&WorkItem>,
) {
    if remote.is_some_and(|item| item.has_relation(rel, url)) {
        return;
    }
    document.push(PatchOperation::relation(rel, url));
}

// ============================================================================
// SECTION: Work Item Builder
// ============================================================================

/// Builds create and update documents for one test case.
#[derive(Debug, Clone)]
pub struct WorkItemPatchBuilder<'a> {
    /// Local test case.
    test_case: &'a TestCase,
    /// Identity links of requirements the case tests.
    requirement_links: Vec<String>,
}

impl<'a> WorkItemPatchBuilder<'a> {
    /// Creates a builder without requirement links.
    #[must_use]
    pub const fn new(test_case: &'a TestCase) -> Self {
        Self {
            test_case,
            requirement_links: Vec::new(),
        }
    }

    /// Sets the requirement identity links.
    #[must_use]
    pub fn with_requirement_links(mut self, links: Vec<String>) -> Self {
        self.requirement_links = links;
        self
    }

    /// Builds the document for a new work item: every field as `add`.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError::Validation`] when the case cannot be encoded.
    pub fn as_create(&self) -> Result<Vec<PatchOperation>, TmsError> {
        self.build(None)
    }

    /// Builds the minimal document updating `remote`.
    ///
    /// The caller verifies the work item type with [`ensure_test_case_type`]
    /// before diffing against `remote`.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError::Validation`] when the case cannot be encoded.
    pub fn as_update(&self, remote: &WorkItem) -> Result<Vec<PatchOperation>, TmsError> {
        self.build(Some(remote))
    }

    /// Diffs every semantic field and relation.
    fn build(&self, remote: Option<&WorkItem>) -> Result<Vec<PatchOperation>, TmsError> {
        let payload = EncodedPayload::encode(self.test_case)?;
        let desired = [
            (fields::TITLE, self.test_case.name()),
            (fields::STATE, fields::DESIGN_STATE),
            (fields::AUTOMATION_STATUS, fields::NOT_AUTOMATED),
            (fields::STEPS, payload.steps.as_str()),
            (fields::PARAMETERS, payload.parameters.as_str()),
            (fields::LOCAL_DATA_SOURCE, payload.local_data_source.as_str()),
        ];
        let mut document = Vec::new();
        for (field, value) in desired {
            patch_field(&mut document, field, value, remote);
        }
        for link in &self.requirement_links {
            patch_relation(&mut document, fields::TESTS_RELATION, link, remote);
        }
        Ok(document)
    }
}

/// Verifies that a work item is a test case.
///
/// # Errors
///
/// Returns [`TmsError::TypeMismatch`] naming the actual type otherwise.
pub fn ensure_test_case_type(id: WorkItemId, item: &WorkItem) -> Result<(), TmsError> {
    match item.work_item_type() {
        Some(fields::TEST_CASE_TYPE) => Ok(()),
        actual => Err(TmsError::TypeMismatch {
            id,
            actual: actual.unwrap_or_default().to_string(),
            expected: fields::TEST_CASE_TYPE.to_string(),
        }),
    }
}
