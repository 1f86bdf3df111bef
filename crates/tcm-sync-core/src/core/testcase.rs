// crates/tcm-sync-core/src/core/testcase.rs
// ============================================================================
// Module: TCM Sync Test Case Model
// Description: Test cases, steps, parameters, and metadata tags.
// Purpose: Model the executable specification the engine synchronizes.
// Dependencies: serde, crate::core::{error, identifiers}
// ============================================================================

//! ## Overview
//! A [`TestCase`] is owned by the external specification repository. The sync
//! engine only reads it and appends metadata tags (for example the linkage id
//! of a freshly created work item). Appending metadata marks the case as
//! modified so the repository knows which sources to rewrite.
//!
//! Invariants:
//! - Step order is significant and preserved.
//! - Parameter table rows are ordered by their 0-based row index.
//! - A single-valued tag (the linkage tag) resolves to at most one id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::TmsError;
use crate::core::identifiers::WorkItemId;

// ============================================================================
// SECTION: Steps
// ============================================================================

/// Step classification derived from the expectation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Step without an expectation.
    Action,
    /// Step with an expectation to validate.
    Validation,
}

/// A single condition/expectation pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    /// Condition (action) text.
    pub condition: String,
    /// Expectation text; empty for action steps.
    #[serde(default)]
    pub expectation: String,
}

impl TestStep {
    /// Creates a step from condition and expectation text.
    #[must_use]
    pub fn new(condition: impl Into<String>, expectation: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            expectation: expectation.into(),
        }
    }

    /// Returns the step kind: action when the expectation is empty.
    #[must_use]
    pub fn kind(&self) -> StepKind {
        if self.expectation.is_empty() { StepKind::Action } else { StepKind::Validation }
    }
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Declared parameter of a data-driven test case.
///
/// # Invariants
/// - `placeholder` is the literal token used inside step text (e.g. `<name>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDef {
    /// Parameter name.
    pub name: String,
    /// Placeholder token used inside step text.
    pub placeholder: String,
}

impl ParameterDef {
    /// Creates a parameter with the conventional `<name>` placeholder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let placeholder = format!("<{name}>");
        Self {
            name,
            placeholder,
        }
    }

    /// Creates a parameter with an explicit placeholder token.
    #[must_use]
    pub fn with_placeholder(name: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            placeholder: placeholder.into(),
        }
    }

    /// Returns the bind-variable token substituted for the placeholder.
    #[must_use]
    pub fn bind_token(&self) -> String {
        format!("@{}", self.name)
    }
}

/// One row of parameter values keyed by parameter name.
pub type ParameterRow = BTreeMap<String, String>;

/// Parameter table keyed by 0-based row index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterTable(BTreeMap<usize, ParameterRow>);

impl ParameterTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from rows in table order.
    #[must_use]
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = ParameterRow>,
    {
        Self(rows.into_iter().enumerate().collect())
    }

    /// Inserts or replaces the row at `index`.
    pub fn insert(&mut self, index: usize, row: ParameterRow) {
        self.0.insert(index, row);
    }

    /// Returns rows in row-index order.
    pub fn rows(&self) -> impl Iterator<Item = &ParameterRow> {
        self.0.values()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// SECTION: Metadata
// ============================================================================

/// Name/value tag attached to a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMetadata {
    /// Tag name.
    pub name: String,
    /// Tag value.
    pub value: String,
}

impl TestMetadata {
    /// Creates a metadata tag.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Test Case
// ============================================================================

/// Executable specification scenario synchronized as a remote work item.
///
/// # Invariants
/// - `metadata` preserves insertion order.
/// - `modified` is set only by [`TestCase::add_metadata`] and is never serialized.
/// - `source` is assigned by the loading repository and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Scenario name (becomes the work item title).
    name: String,
    /// Ordered steps.
    #[serde(default)]
    steps: Vec<TestStep>,
    /// Declared parameters in declaration order.
    #[serde(default)]
    parameters: Vec<ParameterDef>,
    /// Example rows for data-driven scenarios.
    #[serde(default)]
    examples: ParameterTable,
    /// Ordered metadata tags.
    #[serde(default)]
    metadata: Vec<TestMetadata>,
    /// Source locator (file path or URI) in the specification repository.
    #[serde(skip)]
    source: String,
    /// Whether metadata was appended since loading.
    #[serde(skip)]
    modified: bool,
}

impl TestCase {
    /// Creates a test case with the given name and source locator.
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            parameters: Vec::new(),
            examples: ParameterTable::new(),
            metadata: Vec::new(),
            source: source.into(),
            modified: false,
        }
    }

    /// Replaces the steps.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<TestStep>) -> Self {
        self.steps = steps;
        self
    }

    /// Replaces the parameter definitions and example table.
    #[must_use]
    pub fn with_parameters(
        mut self,
        parameters: Vec<ParameterDef>,
        examples: ParameterTable,
    ) -> Self {
        self.parameters = parameters;
        self.examples = examples;
        self
    }

    /// Replaces the metadata tags without marking the case modified.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Vec<TestMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Overrides the source locator.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    /// Returns the scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ordered steps.
    #[must_use]
    pub fn steps(&self) -> &[TestStep] {
        &self.steps
    }

    /// Returns true when the case declares parameters.
    #[must_use]
    pub fn parameterized(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Returns parameter definitions in declaration order.
    #[must_use]
    pub fn parameter_defs(&self) -> &[ParameterDef] {
        &self.parameters
    }

    /// Returns the example table.
    #[must_use]
    pub const fn parameter_table(&self) -> &ParameterTable {
        &self.examples
    }

    /// Returns the source locator.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns all metadata tags.
    #[must_use]
    pub fn metadata(&self) -> &[TestMetadata] {
        &self.metadata
    }

    /// Returns the tags with the given name, in insertion order.
    pub fn find_metadata<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TestMetadata> {
        self.metadata.iter().filter(move |tag| tag.name == name)
    }

    /// Appends a metadata tag and marks the case modified.
    pub fn add_metadata(&mut self, tag: TestMetadata) {
        self.metadata.push(tag);
        self.modified = true;
    }

    /// Returns true when metadata was appended since loading.
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Resolves a single-valued id tag.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError::Validation`] when the tag appears more than once or
    /// its value is not a positive integer.
    pub fn linkage_id(&self, tag: &str) -> Result<Option<WorkItemId>, TmsError> {
        let values: Vec<&str> = self.find_metadata(tag).map(|entry| entry.value.as_str()).collect();
        match values.as_slice() {
            [] => Ok(None),
            [value] => parse_id(self, tag, value).map(Some),
            many => Err(TmsError::Validation(format!(
                "the '{}' test case is linked to multiple work items: #{}, which is not supported",
                self.name,
                many.join(", #")
            ))),
        }
    }

    /// Resolves a multi-valued id tag, dropping duplicates but keeping first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError::Validation`] when a value is not a positive integer.
    pub fn linked_ids(&self, tag: &str) -> Result<Vec<WorkItemId>, TmsError> {
        let mut ids = Vec::new();
        for entry in self.find_metadata(tag) {
            let id = parse_id(self, tag, &entry.value)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

/// Parses a tag value into a work item id, naming the case on failure.
fn parse_id(test_case: &TestCase, tag: &str, value: &str) -> Result<WorkItemId, TmsError> {
    WorkItemId::parse(value).ok_or_else(|| {
        TmsError::Validation(format!(
            "the '{}' test case has a non-numeric '{tag}' tag: '{value}'",
            test_case.name
        ))
    })
}
