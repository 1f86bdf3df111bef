// crates/tcm-sync-azure/src/payload.rs
// ============================================================================
// Module: Test Case Payload Encoder
// Description: XML encodings of steps, parameters, and parameter tables.
// Purpose: Produce the structured field values stored on test case work items.
// Dependencies: tcm-sync-core
// ============================================================================

//! ## Overview
//! Three documents are produced per test case:
//! - `<steps>`: one `<step>` per case step (1-based ids), typed `ActionStep`
//!   when the expectation is empty and `ValidateStep` otherwise, each holding
//!   the condition and expectation as two `<parameterizedString>` children.
//! - `<parameters>`: one `<param bind="default">` per declared parameter.
//! - `<NewDataSet>`: an `xs:schema` declaring one string column per parameter,
//!   followed by one `<Table1>` row per example row.
//!
//! Documents are rendered without whitespace between elements. Text and
//! attribute values are escaped. Parameter names become element names in the
//! data-source rows, so a parameterized case whose names are not XML names is
//! rejected before any document is produced. In parameterized cases every occurrence of a
//! placeholder token is replaced by its `@name` bind token before encoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use tcm_sync_core::ParameterDef;
use tcm_sync_core::StepKind;
use tcm_sync_core::TestCase;
use tcm_sync_core::TmsError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Step type for steps without an expectation.
const ACTION_STEP: &str = "ActionStep";
/// Step type for steps with an expectation.
const VALIDATE_STEP: &str = "ValidateStep";
/// Row element name of the data-source table.
const TABLE_ROW: &str = "Table1";

// ============================================================================
// SECTION: Encoded Payload
// ============================================================================

/// Encoded field values for one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// Steps document.
    pub steps: String,
    /// Parameter declarations document.
    pub parameters: String,
    /// Data-source document.
    pub local_data_source: String,
}

impl EncodedPayload {
    /// Encodes all three documents for `test_case`.
    ///
    /// # Errors
    ///
    /// Returns [`TmsError::Validation`] when a parameter name cannot be used
    /// as a data-source column.
    pub fn encode(test_case: &TestCase) -> Result<Self, TmsError> {
        Ok(Self {
            steps: encode_steps(test_case),
            parameters: encode_parameters(test_case),
            local_data_source: encode_data_source(test_case)?,
        })
    }
}

// ============================================================================
// SECTION: Steps
// ============================================================================

/// Encodes the steps document.
#[must_use]
pub fn encode_steps(test_case: &TestCase) -> String {
    let steps = test_case.steps();
    if steps.is_empty() {
        return r#"<steps id="0" last="0"/>"#.to_string();
    }
    let defs: &[ParameterDef] =
        if test_case.parameterized() { test_case.parameter_defs() } else { &[] };
    let mut xml = format!(r#"<steps id="0" last="{}">"#, steps.len());
    for (index, step) in steps.iter().enumerate() {
        let step_type = match step.kind() {
            StepKind::Action => ACTION_STEP,
            StepKind::Validation => VALIDATE_STEP,
        };
        let _ = write!(xml, r#"<step id="{}" type="{step_type}">"#, index + 1);
        push_parameterized_string(&mut xml, &parameterize(&step.condition, defs));
        push_parameterized_string(&mut xml, &parameterize(&step.expectation, defs));
        xml.push_str("</step>");
    }
    xml.push_str("</steps>");
    xml
}

/// Appends one formatted text child.
fn push_parameterized_string(xml: &mut String, text: &str) {
    xml.push_str(r#"<parameterizedString isformatted="true">"#);
    xml.push_str(&xml_escape(text));
    xml.push_str("</parameterizedString>");
}

/// Replaces every placeholder occurrence with its bind token, in declaration order.
#[must_use]
pub fn parameterize(text: &str, defs: &[ParameterDef]) -> String {
    defs.iter().fold(text.to_string(), |acc, def| {
        if def.placeholder.is_empty() {
            acc
        } else {
            acc.replace(&def.placeholder, &def.bind_token())
        }
    })
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Encodes the parameter declarations document.
#[must_use]
pub fn encode_parameters(test_case: &TestCase) -> String {
    if !test_case.parameterized() {
        return "<parameters/>".to_string();
    }
    let mut xml = String::from("<parameters>");
    for def in test_case.parameter_defs() {
        let _ = write!(xml, r#"<param name="{}" bind="default"/>"#, xml_escape(&def.name));
    }
    xml.push_str("</parameters>");
    xml
}

// ============================================================================
// SECTION: Data Source
// ============================================================================

/// Encodes the data-source document.
///
/// # Errors
///
/// Returns [`TmsError::Validation`] when a parameter name is not an XML name.
pub fn encode_data_source(test_case: &TestCase) -> Result<String, TmsError> {
    if !test_case.parameterized() {
        return Ok("<NewDataSet/>".to_string());
    }
    let defs = test_case.parameter_defs();
    for def in defs {
        if !is_column_name(&def.name) {
            return Err(TmsError::Validation(format!(
                "parameter name '{}' of test case '{}' is not a valid column name",
                def.name,
                test_case.name()
            )));
        }
    }
    let mut xml = String::from("<NewDataSet>");
    xml.push_str(concat!(
        r#"<xs:schema id="NewDataSet" xmlns:xs="http://www.w3.org/2001/XMLSchema" "#,
        r#"xmlns:msdata="urn:schemas-microsoft-com:xml-msdata">"#,
        r#"<xs:element name="NewDataSet" msdata:IsDataSet="true" msdata:Locale="">"#,
        r#"<xs:complexType><xs:choice minOccurs="0" maxOccurs="unbounded">"#,
        r#"<xs:element name="Table1"><xs:complexType><xs:sequence>"#,
    ));
    for def in defs {
        let _ = write!(
            xml,
            r#"<xs:element name="{}" type="xs:string" minOccurs="0"/>"#,
            def.name
        );
    }
    xml.push_str(concat!(
        "</xs:sequence></xs:complexType></xs:element>",
        "</xs:choice></xs:complexType></xs:element></xs:schema>",
    ));
    for row in test_case.parameter_table().rows() {
        let _ = write!(xml, "<{TABLE_ROW}>");
        for def in defs {
            let value = row.get(&def.name).map_or("", String::as_str);
            let _ = write!(xml, "<{name}>{}</{name}>", xml_escape(value), name = def.name);
        }
        let _ = write!(xml, "</{TABLE_ROW}>");
    }
    xml.push_str("</NewDataSet>");
    Ok(xml)
}

/// Returns true when `name` is a non-colonized XML name.
#[must_use]
pub fn is_column_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.'))
}

// ============================================================================
// SECTION: Escaping
// ============================================================================

/// Escapes XML special characters in text and attribute values.
#[must_use]
pub fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
