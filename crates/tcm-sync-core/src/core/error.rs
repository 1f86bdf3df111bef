// crates/tcm-sync-core/src/core/error.rs
// ============================================================================
// Module: TCM Sync Errors
// Description: Error taxonomy shared by the coordinator and adapters.
// Purpose: Classify failures by their blast radius (one case vs. whole call).
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`TmsError`] is the single error type crossing the adapter boundary.
//! Validation, not-found, and type-mismatch errors are scoped to one test
//! case or report; transport errors come from remote calls. The coordinator
//! decides which boundary absorbs each error, not the error itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::WorkItemId;

// ============================================================================
// SECTION: Error Types
// ============================================================================

/// Errors raised by test-case management adapters.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TmsError {
    /// Local test-case data is inconsistent (for example, two linkage ids).
    #[error("validation error: {0}")]
    Validation(String),
    /// A remote entity is still missing after the documented retry.
    #[error("not found: {0}")]
    NotFound(String),
    /// A remote work item has an unexpected type.
    #[error("unexpected work item type '{actual}' for test case #{id}, must be '{expected}'")]
    TypeMismatch {
        /// Work item that was inspected.
        id: WorkItemId,
        /// Type reported by the remote system.
        actual: String,
        /// Type the adapter requires.
        expected: String,
    },
    /// Network, authentication, or protocol failure from a remote call.
    #[error("transport error: {0}")]
    Transport(String),
}

impl TmsError {
    /// Returns a stable label for event logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::TypeMismatch {
                ..
            } => "type_mismatch",
            Self::Transport(_) => "transport",
        }
    }
}
