// crates/tcm-sync-cli/src/summary.rs
// ============================================================================
// Module: Run Summaries
// Description: Human-readable summaries of sync and publish phases.
// Purpose: Render the operator-facing lines printed after each command.
// Dependencies: tcm-sync-core
// ============================================================================

//! ## Overview
//! Summaries are plain text lines. Per-case failures are listed after the
//! counters so operators can find the cases that need attention. Ambiguous
//! report lookups are printed separately as warnings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tcm_sync_core::PublishOutcome;
use tcm_sync_core::SyncOutcome;

use crate::pipeline::PublishPhase;
use crate::pipeline::SyncPhase;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the sync phase as output lines.
#[must_use]
pub fn render_sync(phase: &SyncPhase) -> Vec<String> {
    let summary = phase.summary;
    let mut lines = vec![format!(
        "sync: {} total, {} created, {} updated, {} up to date, {} failed",
        summary.total, summary.created, summary.updated, summary.up_to_date, summary.failed
    )];
    lines.extend(
        phase
            .results
            .iter()
            .filter(|result| result.outcome == SyncOutcome::Failed)
            .map(|result| format!("  failed: {}", result.test_case.name())),
    );
    if !phase.saved.is_empty() {
        lines.push(format!("saved {} test case document(s)", phase.saved.len()));
    }
    if let Some(error) = &phase.push_error {
        lines.push(format!("push failed: {error}"));
    }
    lines
}

/// Renders the publish phase as output lines.
#[must_use]
pub fn render_publish(phase: &PublishPhase) -> Vec<String> {
    let summary = phase.summary;
    let mut lines = vec![format!(
        "publish: {} total, {} successful, {} failed",
        summary.total, summary.successful, summary.failed
    )];
    lines.extend(
        phase
            .results
            .iter()
            .filter(|result| result.outcome == PublishOutcome::Failed)
            .map(|result| format!("  failed: {}", result.test_report.test_case.name())),
    );
    lines
}
