// crates/tcm-sync-core/src/events.rs
// ============================================================================
// Module: TCM Sync Event Logging
// Description: Structured events for sync, publish, and run-context activity.
// Purpose: Emit JSON-line logs without a hard dependency on a logging backend.
// Dependencies: serde, serde_json, crate::core
// ============================================================================

//! ## Overview
//! Every per-item boundary in the coordinator records a [`SyncEvent`] on an
//! [`EventSink`]. Sinks serialize events as one JSON object per line so they
//! can be routed to any log pipeline. Sinks never fail the caller: a write
//! error drops the event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::PlanId;
use crate::core::PublishOutcome;
use crate::core::RunId;
use crate::core::SyncOutcome;
use crate::core::TmsError;
use crate::core::WorkItemId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Run-context lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Plan/run/suite resolution.
    Setup,
    /// Batch submit and run completion.
    Finalize,
    /// Compensating close after a failed finalize.
    Abandon,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEventKind {
    /// One test case was reconciled.
    CaseSync {
        /// Test case name.
        case: String,
        /// Linked work item, when known.
        work_item_id: Option<WorkItemId>,
        /// Reconciliation outcome.
        outcome: SyncOutcome,
        /// Error kind label when failed.
        error_kind: Option<&'static str>,
        /// Error message when failed.
        error: Option<String>,
    },
    /// One report was added to the run context.
    ReportPublish {
        /// Test case name.
        case: String,
        /// Publish outcome.
        outcome: PublishOutcome,
        /// Number of result rows accumulated for the report.
        rows: usize,
        /// Error kind label when failed.
        error_kind: Option<&'static str>,
        /// Error message when failed.
        error: Option<String>,
    },
    /// Run-context lifecycle transition.
    RunContext {
        /// Lifecycle phase.
        phase: RunPhase,
        /// Plan id when resolved.
        plan_id: Option<PlanId>,
        /// Run id when created.
        run_id: Option<RunId>,
        /// Accumulated result rows at this point.
        results: usize,
        /// Error message when the phase failed.
        error: Option<String>,
    },
    /// A write was issued against the remote system.
    RemoteWrite {
        /// Operation label.
        operation: &'static str,
        /// Target description (path or id).
        target: String,
    },
    /// Modified specification files were pushed (or the push failed).
    VcsPush {
        /// Pushed paths.
        paths: Vec<String>,
        /// Error message when the push failed.
        error: Option<String>,
    },
}

/// Timestamped event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncEvent {
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event payload.
    #[serde(flatten)]
    pub kind: SyncEventKind,
}

impl SyncEvent {
    /// Creates a new event stamped with the current time.
    #[must_use]
    pub fn new(kind: SyncEventKind) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            timestamp_ms,
            kind,
        }
    }

    /// Builds a `case_sync` event.
    #[must_use]
    pub fn case_sync(
        case: &str,
        work_item_id: Option<WorkItemId>,
        outcome: SyncOutcome,
        error: Option<&TmsError>,
    ) -> Self {
        Self::new(SyncEventKind::CaseSync {
            case: case.to_string(),
            work_item_id,
            outcome,
            error_kind: error.map(TmsError::kind),
            error: error.map(ToString::to_string),
        })
    }

    /// Builds a `report_publish` event.
    #[must_use]
    pub fn report_publish(
        case: &str,
        outcome: PublishOutcome,
        rows: usize,
        error: Option<&TmsError>,
    ) -> Self {
        Self::new(SyncEventKind::ReportPublish {
            case: case.to_string(),
            outcome,
            rows,
            error_kind: error.map(TmsError::kind),
            error: error.map(ToString::to_string),
        })
    }

    /// Builds a `run_context` event.
    #[must_use]
    pub fn run_context(
        phase: RunPhase,
        plan_id: Option<PlanId>,
        run_id: Option<RunId>,
        results: usize,
        error: Option<&TmsError>,
    ) -> Self {
        Self::new(SyncEventKind::RunContext {
            phase,
            plan_id,
            run_id,
            results,
            error: error.map(ToString::to_string),
        })
    }

    /// Builds a `remote_write` event.
    #[must_use]
    pub fn remote_write(operation: &'static str, target: impl Into<String>) -> Self {
        Self::new(SyncEventKind::RemoteWrite {
            operation,
            target: target.into(),
        })
    }

    /// Builds a `vcs_push` event.
    #[must_use]
    pub fn vcs_push(paths: &[String], error: Option<String>) -> Self {
        Self::new(SyncEventKind::VcsPush {
            paths: paths.to_vec(),
            error,
        })
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Destination for structured sync events.
pub trait EventSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &SyncEvent);
}

/// Sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl EventSink for StderrEventSink {
    fn record(&self, event: &SyncEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Sink that logs JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl EventSink for FileEventSink {
    fn record(&self, event: &SyncEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
        }
    }
}

/// Sink that discards events.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: &SyncEvent) {}
}

/// Sink that keeps events in memory for inspection.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<SyncEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl EventSink for MemoryEventSink {
    fn record(&self, event: &SyncEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
