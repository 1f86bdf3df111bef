// crates/tcm-sync-core/src/lib.rs
// ============================================================================
// Module: TCM Sync Core Library
// Description: Public API surface for the TCM Sync core.
// Purpose: Expose the test-case model, collaborator interfaces, and the sync coordinator.
// Dependencies: crate::{core, events, interfaces, runtime}
// ============================================================================

//! ## Overview
//! TCM Sync core keeps test-case work items in a remote test-case management
//! system aligned with a repository of executable specifications, and publishes
//! execution outcomes as a test run. The core is backend-agnostic: concrete
//! systems plug in through the [`TmsAdapter`] capability hooks while the
//! create-or-update and publish control flow lives here.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod events;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use events::EventSink;
pub use events::FileEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::RunPhase;
pub use events::StderrEventSink;
pub use events::SyncEvent;
pub use events::SyncEventKind;
pub use interfaces::ReportLookup;
pub use interfaces::RepositoryError;
pub use interfaces::TestCaseRepository;
pub use interfaces::TestReportRepository;
pub use interfaces::VcsClient;
pub use interfaces::VcsError;
pub use runtime::TmsAdapter;
