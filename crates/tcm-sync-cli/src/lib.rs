// crates/tcm-sync-cli/src/lib.rs
// ============================================================================
// Module: TCM Sync CLI Library
// Description: Repositories, pipeline, and wiring behind the `tcm-sync` binary.
// Purpose: Keep command logic testable outside the entry point.
// Dependencies: crate::{pipeline, repository, summary, vcs, wiring}
// ============================================================================

//! ## Overview
//! The binary loads configuration, wires collaborators with [`wiring`], and
//! drives [`pipeline`] over the file-backed [`repository`] implementations.
//! Version control goes through [`vcs`] and output lines come from
//! [`summary`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod pipeline;
pub mod repository;
pub mod summary;
pub mod vcs;
pub mod wiring;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use pipeline::PipelineError;
pub use pipeline::PublishPhase;
pub use pipeline::SyncPhase;
pub use pipeline::publish_phase;
pub use pipeline::run_pipeline;
pub use pipeline::sync_phase;
pub use repository::JsonCaseRepository;
pub use repository::JsonReportRepository;
pub use repository::ReportDocument;
pub use vcs::GitVcsClient;
pub use wiring::WiringError;
