// crates/tcm-sync-core/src/runtime/mod.rs
// ============================================================================
// Module: TCM Sync Runtime
// Description: Coordinator orchestration shared by all adapters.
// Purpose: Group runtime control flow separate from data types.
// Dependencies: crate::{core, events}
// ============================================================================

//! ## Overview
//! The runtime holds the sync coordinator: fixed control flow over adapter
//! capability hooks.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod coordinator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use coordinator::TmsAdapter;
