// crates/tcm-sync-azure/src/tests.rs
// ============================================================================
// Module: Azure Test Lint Configuration
// Description: Shared test-only lint relaxations for adapter unit tests.
// Purpose: Allow panic-based assertions and debug output in tests.
// Dependencies: tcm-sync-azure
// ============================================================================

//! ## Overview
//! Provides test-only lint relaxations for TCM Sync adapter unit tests.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]
