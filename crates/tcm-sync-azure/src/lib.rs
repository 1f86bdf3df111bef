// crates/tcm-sync-azure/src/lib.rs
// ============================================================================
// Module: TCM Sync Azure DevOps
// Description: Azure DevOps test-case management adapter.
// Purpose: Implement the sync coordinator hooks against Azure DevOps REST APIs.
// Dependencies: reqwest, serde, serde_json, tcm-sync-core, thiserror, url
// ============================================================================

//! ## Overview
//! This crate turns the core test-case model into Azure DevOps work-item
//! patches and test-run results. Remote calls go through the
//! [`AzureDevopsApi`] seam; [`HttpAzureDevopsApi`] is the blocking REST
//! implementation and tests substitute an in-memory double.
//!
//! - [`payload`] encodes steps, parameters, and data tables as XML fields.
//! - [`patch`] diffs those fields and requirement relations against a remote
//!   snapshot.
//! - [`run_context`] resolves plans, suites, and test points for a publish
//!   session.
//! - [`adapter`] wires everything into [`tcm_sync_core::TmsAdapter`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod api;
pub mod fields;
pub mod http;
pub mod patch;
pub mod payload;
pub mod run_context;
pub mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::AzureDevopsClient;
pub use adapter::AzureDevopsOptions;
pub use api::ApiError;
pub use api::AzureDevopsApi;
pub use api::Page;
pub use http::HttpAzureDevopsApi;
pub use http::HttpApiConfig;
pub use patch::PatchOp;
pub use patch::PatchOperation;
pub use patch::WorkItemPatchBuilder;
pub use payload::EncodedPayload;
pub use run_context::RunContextManager;
pub use run_context::RunSettings;

#[cfg(test)]
mod tests;
