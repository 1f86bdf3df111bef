// crates/tcm-sync-config/src/lib.rs
// ============================================================================
// Module: TCM Sync Config Library
// Description: Public API surface for TCM Sync configuration.
// Purpose: Expose the configuration model, loader, and validation.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! Configuration is read once at process start from a TOML file, overlaid
//! with `AZURE_DEVOPS_*` environment overrides, and validated fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AzureDevopsConfig;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::LogSinkKind;
pub use config::LoggingConfig;
pub use config::PublishConfig;
pub use config::ReportsConfig;
pub use config::SpecsConfig;
pub use config::TagsConfig;
pub use config::TcmSyncConfig;
pub use config::VcsConfig;
