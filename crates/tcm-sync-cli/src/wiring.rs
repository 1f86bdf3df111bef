// crates/tcm-sync-cli/src/wiring.rs
// ============================================================================
// Module: Runtime Wiring
// Description: Builds adapters, sinks, and repositories from configuration.
// Purpose: Keep construction of collaborators out of the command handlers.
// Dependencies: tcm-sync-azure, tcm-sync-config, tcm-sync-core, thiserror
// ============================================================================

//! ## Overview
//! Every collaborator the commands need is built here from a validated
//! [`TcmSyncConfig`]. The version-control client exists only when pushing is
//! enabled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Arc;

use tcm_sync_azure::ApiError;
use tcm_sync_azure::AzureDevopsClient;
use tcm_sync_azure::AzureDevopsOptions;
use tcm_sync_azure::HttpApiConfig;
use tcm_sync_azure::HttpAzureDevopsApi;
use tcm_sync_azure::RunSettings;
use tcm_sync_config::LogSinkKind;
use tcm_sync_config::LoggingConfig;
use tcm_sync_config::TcmSyncConfig;
use tcm_sync_core::EventSink;
use tcm_sync_core::FileEventSink;
use tcm_sync_core::NoopEventSink;
use tcm_sync_core::StderrEventSink;
use thiserror::Error;

use crate::vcs::GitVcsClient;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum WiringError {
    /// The event log could not be opened.
    #[error("event log {path}: {message}")]
    EventLog {
        /// Configured log path.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// The HTTP client could not be built.
    #[error("azure devops client: {0}")]
    Api(#[from] ApiError),
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Opens the configured event sink.
///
/// # Errors
///
/// Returns [`WiringError::EventLog`] when a file sink cannot be opened.
pub fn event_sink(logging: &LoggingConfig) -> Result<Arc<dyn EventSink>, WiringError> {
    match (logging.sink, logging.path.as_deref()) {
        (LogSinkKind::Stderr, _) => Ok(Arc::new(StderrEventSink)),
        (LogSinkKind::None, _) => Ok(Arc::new(NoopEventSink)),
        (LogSinkKind::File, Some(path)) => open_file_sink(path),
        (LogSinkKind::File, None) => Err(WiringError::EventLog {
            path: String::new(),
            message: "file sink requires a path".to_string(),
        }),
    }
}

/// Opens an append-only file sink.
fn open_file_sink(path: &Path) -> Result<Arc<dyn EventSink>, WiringError> {
    let sink = FileEventSink::new(path).map_err(|err| WiringError::EventLog {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    Ok(Arc::new(sink))
}

/// Derives adapter options from the configuration.
#[must_use]
pub fn adapter_options(config: &TcmSyncConfig) -> AzureDevopsOptions {
    AzureDevopsOptions {
        run: RunSettings {
            test_plan: config.azure_devops.test_plan.clone(),
            build_id: config.azure_devops.build_id.clone(),
            run_name: config.publish.run_name.clone(),
            test_case_tag: config.tags.test_case.clone(),
            requirement_tag: config.tags.requirement.clone(),
        },
        close_run_on_abort: config.publish.close_run_on_abort,
    }
}

/// Derives HTTP connection settings from the configuration.
#[must_use]
pub fn http_config(config: &TcmSyncConfig) -> HttpApiConfig {
    let azure = &config.azure_devops;
    let mut http =
        HttpApiConfig::new(&azure.service_url, &azure.access_token, &azure.project);
    http.timeout_ms = azure.timeout_ms;
    http
}

/// Builds the Azure DevOps adapter over HTTP.
///
/// # Errors
///
/// Returns [`WiringError::Api`] when the HTTP client cannot be built.
pub fn build_adapter(
    config: &TcmSyncConfig,
    events: Arc<dyn EventSink>,
) -> Result<AzureDevopsClient<HttpAzureDevopsApi>, WiringError> {
    let api = HttpAzureDevopsApi::new(http_config(config))?;
    Ok(AzureDevopsClient::new(api, adapter_options(config), events))
}

/// Builds the git client when pushing is enabled.
#[must_use]
pub fn vcs_client(config: &TcmSyncConfig, workdir: &Path) -> Option<GitVcsClient> {
    config.vcs.push.then(|| GitVcsClient::new(workdir, config.vcs.remote.clone()))
}
