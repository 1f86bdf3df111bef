// crates/tcm-sync-azure/src/adapter.rs
// ============================================================================
// Module: Azure DevOps Adapter
// Description: TmsAdapter implementation backed by Azure DevOps.
// Purpose: Supply the capability hooks used by the sync coordinator.
// Dependencies: tcm-sync-core, crate::{api, fields, patch, run_context}
// ============================================================================

//! ## Overview
//! [`AzureDevopsClient`] creates and patches "Test Case" work items and
//! delegates publish sessions to [`RunContextManager`]. Requirement relations
//! come from the multi-valued requirement tag; requirements that no longer
//! exist are skipped. When finalize fails the run is moved to the aborted
//! state unless `close_run_on_abort` is disabled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use tcm_sync_core::EventSink;
use tcm_sync_core::RunContext;
use tcm_sync_core::SyncEvent;
use tcm_sync_core::TestCase;
use tcm_sync_core::TestReport;
use tcm_sync_core::TmsAdapter;
use tcm_sync_core::TmsError;
use tcm_sync_core::WorkItemId;

use crate::api::AzureDevopsApi;
use crate::fields;
use crate::patch::WorkItemPatchBuilder;
use crate::patch::ensure_test_case_type;
use crate::run_context::RunContextManager;
use crate::run_context::RunSettings;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Adapter behavior independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureDevopsOptions {
    /// Publish session settings.
    pub run: RunSettings,
    /// Whether a failed finalize moves the run to the aborted state.
    pub close_run_on_abort: bool,
}

impl AzureDevopsOptions {
    /// Creates options with the default tags and run name.
    #[must_use]
    pub fn new(test_plan: impl Into<String>, build_id: impl Into<String>) -> Self {
        Self {
            run: RunSettings {
                test_plan: test_plan.into(),
                build_id: build_id.into(),
                run_name: "Automated run".to_string(),
                test_case_tag: "testcase".to_string(),
                requirement_tag: "story".to_string(),
            },
            close_run_on_abort: true,
        }
    }
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Azure DevOps test-case management adapter.
pub struct AzureDevopsClient<A> {
    /// Remote operations.
    api: A,
    /// Adapter options.
    options: AzureDevopsOptions,
    /// Sink for structured events.
    events: Arc<dyn EventSink>,
}

impl<A> AzureDevopsClient<A>
where
    A: AzureDevopsApi,
{
    /// Creates an adapter.
    #[must_use]
    pub fn new(api: A, options: AzureDevopsOptions, events: Arc<dyn EventSink>) -> Self {
        Self {
            api,
            options,
            events,
        }
    }

    /// Returns the remote operations.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Returns the adapter options.
    #[must_use]
    pub const fn options(&self) -> &AzureDevopsOptions {
        &self.options
    }

    /// Borrows a run-context manager for the current call.
    fn run_contexts(&self) -> RunContextManager<'_, A> {
        RunContextManager::new(&self.api, &self.options.run, self.events.as_ref())
    }

    /// Resolves identity links of the requirements tagged on a case.
    fn requirement_links(&self, test_case: &TestCase) -> Result<Vec<String>, TmsError> {
        let mut links = Vec::new();
        for id in test_case.linked_ids(&self.options.run.requirement_tag)? {
            let item = self.api.get_work_item(id)?;
            if let Some(link) = item.as_ref().and_then(|item| item.self_link()) {
                links.push(link.to_string());
            }
        }
        Ok(links)
    }
}

impl<A> TmsAdapter for AzureDevopsClient<A>
where
    A: AzureDevopsApi,
{
    fn linkage_tag(&self) -> &str {
        &self.options.run.test_case_tag
    }

    fn events(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    fn create_test_case(&self, test_case: &TestCase) -> Result<WorkItemId, TmsError> {
        let links = self.requirement_links(test_case)?;
        let document =
            WorkItemPatchBuilder::new(test_case).with_requirement_links(links).as_create()?;
        let item = self.api.create_work_item(fields::TEST_CASE_TYPE, &document)?;
        self.events.record(&SyncEvent::remote_write("create_work_item", format!("#{}", item.id)));
        WorkItemId::from_raw(item.id)
            .ok_or_else(|| TmsError::Transport("created work item has id 0".to_string()))
    }

    fn update_test_case(&self, id: WorkItemId, test_case: &TestCase) -> Result<bool, TmsError> {
        let remote = self
            .api
            .get_work_item(id)?
            .ok_or_else(|| TmsError::NotFound(format!("work item #{id}")))?;
        ensure_test_case_type(id, &remote)?;
        let links = self.requirement_links(test_case)?;
        let document =
            WorkItemPatchBuilder::new(test_case).with_requirement_links(links).as_update(&remote)?;
        if document.is_empty() {
            return Ok(false);
        }
        self.api.update_work_item(id, &document)?;
        self.events.record(&SyncEvent::remote_write("update_work_item", format!("#{id}")));
        Ok(true)
    }

    fn setup_run_context(&self) -> Result<RunContext, TmsError> {
        self.run_contexts().setup()
    }

    fn add_test_report_to_run_context(
        &self,
        report: &TestReport,
        context: &mut RunContext,
    ) -> Result<(), TmsError> {
        self.run_contexts().add_report(report, context)
    }

    fn finalize_run_context(&self, context: &RunContext) -> Result<(), TmsError> {
        self.run_contexts().finalize(context)
    }

    fn abandon_run_context(&self, context: &RunContext) -> Result<(), TmsError> {
        if self.options.close_run_on_abort {
            self.run_contexts().abandon(context)
        } else {
            Ok(())
        }
    }
}
