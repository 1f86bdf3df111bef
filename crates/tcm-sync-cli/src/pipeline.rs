// crates/tcm-sync-cli/src/pipeline.rs
// ============================================================================
// Module: Sync Pipeline
// Description: Sync, persist, push, and publish phases over collaborators.
// Purpose: Compose the coordinator with repositories and version control.
// Dependencies: tcm-sync-core, thiserror
// ============================================================================

//! ## Overview
//! The sync phase reconciles every case, saves the ones whose metadata
//! changed, and pushes their sources when a VCS client is supplied. The push
//! is best effort: its failure is recorded as a `vcs_push` event and never
//! fails the phase. The publish phase looks up one report per case and
//! publishes them as a single run. [`run_pipeline`] chains both, publishing
//! only the cases that synced without failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tcm_sync_core::EventSink;
use tcm_sync_core::PublishResult;
use tcm_sync_core::PublishSummary;
use tcm_sync_core::ReportLookup;
use tcm_sync_core::RepositoryError;
use tcm_sync_core::SyncEvent;
use tcm_sync_core::SyncOutcome;
use tcm_sync_core::SyncResult;
use tcm_sync_core::SyncSummary;
use tcm_sync_core::TestCase;
use tcm_sync_core::TestCaseRepository;
use tcm_sync_core::TestReportRepository;
use tcm_sync_core::TmsAdapter;
use tcm_sync_core::TmsError;
use tcm_sync_core::VcsClient;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pipeline errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A repository could not be read or written.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// Publish setup or finalize failed.
    #[error(transparent)]
    Tms(#[from] TmsError),
}

// ============================================================================
// SECTION: Phase Reports
// ============================================================================

/// Outcome of the sync phase.
#[derive(Debug, Clone)]
pub struct SyncPhase {
    /// Per-case results in repository order.
    pub results: Vec<SyncResult>,
    /// Sources rewritten with new linkage tags.
    pub saved: Vec<String>,
    /// Push error, when a push was attempted and failed.
    pub push_error: Option<String>,
    /// Counters over `results`.
    pub summary: SyncSummary,
}

impl SyncPhase {
    /// Returns the cases that did not fail.
    #[must_use]
    pub fn synced_cases(&self) -> Vec<TestCase> {
        self.results
            .iter()
            .filter(|result| result.outcome != SyncOutcome::Failed)
            .map(|result| result.test_case.clone())
            .collect()
    }
}

/// Outcome of the publish phase.
#[derive(Debug, Clone)]
pub struct PublishPhase {
    /// Per-report results in case order.
    pub results: Vec<PublishResult>,
    /// Report lookups that matched more than one document.
    pub ambiguous: Vec<String>,
    /// Counters over `results`.
    pub summary: PublishSummary,
}

// ============================================================================
// SECTION: Phases
// ============================================================================

/// Reconciles every case, saves modified ones, and pushes their sources.
///
/// # Errors
///
/// Returns [`PipelineError::Repository`] when cases cannot be loaded or saved.
pub fn sync_phase<A>(
    adapter: &A,
    cases: &dyn TestCaseRepository,
    vcs: Option<&dyn VcsClient>,
    events: &dyn EventSink,
) -> Result<SyncPhase, PipelineError>
where
    A: TmsAdapter + ?Sized,
{
    let results = adapter.sync_test_cases(cases.find_all()?);
    let updated: Vec<TestCase> = results.iter().map(|result| result.test_case.clone()).collect();
    let saved: Vec<String> = cases
        .save_modified(&updated)?
        .iter()
        .map(|test_case| test_case.source().to_string())
        .collect();

    let mut push_error = None;
    if let Some(vcs) = vcs
        && !saved.is_empty()
    {
        push_error = vcs.sync_to_remote(&saved).err().map(|err| err.to_string());
        events.record(&SyncEvent::vcs_push(&saved, push_error.clone()));
    }

    let summary = SyncSummary::from_results(&results);
    Ok(SyncPhase {
        results,
        saved,
        push_error,
        summary,
    })
}

/// Looks up reports for `test_cases` and publishes them as one run.
///
/// # Errors
///
/// Returns [`PipelineError::Tms`] when run setup or finalize fails.
pub fn publish_phase<A>(
    adapter: &A,
    reports: &dyn TestReportRepository,
    test_cases: &[TestCase],
) -> Result<PublishPhase, PipelineError>
where
    A: TmsAdapter + ?Sized,
{
    let ReportLookup {
        reports: found,
        ambiguous,
    } = reports.find_all(test_cases);
    let results = adapter.publish_test_reports(found)?;
    let summary = PublishSummary::from_results(&results);
    Ok(PublishPhase {
        results,
        ambiguous,
        summary,
    })
}

/// Runs sync followed by publishing the successfully synced cases.
///
/// # Errors
///
/// Returns [`PipelineError`] when either phase fails as a whole.
pub fn run_pipeline<A>(
    adapter: &A,
    cases: &dyn TestCaseRepository,
    reports: &dyn TestReportRepository,
    vcs: Option<&dyn VcsClient>,
    events: &dyn EventSink,
) -> Result<(SyncPhase, PublishPhase), PipelineError>
where
    A: TmsAdapter + ?Sized,
{
    let sync = sync_phase(adapter, cases, vcs, events)?;
    let publish = publish_phase(adapter, reports, &sync.synced_cases())?;
    Ok((sync, publish))
}
