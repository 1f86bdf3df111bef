// crates/tcm-sync-cli/src/vcs.rs
// ============================================================================
// Module: Git VCS Client
// Description: Commits and pushes modified test-case documents.
// Purpose: Best-effort version-control collaborator for the sync pipeline.
// Dependencies: tcm-sync-core
// ============================================================================

//! ## Overview
//! [`GitVcsClient`] runs `git add`, `git commit`, and `git push <remote>` in a
//! working directory. Any failing step stops the sequence and is reported as a
//! [`VcsError`]; callers treat the push as best effort.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::Command;

use tcm_sync_core::VcsClient;
use tcm_sync_core::VcsError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Commit message used for linkage updates.
const COMMIT_MESSAGE: &str = "Update test case work item links";
/// Maximum number of stderr characters kept in a failure message.
const MAX_STDERR_CHARS: usize = 512;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Git command-line client.
#[derive(Debug, Clone)]
pub struct GitVcsClient {
    /// Working directory the commands run in.
    workdir: PathBuf,
    /// Remote pushed to.
    remote: String,
}

impl GitVcsClient {
    /// Creates a client for `workdir` pushing to `remote`.
    #[must_use]
    pub fn new(workdir: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            remote: remote.into(),
        }
    }

    /// Runs one git command, failing on a non-zero exit.
    fn git(&self, args: &[&str]) -> Result<(), VcsError> {
        let step = args.first().copied().unwrap_or_default();
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|err| VcsError::Command(format!("git {step}: {err}")))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr: String =
            String::from_utf8_lossy(&output.stderr).trim().chars().take(MAX_STDERR_CHARS).collect();
        Err(VcsError::Command(format!("git {step} exited with {}: {stderr}", output.status)))
    }
}

impl VcsClient for GitVcsClient {
    fn sync_to_remote(&self, paths: &[String]) -> Result<(), VcsError> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut add = vec!["add", "--"];
        add.extend(paths.iter().map(String::as_str));
        self.git(&add)?;
        let mut commit = vec!["commit", "-m", COMMIT_MESSAGE, "--"];
        commit.extend(paths.iter().map(String::as_str));
        self.git(&commit)?;
        self.git(&["push", self.remote.as_str()])
    }
}
