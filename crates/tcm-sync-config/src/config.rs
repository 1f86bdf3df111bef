// crates/tcm-sync-config/src/config.rs
// ============================================================================
// Module: TCM Sync Configuration
// Description: Configuration model, loading, overrides, and validation.
// Purpose: Provide a strict, fail-closed configuration for sync and publish.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! [`TcmSyncConfig::load`] resolves the config path (explicit argument, then
//! `TCM_SYNC_CONFIG`, then `tcm-sync.toml`), enforces path and size limits,
//! parses TOML, applies `AZURE_DEVOPS_*` environment overrides, and validates
//! the result. Environment access goes through an injectable lookup so the
//! same code path runs under test without touching process state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default config filename.
pub const DEFAULT_CONFIG_NAME: &str = "tcm-sync.toml";
/// Environment variable override for the config path.
pub const CONFIG_ENV_VAR: &str = "TCM_SYNC_CONFIG";
/// Maximum allowed config file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length for config paths.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Lower bound for the request timeout.
const MIN_TIMEOUT_MS: u64 = 1_000;
/// Upper bound for the request timeout.
const MAX_TIMEOUT_MS: u64 = 300_000;

/// Environment overrides for Azure DevOps settings.
const ENV_OVERRIDES: [(&str, AzureField); 5] = [
    ("AZURE_DEVOPS_URL", AzureField::ServiceUrl),
    ("AZURE_DEVOPS_TOKEN", AzureField::AccessToken),
    ("AZURE_DEVOPS_PROJECT", AzureField::Project),
    ("AZURE_DEVOPS_TEST_PLAN", AzureField::TestPlan),
    ("AZURE_DEVOPS_BUILD_ID", AzureField::BuildId),
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The config file is not valid TOML for the model.
    #[error("config parse error: {0}")]
    Parse(String),
    /// The configuration violates a validation rule.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Top-level TCM Sync configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TcmSyncConfig {
    /// Test-case document location.
    #[serde(default)]
    pub specs: SpecsConfig,
    /// Execution report location.
    #[serde(default)]
    pub reports: ReportsConfig,
    /// Remote connection settings.
    #[serde(default)]
    pub azure_devops: AzureDevopsConfig,
    /// Metadata tag names.
    #[serde(default)]
    pub tags: TagsConfig,
    /// Publish session settings.
    #[serde(default)]
    pub publish: PublishConfig,
    /// Version-control push settings.
    #[serde(default)]
    pub vcs: VcsConfig,
    /// Event logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Test-case document location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecsConfig {
    /// Directory holding `*.json` test-case documents.
    #[serde(default = "default_specs_dir")]
    pub dir: PathBuf,
}

impl Default for SpecsConfig {
    fn default() -> Self {
        Self {
            dir: default_specs_dir(),
        }
    }
}

/// Execution report location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportsConfig {
    /// Directory holding `*.json` report documents.
    #[serde(default = "default_reports_dir")]
    pub dir: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            dir: default_reports_dir(),
        }
    }
}

/// Azure DevOps connection settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AzureDevopsConfig {
    /// Organization URL.
    #[serde(default)]
    pub service_url: String,
    /// Personal access token.
    #[serde(default)]
    pub access_token: String,
    /// Project name.
    #[serde(default)]
    pub project: String,
    /// Target test plan name.
    #[serde(default)]
    pub test_plan: String,
    /// Build the published run is associated with.
    #[serde(default)]
    pub build_id: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AzureDevopsConfig {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            access_token: String::new(),
            project: String::new(),
            test_plan: String::new(),
            build_id: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl fmt::Debug for AzureDevopsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureDevopsConfig")
            .field("service_url", &self.service_url)
            .field("access_token", &"<redacted>")
            .field("project", &self.project)
            .field("test_plan", &self.test_plan)
            .field("build_id", &self.build_id)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Metadata tag names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagsConfig {
    /// Single-valued tag linking a case to its work item.
    #[serde(default = "default_test_case_tag")]
    pub test_case: String,
    /// Multi-valued tag linking a case to requirements.
    #[serde(default = "default_requirement_tag")]
    pub requirement: String,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            test_case: default_test_case_tag(),
            requirement: default_requirement_tag(),
        }
    }
}

/// Publish session settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    /// Name given to created runs.
    #[serde(default = "default_run_name")]
    pub run_name: String,
    /// Whether a failed finalize moves the run to the aborted state.
    #[serde(default = "default_true")]
    pub close_run_on_abort: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            run_name: default_run_name(),
            close_run_on_abort: true,
        }
    }
}

/// Version-control push settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VcsConfig {
    /// Whether modified documents are committed and pushed after sync.
    #[serde(default)]
    pub push: bool,
    /// Remote pushed to.
    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            push: false,
            remote: default_remote(),
        }
    }
}

/// Event sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Events are discarded.
    None,
}

/// Event logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Log file path; required for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Default specs directory.
fn default_specs_dir() -> PathBuf {
    PathBuf::from("specs")
}

/// Default reports directory.
fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default linkage tag.
fn default_test_case_tag() -> String {
    "testcase".to_string()
}

/// Default requirement tag.
fn default_requirement_tag() -> String {
    "story".to_string()
}

/// Default run name.
fn default_run_name() -> String {
    "Automated run".to_string()
}

/// Default VCS remote.
fn default_remote() -> String {
    "origin".to_string()
}

/// Serde default helper for `true`.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Azure DevOps field targeted by an environment override.
#[derive(Debug, Clone, Copy)]
enum AzureField {
    /// `service_url`.
    ServiceUrl,
    /// `access_token`.
    AccessToken,
    /// `project`.
    Project,
    /// `test_plan`.
    TestPlan,
    /// `build_id`.
    BuildId,
}

impl TcmSyncConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration resolving environment values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolved = resolve_path(path, &lookup)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_with_env(content, lookup)
    }

    /// Parses, overrides, and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_with_env<F>(content: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Overlays `AZURE_DEVOPS_*` values onto the remote settings.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for (key, field) in ENV_OVERRIDES {
            let Some(value) = lookup(key) else {
                continue;
            };
            let target = match field {
                AzureField::ServiceUrl => &mut self.azure_devops.service_url,
                AzureField::AccessToken => &mut self.azure_devops.access_token,
                AzureField::Project => &mut self.azure_devops.project,
                AzureField::TestPlan => &mut self.azure_devops.test_plan,
                AzureField::BuildId => &mut self.azure_devops.build_id,
            };
            *target = value;
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.azure_devops.validate()?;
        self.tags.validate()?;
        if self.publish.run_name.trim().is_empty() {
            return Err(ConfigError::Invalid("publish.run_name must be non-empty".to_string()));
        }
        if self.vcs.push && self.vcs.remote.trim().is_empty() {
            return Err(ConfigError::Invalid("vcs.remote must be non-empty".to_string()));
        }
        if self.logging.sink == LogSinkKind::File && self.logging.path.is_none() {
            return Err(ConfigError::Invalid(
                "logging.path is required for the file sink".to_string(),
            ));
        }
        Ok(())
    }
}

impl AzureDevopsConfig {
    /// Validates connection settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.service_url.trim().is_empty() {
            return Err(ConfigError::Invalid("azure_devops.service_url is required".to_string()));
        }
        let url = Url::parse(&self.service_url).map_err(|err| {
            ConfigError::Invalid(format!("azure_devops.service_url is not a valid url: {err}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "azure_devops.service_url must use http or https, found {}",
                url.scheme()
            )));
        }
        for (name, value) in [
            ("access_token", &self.access_token),
            ("project", &self.project),
            ("test_plan", &self.test_plan),
            ("build_id", &self.build_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("azure_devops.{name} is required")));
            }
        }
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "azure_devops.timeout_ms must be within {MIN_TIMEOUT_MS}..={MAX_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

impl TagsConfig {
    /// Validates tag names.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.test_case.trim().is_empty() || self.requirement.trim().is_empty() {
            return Err(ConfigError::Invalid("tag names must be non-empty".to_string()));
        }
        if self.test_case == self.requirement {
            return Err(ConfigError::Invalid(
                "tags.test_case and tags.requirement must differ".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Path Helpers
// ============================================================================

/// Resolves the config path from explicit input, environment, or default.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the config file path length and components.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
