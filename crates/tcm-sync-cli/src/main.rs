// crates/tcm-sync-cli/src/main.rs
// ============================================================================
// Module: TCM Sync CLI Entry Point
// Description: Command dispatcher for test-case sync and report publishing.
// Purpose: Provide the `tcm-sync` binary over the library pipeline.
// Dependencies: clap, tcm-sync-cli, tcm-sync-config, tcm-sync-core, thiserror
// ============================================================================

//! ## Overview
//! `tcm-sync sync` reconciles specification cases with Azure DevOps work
//! items, `tcm-sync publish` records execution reports as a test run, and
//! `tcm-sync run` does both. `tcm-sync config validate` checks configuration
//! without contacting the remote. Summaries go to stdout and structured events
//! go to the configured sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use tcm_sync_cli::GitVcsClient;
use tcm_sync_cli::JsonCaseRepository;
use tcm_sync_cli::JsonReportRepository;
use tcm_sync_cli::PublishPhase;
use tcm_sync_cli::SyncPhase;
use tcm_sync_cli::publish_phase;
use tcm_sync_cli::run_pipeline;
use tcm_sync_cli::summary::render_publish;
use tcm_sync_cli::summary::render_sync;
use tcm_sync_cli::sync_phase;
use tcm_sync_cli::wiring;
use tcm_sync_config::TcmSyncConfig;
use tcm_sync_core::TestCaseRepository;
use tcm_sync_core::VcsClient;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "tcm-sync", version, disable_help_subcommand = true)]
struct Cli {
    /// Optional config file path (defaults to `tcm-sync.toml` or `TCM_SYNC_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update work items for every specification case.
    Sync(SyncCommand),
    /// Publish execution reports as a test run.
    Publish,
    /// Sync, then publish reports for the cases that synced.
    Run(SyncCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Options shared by commands that rewrite specification files.
#[derive(Args, Debug)]
struct SyncCommand {
    /// Skip the version-control push even when enabled in config.
    #[arg(long)]
    no_push: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration file.
    Validate,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for operator-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Runs the CLI and maps failures to a non-zero exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and dispatches the selected command.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = TcmSyncConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    match cli.command {
        Commands::Sync(command) => command_sync(&config, &command),
        Commands::Publish => command_publish(&config),
        Commands::Run(command) => command_run(&config, &command),
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `sync`.
fn command_sync(config: &TcmSyncConfig, command: &SyncCommand) -> CliResult<ExitCode> {
    let events = wiring::event_sink(&config.logging).map_err(wiring_error)?;
    let adapter = wiring::build_adapter(config, events.clone()).map_err(wiring_error)?;
    let cases = JsonCaseRepository::new(&config.specs.dir);
    let vcs = push_client(config, command);
    let phase = sync_phase(&adapter, &cases, vcs.as_ref().map(as_vcs), events.as_ref())
        .map_err(|err| CliError::new(format!("sync failed: {err}")))?;
    emit_sync(&phase)?;
    Ok(exit_code(phase.summary.failed))
}

/// Executes `publish`.
fn command_publish(config: &TcmSyncConfig) -> CliResult<ExitCode> {
    let events = wiring::event_sink(&config.logging).map_err(wiring_error)?;
    let adapter = wiring::build_adapter(config, events).map_err(wiring_error)?;
    let test_cases = JsonCaseRepository::new(&config.specs.dir)
        .find_all()
        .map_err(|err| CliError::new(format!("failed to load test cases: {err}")))?;
    let reports = load_reports(config)?;
    let phase = publish_phase(&adapter, &reports, &test_cases)
        .map_err(|err| CliError::new(format!("publish failed: {err}")))?;
    emit_publish(&phase)?;
    Ok(exit_code(phase.summary.failed))
}

/// Executes `run`.
fn command_run(config: &TcmSyncConfig, command: &SyncCommand) -> CliResult<ExitCode> {
    let events = wiring::event_sink(&config.logging).map_err(wiring_error)?;
    let adapter = wiring::build_adapter(config, events.clone()).map_err(wiring_error)?;
    let cases = JsonCaseRepository::new(&config.specs.dir);
    let reports = load_reports(config)?;
    let vcs = push_client(config, command);
    let (sync, publish) =
        run_pipeline(&adapter, &cases, &reports, vcs.as_ref().map(as_vcs), events.as_ref())
            .map_err(|err| CliError::new(format!("run failed: {err}")))?;
    emit_sync(&sync)?;
    emit_publish(&publish)?;
    Ok(exit_code(sync.summary.failed + publish.summary.failed))
}

/// Executes `config validate`; loading already validated the file.
fn command_config_validate() -> CliResult<ExitCode> {
    write_stdout_line("config ok").map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads execution reports from the configured directory.
fn load_reports(config: &TcmSyncConfig) -> CliResult<JsonReportRepository> {
    JsonReportRepository::load(&config.reports.dir, config.tags.test_case.clone())
        .map_err(|err| CliError::new(format!("failed to load reports: {err}")))
}

/// Builds the push client unless disabled on the command line.
fn push_client(config: &TcmSyncConfig, command: &SyncCommand) -> Option<GitVcsClient> {
    if command.no_push {
        return None;
    }
    wiring::vcs_client(config, Path::new("."))
}

/// Upcasts a git client to the collaborator trait.
fn as_vcs(client: &GitVcsClient) -> &dyn VcsClient {
    client
}

/// Maps construction failures into CLI errors.
fn wiring_error(err: wiring::WiringError) -> CliError {
    CliError::new(err.to_string())
}

/// Prints the sync summary.
fn emit_sync(phase: &SyncPhase) -> CliResult<()> {
    for line in render_sync(phase) {
        write_stdout_line(&line).map_err(|err| output_error("stdout", &err))?;
    }
    Ok(())
}

/// Prints the publish summary; ambiguity warnings also go to stderr.
fn emit_publish(phase: &PublishPhase) -> CliResult<()> {
    for warning in &phase.ambiguous {
        write_stderr_line(&format!("warning: {warning}"))
            .map_err(|err| output_error("stderr", &err))?;
    }
    for line in render_publish(phase) {
        write_stdout_line(&line).map_err(|err| output_error("stdout", &err))?;
    }
    Ok(())
}

/// Maps a failure count to the process exit code.
fn exit_code(failed: usize) -> ExitCode {
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Formats an output stream failure.
fn output_error(stream: &str, err: &std::io::Error) -> CliError {
    CliError::new(format!("failed to write {stream}: {err}"))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
