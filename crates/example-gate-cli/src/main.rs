// crates/example-gate-cli/src/main.rs
// ============================================================================
// Module: Example Gate CLI Entry Point
// Description: Command dispatcher for running, listing, and extracting examples.
// Purpose: Turn configuration into a harness run with a meaningful exit code.
// Dependencies: clap, example-gate-config, example-gate-core, serde_jcs, tokio.
// ============================================================================

//! ## Overview
//! The `example-gate` binary loads `example-gate.toml`, registers the bundled
//! and configured examples, and drives them through the harness. Every
//! failure prints one message to stderr and exits with status 1; a run that
//! completes exits with the status implied by the coverage gate.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use example_gate_config::HarnessConfig;
use example_gate_core::CoverageMode;
use example_gate_core::ExampleRegistry;
use example_gate_core::ExampleSelection;
use example_gate_core::FixtureSet;
use example_gate_core::Harness;
use example_gate_core::JsonLinesEvents;
use example_gate_core::OpenApiValidator;
use example_gate_core::RunSummary;
use example_gate_core::extract_code_examples;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a script read by `extract`.
const MAX_SCRIPT_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "example-gate", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run registered examples and validate their responses.
    Run(RunCommand),
    /// List registered examples in execution order.
    List(ListCommand),
    /// Print the marked code blocks of a script.
    Extract(ExtractCommand),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Config file path (defaults to `EXAMPLE_GATE_CONFIG` or `example-gate.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Run only the named example; repeatable.
    #[arg(long = "only", value_name = "NAME")]
    only: Vec<String>,
    /// Override the configured coverage mode.
    #[arg(long, value_enum, value_name = "MODE")]
    coverage: Option<CoverageArg>,
    /// Write the run summary here instead of stdout.
    #[arg(long, value_name = "PATH")]
    summary_out: Option<PathBuf>,
    /// Suppress progress events on stderr.
    #[arg(long)]
    quiet: bool,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
struct ListCommand {
    /// Config file path (defaults to `EXAMPLE_GATE_CONFIG` or `example-gate.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `extract`.
#[derive(Args, Debug)]
struct ExtractCommand {
    /// Script containing `{code_example|start}` / `{code_example|end}` markers.
    #[arg(long, value_name = "PATH")]
    script: PathBuf,
}

/// Coverage modes accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum CoverageArg {
    /// Missing examples fail the run.
    Strict,
    /// Missing examples are reported only.
    Report,
}

impl From<CoverageArg> for CoverageMode {
    fn from(value: CoverageArg) -> Self {
        match value {
            CoverageArg::Strict => Self::Strict,
            CoverageArg::Report => Self::Report,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a single user-facing message.
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

/// Errors raised while reading a bounded input file.
#[derive(Debug, Error)]
enum ReadLimitError {
    /// Underlying I/O failure.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// File exceeds the size limit.
    #[error("file exceeds size limit ({size} > {limit} bytes)")]
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::List(command) => command_list(&command),
        Commands::Extract(command) => command_extract(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let registry = build_registry(&config)?;
    let validator = OpenApiValidator::load(&config.openapi_path())
        .map_err(|err| CliError::new(format!("failed to load openapi document: {err}")))?;
    let fixtures = match config.fixtures_path() {
        Some(path) => FixtureSet::load(&path)
            .map_err(|err| CliError::new(format!("failed to load fixtures: {err}")))?,
        None => FixtureSet::default(),
    };
    let api_key = config.api_key_from_env().map_err(|err| CliError::new(err.to_string()))?;
    let credentials = config.credentials(api_key);
    let coverage_mode = command.coverage.map_or(config.coverage.mode, CoverageMode::from);

    let mut harness = Harness::new(
        registry,
        Arc::new(config.process_runner()),
        Arc::new(validator),
        config.script_template(),
    )
    .with_fixtures(fixtures)
    .with_coverage_mode(coverage_mode);
    if !command.quiet {
        harness = harness.with_events(Arc::new(JsonLinesEvents::new(std::io::stderr())));
    }

    let summary = harness
        .run(&credentials, &selection(command.only))
        .await
        .map_err(|err| CliError::new(err.to_string()))?;
    for line in summary.coverage.describe_missing() {
        write_stderr_line(&format!("example never executed: {line}"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    write_summary(&summary, command.summary_out.as_deref())?;
    Ok(ExitCode::from(summary.exit_status))
}

/// Executes the `list` command.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let registry = build_registry(&config)?;
    write_stdout_bytes(render_example_list(&registry).as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `extract` command.
fn command_extract(command: &ExtractCommand) -> CliResult<ExitCode> {
    let bytes = read_bytes_with_limit(&command.script, MAX_SCRIPT_BYTES).map_err(|err| {
        CliError::new(format!("failed to read {}: {err}", command.script.display()))
    })?;
    let source = String::from_utf8(bytes)
        .map_err(|_| CliError::new(format!("{} is not utf-8", command.script.display())))?;
    let blocks = extract_code_examples(&source).map_err(|err| CliError::new(err.to_string()))?;
    if blocks.is_empty() {
        return Err(CliError::new(format!(
            "{} contains no code example blocks",
            command.script.display()
        )));
    }
    write_stdout_bytes(render_blocks(&blocks).as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates the harness configuration.
fn load_config(path: Option<&Path>) -> CliResult<HarnessConfig> {
    HarnessConfig::load(path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Builds the example registry described by the configuration.
fn build_registry(config: &HarnessConfig) -> CliResult<ExampleRegistry> {
    config
        .build_registry()
        .map_err(|err| CliError::new(format!("failed to register examples: {err}")))
}

/// Maps `--only` arguments to a selection.
fn selection(only: Vec<String>) -> ExampleSelection {
    if only.is_empty() { ExampleSelection::All } else { ExampleSelection::Only(only) }
}

/// Renders one tab-separated line per registered example.
fn render_example_list(registry: &ExampleRegistry) -> String {
    let mut output = String::new();
    for spec in registry.iter() {
        output.push_str(&format!("{}\t{}\t{}\n", spec.name, spec.endpoint, spec.status));
    }
    output
}

/// Joins extracted blocks with blank lines.
fn render_blocks(blocks: &[String]) -> String {
    let mut output = blocks.join("\n\n");
    output.push('\n');
    output
}

/// Reads a file, failing before allocation when it exceeds `max_bytes`.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes the run summary as canonical JSON to a file or stdout.
fn write_summary(summary: &RunSummary, out: Option<&Path>) -> CliResult<()> {
    let bytes = canonical_json_line(summary)?;
    match out {
        Some(path) => std::fs::write(path, &bytes).map_err(|err| {
            CliError::new(format!("failed to write summary to {}: {err}", path.display()))
        }),
        None => write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err))),
    }
}

/// Serializes a value as canonical JSON followed by a newline.
fn canonical_json_line<T: Serialize>(value: &T) -> CliResult<Vec<u8>> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to serialize summary: {err}")))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
