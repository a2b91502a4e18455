// crates/example-gate-core/src/runner.rs
// ============================================================================
// Module: Example Runner
// Description: External process execution for generated example scripts.
// Purpose: Feed a script to the JavaScript runtime on stdin and capture stdout.
// Dependencies: async-trait, thiserror, tokio
// ============================================================================

//! ## Overview
//! [`ProcessRunner`] spawns one runtime process per script, writes the script
//! to its stdin, and collects stdout and stderr. A non-zero exit status, an
//! undecodable stream, or an expired timeout is a hard failure. The child is
//! killed when the timeout fires so a crashed or hung runtime cannot stall
//! the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default runtime program.
pub const DEFAULT_RUNTIME_PROGRAM: &str = "node";

/// Default per-script timeout.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of stderr bytes kept in error messages.
const MAX_STDERR_EXCERPT_BYTES: usize = 4 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while executing a script.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The runtime could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        source: io::Error,
    },
    /// I/O failure while talking to the child process.
    #[error("runtime io error: {0}")]
    Io(#[source] io::Error),
    /// The script did not finish in time.
    #[error("script timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
    /// The runtime exited unsuccessfully.
    #[error("runtime exited with {}: {stderr}", exit_label(.code.as_ref().copied()))]
    ExitStatus {
        /// Exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Captured stderr (truncated).
        stderr: String,
    },
    /// Stdout was not valid UTF-8.
    #[error("runtime stdout is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// The runtime could not be located.
    #[error("runtime not available ({0})")]
    Unavailable(String),
}

// ============================================================================
// SECTION: Executor Trait
// ============================================================================

/// Executes a complete script and returns its standard output.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Runs `script` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the script cannot be run or fails.
    async fn execute(&self, script: &str) -> Result<String, RunnerError>;
}

// ============================================================================
// SECTION: Process Runner
// ============================================================================

/// Runs scripts in an external runtime process fed through stdin.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Runtime program.
    program: PathBuf,
    /// Arguments passed before stdin is read.
    args: Vec<String>,
    /// Extra environment variables.
    envs: BTreeMap<String, String>,
    /// Working directory for the child.
    working_dir: Option<PathBuf>,
    /// Per-script timeout.
    timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_PROGRAM)
    }
}

impl ProcessRunner {
    /// Creates a runner for `program` with no arguments and the default timeout.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: BTreeMap::new(),
            working_dir: None,
            timeout: DEFAULT_SCRIPT_TIMEOUT,
        }
    }

    /// Sets the runtime arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Adds environment variables for the child.
    #[must_use]
    pub fn with_envs(mut self, envs: BTreeMap<String, String>) -> Self {
        self.envs.extend(envs);
        self
    }

    /// Sets the child working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the per-script timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the runtime program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the per-script timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the working directory the runtime starts in, if set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Spawns the runtime, feeds `script`, and waits for completion.
    async fn run_to_completion(&self, script: &str) -> Result<String, RunnerError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(&self.envs);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command.stdin(Stdio::piped());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;
        let stdin = child.stdin.take();
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok::<(), io::Error>(());
            };
            stdin.write_all(script.as_bytes()).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(RunnerError::Io)?;
        // A runtime that exits early closes stdin; its exit status says why.
        if let Err(err) = fed
            && err.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(RunnerError::Io(err));
        }

        if !output.status.success() {
            return Err(RunnerError::ExitStatus {
                code: output.status.code(),
                stderr: stderr_excerpt(&output.stderr),
            });
        }
        Ok(String::from_utf8(output.stdout)?)
    }
}

#[async_trait]
impl ScriptExecutor for ProcessRunner {
    async fn execute(&self, script: &str) -> Result<String, RunnerError> {
        timeout(self.timeout, self.run_to_completion(script))
            .await
            .map_err(|_| RunnerError::Timeout(self.timeout))?
    }
}

/// Describes how a process ended.
fn exit_label(code: Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |code| format!("status {code}"))
}

/// Decodes and truncates stderr for error reporting.
fn stderr_excerpt(bytes: &[u8]) -> String {
    let slice = &bytes[..bytes.len().min(MAX_STDERR_EXCERPT_BYTES)];
    String::from_utf8_lossy(slice).trim().to_string()
}

// ============================================================================
// SECTION: Runtime Discovery
// ============================================================================

/// Runtime located on the host, with notes about rejected candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCheck {
    /// Program that answered the probe.
    pub path: PathBuf,
    /// Reasons earlier candidates were rejected.
    pub notes: Vec<String>,
}

/// Returns the first candidate that answers `--version` successfully.
///
/// # Errors
///
/// Returns [`RunnerError::Unavailable`] listing why each candidate failed.
pub fn resolve_runtime(candidates: &[&str]) -> Result<RuntimeCheck, RunnerError> {
    let mut notes = Vec::new();
    for candidate in candidates {
        match std::process::Command::new(candidate)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) if output.status.success() => {
                return Ok(RuntimeCheck {
                    path: PathBuf::from(candidate),
                    notes,
                });
            }
            Ok(output) => {
                notes.push(format!("{candidate} returned {}", exit_label(output.status.code())));
            }
            Err(err) => notes.push(format!("{candidate} unavailable: {err}")),
        }
    }
    Err(RunnerError::Unavailable(notes.join("; ")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
