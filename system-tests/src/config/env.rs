// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed strictly: invalid UTF-8, empty strings, and
//! malformed numbers or booleans are errors rather than silent defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional artifact root override.
    RunRoot,
    /// Optional JavaScript runtime program (defaults to probing `node`).
    Node,
    /// Optional per-script timeout override in seconds.
    TimeoutSeconds,
    /// Fail instead of skipping when no runtime is available.
    RequireRuntime,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "EXAMPLE_GATE_SYSTEM_TEST_RUN_ROOT",
            Self::Node => "EXAMPLE_GATE_SYSTEM_TEST_NODE",
            Self::TimeoutSeconds => "EXAMPLE_GATE_SYSTEM_TEST_TIMEOUT_SEC",
            Self::RequireRuntime => "EXAMPLE_GATE_SYSTEM_TEST_REQUIRE_RUNTIME",
        }
    }

    /// Returns every key, in declaration order.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::RunRoot, Self::Node, Self::TimeoutSeconds, Self::RequireRuntime]
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional artifact root override.
    pub run_root: Option<PathBuf>,
    /// Optional runtime program override.
    pub node: Option<PathBuf>,
    /// Optional per-script timeout.
    pub timeout: Option<Duration>,
    /// Whether a missing runtime fails the test instead of skipping it.
    pub require_runtime: bool,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is not valid UTF-8, is empty, or fails
    /// validation.
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot)?.map(PathBuf::from);
        let node = read_env_nonempty(SystemTestEnv::Node)?.map(PathBuf::from);
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds)?
            .map(|raw| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds, &raw))
            .transpose()?;
        let require_runtime = read_env_nonempty(SystemTestEnv::RequireRuntime)?
            .map(|raw| parse_flag(SystemTestEnv::RequireRuntime, &raw))
            .transpose()?
            .unwrap_or(false);
        Ok(Self {
            run_root,
            node,
            timeout,
            require_runtime,
        })
    }

    /// Returns runtime candidates to probe, the override first.
    #[must_use]
    pub fn runtime_candidates(&self) -> Vec<String> {
        self.node.as_ref().map_or_else(
            || vec!["node".to_string(), "nodejs".to_string()],
            |node| vec![node.to_string_lossy().into_owned()],
        )
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads a key and rejects values that are set but blank.
fn read_env_nonempty(key: SystemTestEnv) -> Result<Option<String>, String> {
    let name = key.as_str();
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        other => Ok(other),
    }
}

/// Parses a positive number of seconds.
fn parse_timeout_seconds(key: SystemTestEnv, raw: &str) -> Result<Duration, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(format!("{} must be greater than zero", key.as_str())),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(format!("{} must be a positive integer number of seconds", key.as_str())),
    }
}

/// Parses `1`/`0`/`true`/`false`.
fn parse_flag(key: SystemTestEnv, raw: &str) -> Result<bool, String> {
    let value = raw.trim();
    if value == "1" || value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value == "0" || value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("{} must be 1, 0, true, or false", key.as_str()))
    }
}
