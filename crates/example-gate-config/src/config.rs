// crates/example-gate-config/src/config.rs
// ============================================================================
// Module: Example Gate Configuration
// Description: Configuration loading and validation for example-gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: example-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys, out-of-range values, and malformed example declarations fail
//! closed. Relative paths resolve against the directory holding the config
//! file. The API key is never stored in the file; it is read from the
//! environment variable named by `credentials.api_key_env`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use example_gate_core::ApiCredentials;
use example_gate_core::CoverageMode;
use example_gate_core::EndpointError;
use example_gate_core::EndpointKey;
use example_gate_core::ExampleName;
use example_gate_core::ExampleRegistry;
use example_gate_core::ExampleSpec;
use example_gate_core::ExpectedStatus;
use example_gate_core::ProcessRunner;
use example_gate_core::ScriptTemplate;
use example_gate_core::extract_code_examples;
use example_gate_core::register_builtin_examples;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "example-gate.toml";
/// Environment variable overriding the configuration path.
pub const CONFIG_ENV_VAR: &str = "EXAMPLE_GATE_CONFIG";
/// Default environment variable holding the API key.
pub const DEFAULT_API_KEY_ENV: &str = "EXAMPLE_GATE_API_KEY";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum example script size in bytes.
pub(crate) const MAX_SCRIPT_FILE_SIZE: u64 = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum length of a full path.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of runtime arguments.
pub(crate) const MAX_RUNTIME_ARGS: usize = 64;
/// Maximum length of one runtime argument.
pub(crate) const MAX_RUNTIME_ARG_LENGTH: usize = 4096;
/// Maximum number of runtime environment entries.
pub(crate) const MAX_RUNTIME_ENV_ENTRIES: usize = 64;
/// Maximum number of configured examples.
pub(crate) const MAX_EXAMPLES: usize = 1024;
/// Maximum length of an environment variable name.
pub(crate) const MAX_ENV_NAME_LENGTH: usize = 128;
/// Minimum per-script timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 1;
/// Maximum per-script timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 600_000;
/// Default per-script timeout in milliseconds.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default credentials file location, relative to the config directory.
pub(crate) const DEFAULT_CREDENTIALS_PATH: &str = ".zuliprc";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Example-gate configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Whether the bundled examples are registered ahead of configured ones.
    #[serde(default = "default_true")]
    pub builtin_examples: bool,
    /// JavaScript runtime settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Credentials file settings.
    pub credentials: CredentialsConfig,
    /// `OpenAPI` document location.
    pub openapi: OpenApiConfig,
    /// Optional fixture document.
    #[serde(default)]
    pub fixtures: FixturesConfig,
    /// Coverage gate settings.
    #[serde(default)]
    pub coverage: CoverageConfig,
    /// Additional examples backed by script files.
    #[serde(default)]
    pub examples: Vec<ExampleConfig>,
    /// Directory relative paths resolve against (not serialized).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// JavaScript runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Runtime program.
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments passed before the script is read from stdin.
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables for the runtime.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Per-script timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Client module required by generated scripts.
    #[serde(default = "default_client_module")]
    pub client_module: String,
    /// Optional working directory for the runtime.
    #[serde(default)]
    pub working_dir: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            env: BTreeMap::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            client_module: default_client_module(),
            working_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Validates runtime settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_single_line("runtime.program", &self.program)?;
        if self.args.len() > MAX_RUNTIME_ARGS {
            return Err(ConfigError::Invalid(format!(
                "runtime.args exceeds {MAX_RUNTIME_ARGS} entries"
            )));
        }
        if self.args.iter().any(|arg| arg.len() > MAX_RUNTIME_ARG_LENGTH || arg.contains('\0')) {
            return Err(ConfigError::Invalid("runtime.args entry is invalid".to_string()));
        }
        if self.env.len() > MAX_RUNTIME_ENV_ENTRIES {
            return Err(ConfigError::Invalid(format!(
                "runtime.env exceeds {MAX_RUNTIME_ENV_ENTRIES} entries"
            )));
        }
        for (key, value) in &self.env {
            if key.is_empty() || key.contains('=') || key.contains('\0') || value.contains('\0') {
                return Err(ConfigError::Invalid(format!("runtime.env entry `{key}` is invalid")));
            }
        }
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "runtime.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        validate_single_line("runtime.client_module", &self.client_module)?;
        if let Some(dir) = &self.working_dir {
            validate_path_string("runtime.working_dir", dir)?;
        }
        Ok(())
    }
}

/// Credentials file settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Where the transient credentials file is written.
    #[serde(default = "default_credentials_path")]
    pub path: String,
    /// Account email written to the file.
    pub email: String,
    /// Server base URL; a trailing `/api/` is stripped for `site`.
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl CredentialsConfig {
    /// Validates credential settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("credentials.path", &self.path)?;
        validate_single_line("credentials.email", &self.email)?;
        if !self.email.contains('@') {
            return Err(ConfigError::Invalid("credentials.email must contain '@'".to_string()));
        }
        validate_single_line("credentials.base_url", &self.base_url)?;
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(
                "credentials.base_url must start with http:// or https://".to_string(),
            ));
        }
        let env_name_valid = !self.api_key_env.is_empty()
            && self.api_key_env.len() <= MAX_ENV_NAME_LENGTH
            && !self.api_key_env.starts_with(|ch: char| ch.is_ascii_digit())
            && self
                .api_key_env
                .chars()
                .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_');
        if !env_name_valid {
            return Err(ConfigError::Invalid(
                "credentials.api_key_env must be an upper-case environment variable name"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// `OpenAPI` document location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenApiConfig {
    /// Path to a YAML or JSON document.
    pub path: String,
}

/// Optional fixture document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixturesConfig {
    /// Path to a JSON object of fixtures.
    #[serde(default)]
    pub path: Option<String>,
}

/// Coverage gate settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageConfig {
    /// How missing examples affect the exit status.
    #[serde(default)]
    pub mode: CoverageMode,
}

/// Example backed by a script file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExampleConfig {
    /// Unique example name.
    pub name: String,
    /// Endpoint key (`path:method`).
    pub endpoint: String,
    /// Expected response status.
    #[serde(default = "default_status")]
    pub status: u16,
    /// Script file with `{code_example|start}`/`{code_example|end}` blocks.
    pub script: String,
    /// Fixture key compared against every record.
    #[serde(default)]
    pub fixture: Option<String>,
}

impl ExampleConfig {
    /// Validates the example declaration.
    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let invalid = |detail: String| ConfigError::Invalid(format!("examples[{index}]: {detail}"));
        ExampleName::new(self.name.clone()).map_err(|err| invalid(err.to_string()))?;
        self.endpoint.parse::<EndpointKey>().map_err(|err| invalid(err.to_string()))?;
        ExpectedStatus::new(self.status).map_err(|err| invalid(err.to_string()))?;
        validate_path_string(&format!("examples[{index}].script"), &self.script)?;
        if let Some(fixture) = &self.fixture
            && fixture.trim().is_empty()
        {
            return Err(invalid("fixture must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl HarnessConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        let parent = resolved
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        config.base_dir =
            std::path::absolute(parent).map_err(|err| ConfigError::Io(err.to_string()))?;
        Ok(config)
    }

    /// Parses and validates configuration text; relative paths resolve
    /// against the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.base_dir = PathBuf::from(".");
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.runtime.validate()?;
        self.credentials.validate()?;
        validate_path_string("openapi.path", &self.openapi.path)?;
        if let Some(path) = &self.fixtures.path {
            validate_path_string("fixtures.path", path)?;
        }
        if self.examples.len() > MAX_EXAMPLES {
            return Err(ConfigError::Invalid(format!("examples exceeds {MAX_EXAMPLES} entries")));
        }
        let mut names = BTreeSet::new();
        for (index, example) in self.examples.iter().enumerate() {
            example.validate(index)?;
            if !names.insert(example.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "examples[{index}]: duplicate example name {}",
                    example.name
                )));
            }
            if example.fixture.is_some() && self.fixtures.path.is_none() {
                return Err(ConfigError::Invalid(format!(
                    "examples[{index}]: fixture requires fixtures.path"
                )));
            }
        }
        if !self.builtin_examples && self.examples.is_empty() {
            return Err(ConfigError::Invalid(
                "no examples: enable builtin_examples or declare [[examples]]".to_string(),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // SECTION: Core Conversions
    // ========================================================================

    /// Resolves a configured path against the config directory.
    ///
    /// The result is absolute whenever the current directory is readable, so
    /// the harness and a child running in `runtime.working_dir` agree on it.
    #[must_use]
    pub fn resolve(&self, value: &str) -> PathBuf {
        let path = Path::new(value.trim());
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let joined = self.base_dir.join(path);
        std::path::absolute(&joined).unwrap_or(joined)
    }

    /// Returns the resolved `OpenAPI` document path.
    #[must_use]
    pub fn openapi_path(&self) -> PathBuf {
        self.resolve(&self.openapi.path)
    }

    /// Returns the resolved fixture document path, when configured.
    #[must_use]
    pub fn fixtures_path(&self) -> Option<PathBuf> {
        self.fixtures.path.as_deref().map(|path| self.resolve(path))
    }

    /// Returns the resolved credentials file path.
    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.resolve(&self.credentials.path)
    }

    /// Builds the process runner described by `[runtime]`.
    #[must_use]
    pub fn process_runner(&self) -> ProcessRunner {
        let runner = ProcessRunner::new(&self.runtime.program)
            .with_args(self.runtime.args.clone())
            .with_envs(self.runtime.env.clone())
            .with_timeout(Duration::from_millis(self.runtime.timeout_ms));
        match &self.runtime.working_dir {
            Some(dir) => runner.with_working_dir(self.resolve(dir)),
            None => runner,
        }
    }

    /// Builds the script template for the configured client and credentials.
    #[must_use]
    pub fn script_template(&self) -> ScriptTemplate {
        ScriptTemplate::new(self.runtime.client_module.clone(), &self.credentials_path())
    }

    /// Combines configured credential settings with an API key.
    #[must_use]
    pub fn credentials(&self, api_key: String) -> ApiCredentials {
        ApiCredentials {
            email: self.credentials.email.clone(),
            api_key,
            base_url: self.credentials.base_url.clone(),
        }
    }

    /// Reads the API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the variable is unset or empty.
    pub fn api_key_from_env(&self) -> Result<String, ConfigError> {
        let name = &self.credentials.api_key_env;
        match env::var(name) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ConfigError::Invalid(format!(
                "environment variable {name} must hold the API key"
            ))),
        }
    }

    /// Registers the bundled examples (when enabled) and every configured one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a script cannot be read, has malformed
    /// markers, or collides with an existing example name.
    pub fn build_registry(&self) -> Result<ExampleRegistry, ConfigError> {
        let mut registry = ExampleRegistry::new();
        if self.builtin_examples {
            register_builtin_examples(&mut registry)
                .map_err(|err| ConfigError::Invalid(format!("builtin examples: {err}")))?;
        }
        for (index, example) in self.examples.iter().enumerate() {
            let invalid =
                |detail: String| ConfigError::Invalid(format!("examples[{index}]: {detail}"));
            let source = read_script(&self.resolve(&example.script))?;
            let fragments =
                extract_code_examples(&source).map_err(|err| invalid(err.to_string()))?;
            let name =
                ExampleName::new(example.name.clone()).map_err(|err| invalid(err.to_string()))?;
            let endpoint: EndpointKey =
                example.endpoint.parse().map_err(|err: EndpointError| invalid(err.to_string()))?;
            let status =
                ExpectedStatus::new(example.status).map_err(|err| invalid(err.to_string()))?;
            let mut spec = ExampleSpec::new(name, endpoint, fragments).with_status(status);
            if let Some(fixture) = &example.fixture {
                spec = spec.with_fixture(fixture.trim());
            }
            registry.register(spec).map_err(|err| invalid(err.to_string()))?;
        }
        Ok(registry)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.to_string_lossy().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    if path.components().any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH) {
        return Err(ConfigError::Invalid("config path component too long".to_string()));
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if Path::new(trimmed)
        .components()
        .any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(ConfigError::Invalid(format!("{field} path component too long")));
    }
    Ok(())
}

/// Rejects empty or multi-line values.
fn validate_single_line(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.contains(['\n', '\r', '\0']) {
        return Err(ConfigError::Invalid(format!("{field} must be a single line")));
    }
    Ok(())
}

/// Reads an example script with a size cap.
fn read_script(path: &Path) -> Result<String, ConfigError> {
    let size = fs::metadata(path)
        .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?
        .len();
    if size > MAX_SCRIPT_FILE_SIZE {
        return Err(ConfigError::Invalid(format!(
            "example script {} exceeds size limit",
            path.display()
        )));
    }
    fs::read_to_string(path).map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))
}

/// Serde default for boolean flags that start enabled.
const fn default_true() -> bool {
    true
}

/// Serde default for `runtime.program`.
fn default_program() -> String {
    example_gate_core::runner::DEFAULT_RUNTIME_PROGRAM.to_string()
}

/// Serde default for `runtime.timeout_ms`.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Serde default for `runtime.client_module`.
fn default_client_module() -> String {
    example_gate_core::script::DEFAULT_CLIENT_MODULE.to_string()
}

/// Serde default for `credentials.path`.
fn default_credentials_path() -> String {
    DEFAULT_CREDENTIALS_PATH.to_string()
}

/// Serde default for `credentials.api_key_env`.
fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

/// Serde default for `examples[].status`.
const fn default_status() -> u16 {
    ExpectedStatus::OK.code()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
