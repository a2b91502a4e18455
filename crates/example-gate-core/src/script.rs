// crates/example-gate-core/src/script.rs
// ============================================================================
// Module: Script Builder
// Description: Wrapper scripts and code-example extraction for JavaScript docs.
// Purpose: Turn documented code fragments into a runnable, JSON-emitting script.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Documentation sources mark the user-visible part of an example with
//! `// {code_example|start}` and `// {code_example|end}`. The harness extracts
//! those blocks and embeds them in a wrapper script that:
//!
//! 1. replaces `console.log` so every call prints exactly one JSON line,
//! 2. loads the client module,
//! 3. defines `config` pointing at the transient credentials file,
//! 4. runs each fragment in order.
//!
//! Fragments therefore log response objects as they would in the docs and the
//! harness still receives line-delimited JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Marker opening a documented code block.
pub const CODE_EXAMPLE_START: &str = "{code_example|start}";

/// Marker closing a documented code block.
pub const CODE_EXAMPLE_END: &str = "{code_example|end}";

/// Default client module required by generated scripts.
pub const DEFAULT_CLIENT_MODULE: &str = "zulip-js";

/// Prelude installed ahead of the fragments.
const JSON_LOG_PRELUDE: &str = r"const __exampleGateLog = console.log;
console.log = (...args) => {
    const value = args.length === 1 ? args[0] : args;
    const line = JSON.stringify(value === undefined ? null : value);
    if (line === undefined) {
        throw new TypeError(`console.log argument is not JSON-serializable (${typeof value})`);
    }
    __exampleGateLog(line);
};
";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while extracting code blocks or rendering scripts.
///
/// # Invariants
/// - Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// A start marker appeared inside an open block.
    #[error("nested code example start marker at line {0}")]
    NestedStart(usize),
    /// An end marker appeared without a matching start.
    #[error("code example end marker without start at line {0}")]
    UnmatchedEnd(usize),
    /// A block was opened but never closed.
    #[error("code example starting at line {0} is never closed")]
    Unclosed(usize),
    /// A template value could not be encoded as a JavaScript literal.
    #[error("script template value could not be encoded: {0}")]
    Encode(String),
}

// ============================================================================
// SECTION: Extraction
// ============================================================================

/// Extracts the documented code blocks from an example source.
///
/// A source without markers is returned whole as a single block. Blank blocks
/// are dropped.
///
/// # Errors
///
/// Returns [`ScriptError`] for nested, unmatched, or unclosed markers.
pub fn extract_code_examples(source: &str) -> Result<Vec<String>, ScriptError> {
    let mut blocks = Vec::new();
    let mut open: Option<(usize, Vec<&str>)> = None;
    let mut saw_marker = false;

    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        if line.contains(CODE_EXAMPLE_START) {
            saw_marker = true;
            if open.is_some() {
                return Err(ScriptError::NestedStart(line_number));
            }
            open = Some((line_number, Vec::new()));
        } else if line.contains(CODE_EXAMPLE_END) {
            saw_marker = true;
            let Some((_, lines)) = open.take() else {
                return Err(ScriptError::UnmatchedEnd(line_number));
            };
            let block = lines.join("\n");
            if !block.trim().is_empty() {
                blocks.push(block.trim().to_string());
            }
        } else if let Some((_, lines)) = open.as_mut() {
            lines.push(line);
        }
    }

    if let Some((start, _)) = open {
        return Err(ScriptError::Unclosed(start));
    }
    if !saw_marker && !source.trim().is_empty() {
        blocks.push(source.trim().to_string());
    }
    Ok(blocks)
}

// ============================================================================
// SECTION: Template
// ============================================================================

/// Wrapper used to render runnable scripts around documented fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTemplate {
    /// Module name passed to `require`.
    client_module: String,
    /// Credentials file path exposed as `config.zuliprc`.
    credentials_path: PathBuf,
}

impl ScriptTemplate {
    /// Creates a template for the given client module and credentials file.
    #[must_use]
    pub fn new(client_module: impl Into<String>, credentials_path: &Path) -> Self {
        Self {
            client_module: client_module.into(),
            credentials_path: credentials_path.to_path_buf(),
        }
    }

    /// Returns the client module name.
    #[must_use]
    pub fn client_module(&self) -> &str {
        &self.client_module
    }

    /// Returns the credentials file path the script reads.
    #[must_use]
    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Renders the full script for the given fragments.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Encode`] when a template value cannot be encoded.
    pub fn render<S: AsRef<str>>(&self, fragments: &[S]) -> Result<String, ScriptError> {
        let module = js_string(&self.client_module)?;
        let credentials = js_string(&self.credentials_path.to_string_lossy())?;
        let mut script = String::from(JSON_LOG_PRELUDE);
        script.push('\n');
        // fmt::Write for String is infallible.
        writeln!(script, "const zulip = require({module});")
            .and_then(|()| writeln!(script, "const config = {{ zuliprc: {credentials} }};"))
            .map_err(|err| ScriptError::Encode(err.to_string()))?;
        for fragment in fragments {
            script.push('\n');
            script.push_str(fragment.as_ref().trim_end());
            script.push('\n');
        }
        Ok(script)
    }
}

/// Encodes a string as a JavaScript string literal.
fn js_string(value: &str) -> Result<String, ScriptError> {
    serde_json::to_string(value).map_err(|err| ScriptError::Encode(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
