// crates/example-gate-core/src/output.rs
// ============================================================================
// Module: Output Parser
// Description: Line-delimited JSON decoding for captured process output.
// Purpose: Turn runtime stdout into response records, failing on the first bad line.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each line a generated script prints is one JSON value. Trailing empty
//! lines are discarded; any other line that fails to decode (including an
//! interior blank line) aborts parsing with its 1-based line number.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of characters of an offending line echoed in errors.
pub const MAX_ERROR_EXCERPT_CHARS: usize = 120;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A line of output that is not valid JSON.
#[derive(Debug, Error)]
#[error("output line {line} is not valid json ({source}): {excerpt}")]
pub struct OutputParseError {
    /// 1-based line number of the offending line.
    pub line: usize,
    /// Truncated copy of the offending line.
    pub excerpt: String,
    /// Decoder error.
    pub source: serde_json::Error,
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Decodes one JSON value per line of `text`, in order.
///
/// # Errors
///
/// Returns [`OutputParseError`] for the first line that is not valid JSON.
/// Lines after it are not examined.
pub fn parse_json_lines(text: &str) -> Result<Vec<Value>, OutputParseError> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| OutputParseError {
                line: index + 1,
                excerpt: excerpt(line),
                source,
            })
        })
        .collect()
}

/// Truncates a line for inclusion in an error message.
fn excerpt(line: &str) -> String {
    let mut chars = line.chars();
    let head: String = chars.by_ref().take(MAX_ERROR_EXCERPT_CHARS).collect();
    if chars.next().is_some() { format!("{head}...") } else { head }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
