// crates/example-gate-core/src/fixtures.rs
// ============================================================================
// Module: Fixture Store
// Description: Stored expected-response documents keyed by example name.
// Purpose: Compare decoded records against fixtures by JSON shape.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! A fixture file is a JSON object mapping fixture keys to example responses.
//! Records are compared by shape rather than by value: the JSON types must
//! agree, every key of an expected object must be present in the record, and
//! arrays compare their first elements when both sides have one. Values that
//! legitimately differ between runs (ids, timestamps) therefore never fail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum fixture file size accepted by the loader.
pub const MAX_FIXTURE_BYTES: u64 = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading fixtures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("fixture io error: {0}")]
    Io(String),
    /// The fixture file exceeds [`MAX_FIXTURE_BYTES`].
    #[error("fixture file exceeds size limit ({actual} > {limit})")]
    TooLarge {
        /// Actual size in bytes.
        actual: u64,
        /// Configured limit.
        limit: u64,
    },
    /// The fixture file is not a JSON object.
    #[error("fixture parse error: {0}")]
    Parse(String),
    /// A referenced fixture key does not exist.
    #[error("unknown fixture: {0}")]
    Unknown(String),
}

/// A record whose shape differs from its fixture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fixture mismatch at `{pointer}`: expected {expected}, found {actual}")]
pub struct FixtureMismatch {
    /// JSON pointer of the first differing location (empty for the root).
    pub pointer: String,
    /// Expected JSON type.
    pub expected: String,
    /// Actual JSON type, or `missing`.
    pub actual: String,
}

// ============================================================================
// SECTION: Fixture Set
// ============================================================================

/// Fixture documents keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureSet {
    /// Fixtures by key.
    entries: BTreeMap<String, Value>,
}

impl FixtureSet {
    /// Loads a JSON object of fixtures from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the file is unreadable, too large, or
    /// not a JSON object.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let size = fs::metadata(path)
            .map_err(|err| FixtureError::Io(format!("{}: {err}", path.display())))?
            .len();
        if size > MAX_FIXTURE_BYTES {
            return Err(FixtureError::TooLarge {
                actual: size,
                limit: MAX_FIXTURE_BYTES,
            });
        }
        let bytes =
            fs::read(path).map_err(|err| FixtureError::Io(format!("{}: {err}", path.display())))?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|err| FixtureError::Parse(err.to_string()))?;
        Self::from_value(value)
    }

    /// Builds a fixture set from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Parse`] when `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self, FixtureError> {
        match value {
            Value::Object(map) => Ok(Self {
                entries: map.into_iter().collect(),
            }),
            other => Err(FixtureError::Parse(format!(
                "fixture document must be an object, found {}",
                type_name(&other)
            ))),
        }
    }

    /// Returns the fixture stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns the fixture stored under `key`, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Unknown`] when no fixture has that key.
    pub fn require(&self, key: &str) -> Result<&Value, FixtureError> {
        self.get(key).ok_or_else(|| FixtureError::Unknown(key.to_string()))
    }

    /// Returns the number of fixtures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no fixtures are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// SECTION: Shape Comparison
// ============================================================================

/// Checks that `actual` has the shape of `expected`.
///
/// # Errors
///
/// Returns the first [`FixtureMismatch`] found in depth-first key order.
pub fn compare_shape(expected: &Value, actual: &Value) -> Result<(), FixtureMismatch> {
    compare_at(expected, actual, &mut String::new())
}

/// Recursive comparison tracking the current JSON pointer.
fn compare_at(expected: &Value, actual: &Value, pointer: &mut String) -> Result<(), FixtureMismatch> {
    match (expected, actual) {
        (Value::Object(want), Value::Object(got)) => {
            for (key, want_value) in want {
                let mark = pointer.len();
                pointer.push('/');
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
                match got.get(key) {
                    Some(got_value) => compare_at(want_value, got_value, pointer)?,
                    None => {
                        return Err(FixtureMismatch {
                            pointer: pointer.clone(),
                            expected: type_name(want_value).to_string(),
                            actual: "missing".to_string(),
                        });
                    }
                }
                pointer.truncate(mark);
            }
            Ok(())
        }
        (Value::Array(want), Value::Array(got)) => match (want.first(), got.first()) {
            (Some(want_first), Some(got_first)) => {
                let mark = pointer.len();
                pointer.push_str("/0");
                compare_at(want_first, got_first, pointer)?;
                pointer.truncate(mark);
                Ok(())
            }
            _ => Ok(()),
        },
        _ if type_name(expected) == type_name(actual) => Ok(()),
        _ => Err(FixtureMismatch {
            pointer: pointer.clone(),
            expected: type_name(expected).to_string(),
            actual: type_name(actual).to_string(),
        }),
    }
}

/// Returns the JSON type name of `value`.
const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
