// crates/example-gate-core/src/registry.rs
// ============================================================================
// Module: Example Registry
// Description: Explicit registration of documented examples.
// Purpose: Record which examples exist and the endpoint each one documents.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The registry is populated by explicit [`ExampleRegistry::register`] calls
//! at startup and read once per run. Iteration follows registration order so
//! runs are deterministic. Invocation state is not stored here; see
//! [`crate::coverage::CoverageTracker`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::endpoint::EndpointKey;
use crate::endpoint::ExpectedStatus;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of an example name.
pub const MAX_EXAMPLE_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while registering examples.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An example with the same name is already registered.
    #[error("example `{0}` is already registered")]
    Duplicate(String),
    /// The example name is empty, too long, or contains invalid characters.
    #[error("invalid example name `{0}`")]
    InvalidName(String),
    /// The example carries no code fragments.
    #[error("example `{0}` has no code fragments")]
    EmptyExample(String),
}

// ============================================================================
// SECTION: Example Name
// ============================================================================

/// Unique example identifier (for example `send_message`).
///
/// # Invariants
/// - Non-empty, at most [`MAX_EXAMPLE_NAME_LENGTH`] bytes.
/// - ASCII alphanumerics, `_`, `-`, and `.` only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExampleName(String);

impl ExampleName {
    /// Validates and wraps an example name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidName`] when the name breaks the invariants.
    pub fn new(name: impl Into<String>) -> Result<Self, RegistryError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name.len() <= MAX_EXAMPLE_NAME_LENGTH
            && name.bytes().all(|byte| byte.is_ascii_alphanumeric() || b"_-.".contains(&byte));
        if valid { Ok(Self(name)) } else { Err(RegistryError::InvalidName(name)) }
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExampleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ExampleName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExampleName {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExampleName> for String {
    fn from(value: ExampleName) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Example Spec
// ============================================================================

/// A documented example and the response it is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleSpec {
    /// Unique example name.
    pub name: ExampleName,
    /// Endpoint exercised by the example.
    pub endpoint: EndpointKey,
    /// Expected response status used for schema lookup.
    pub status: ExpectedStatus,
    /// Code fragments embedded into the generated script, in order.
    pub fragments: Vec<String>,
    /// Optional fixture key; records are compared against it when present.
    pub fixture: Option<String>,
}

impl ExampleSpec {
    /// Creates an example expecting a `200` response and no fixture.
    #[must_use]
    pub const fn new(name: ExampleName, endpoint: EndpointKey, fragments: Vec<String>) -> Self {
        Self {
            name,
            endpoint,
            status: ExpectedStatus::OK,
            fragments,
            fixture: None,
        }
    }

    /// Overrides the expected status.
    #[must_use]
    pub const fn with_status(mut self, status: ExpectedStatus) -> Self {
        self.status = status;
        self
    }

    /// Attaches a fixture key.
    #[must_use]
    pub fn with_fixture(mut self, fixture: impl Into<String>) -> Self {
        self.fixture = Some(fixture.into());
        self
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Ordered set of registered examples.
///
/// # Invariants
/// - Names are unique.
/// - `order` lists every key of `examples` exactly once, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ExampleRegistry {
    /// Examples keyed by name.
    examples: BTreeMap<ExampleName, ExampleSpec>,
    /// Registration order.
    order: Vec<ExampleName>,
}

impl ExampleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an example.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] for duplicate names or examples without code.
    pub fn register(&mut self, spec: ExampleSpec) -> Result<(), RegistryError> {
        if spec.fragments.iter().all(|fragment| fragment.trim().is_empty()) {
            return Err(RegistryError::EmptyExample(spec.name.to_string()));
        }
        if self.examples.contains_key(&spec.name) {
            return Err(RegistryError::Duplicate(spec.name.to_string()));
        }
        self.order.push(spec.name.clone());
        self.examples.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Looks up an example by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ExampleSpec> {
        self.examples.get(name)
    }

    /// Iterates examples in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ExampleSpec> {
        self.order.iter().filter_map(|name| self.examples.get(name))
    }

    /// Returns the number of registered examples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
