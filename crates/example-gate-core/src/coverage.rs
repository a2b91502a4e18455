// crates/example-gate-core/src/coverage.rs
// ============================================================================
// Module: Coverage Tracker
// Description: Run-scoped record of registered versus invoked examples.
// Purpose: Fail a run when a registered example was never exercised.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`CoverageTracker`] is built from the registry at the start of a run and
//! discarded at the end. It answers one question: which registered examples
//! were never invoked? The check says nothing about whether invoked examples
//! passed their assertions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::endpoint::EndpointKey;
use crate::registry::ExampleName;
use crate::registry::ExampleRegistry;

// ============================================================================
// SECTION: Coverage Mode
// ============================================================================

/// How a coverage gap affects the run outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageMode {
    /// Missing examples fail the run with exit status 1.
    #[default]
    Strict,
    /// Missing examples are reported but the run still succeeds.
    Report,
}

impl CoverageMode {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Report => "report",
        }
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Registered example that was never invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingExample {
    /// Example name.
    pub name: ExampleName,
    /// Endpoint the example documents.
    pub endpoint: EndpointKey,
}

/// Outcome of the end-of-run coverage comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    /// Number of registered examples.
    pub registered: usize,
    /// Number of invoked examples.
    pub called: usize,
    /// Registered examples that were never invoked, sorted by name.
    pub missing: Vec<MissingExample>,
}

impl CoverageReport {
    /// Returns true when every registered example ran.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Returns the process exit status implied by this report under `mode`.
    #[must_use]
    pub fn exit_status(&self, mode: CoverageMode) -> u8 {
        match mode {
            CoverageMode::Strict if !self.is_complete() => 1,
            CoverageMode::Strict | CoverageMode::Report => 0,
        }
    }

    /// Renders the gap as human-readable lines, one per missing example.
    #[must_use]
    pub fn describe_missing(&self) -> Vec<String> {
        self.missing.iter().map(|entry| format!("{} ({})", entry.name, entry.endpoint)).collect()
    }
}

// ============================================================================
// SECTION: Tracker
// ============================================================================

/// Registered and called example sets for a single run.
///
/// # Invariants
/// - `called` only holds names present in `registered`.
#[derive(Debug, Clone, Default)]
pub struct CoverageTracker {
    /// Registered examples and their endpoints.
    registered: BTreeMap<ExampleName, EndpointKey>,
    /// Examples invoked during this run.
    called: BTreeSet<ExampleName>,
}

impl CoverageTracker {
    /// Snapshots the registry into a fresh tracker.
    #[must_use]
    pub fn from_registry(registry: &ExampleRegistry) -> Self {
        let registered =
            registry.iter().map(|spec| (spec.name.clone(), spec.endpoint.clone())).collect();
        Self {
            registered,
            called: BTreeSet::new(),
        }
    }

    /// Marks an example as invoked.
    ///
    /// Returns `true` on the first call for `name` and `false` afterwards or
    /// when `name` was never registered.
    pub fn mark_called(&mut self, name: &ExampleName) -> bool {
        if !self.registered.contains_key(name) {
            return false;
        }
        self.called.insert(name.clone())
    }

    /// Returns whether `name` has been invoked.
    #[must_use]
    pub fn was_called(&self, name: &ExampleName) -> bool {
        self.called.contains(name)
    }

    /// Compares registered and called sets.
    #[must_use]
    pub fn report(&self) -> CoverageReport {
        let missing = self
            .registered
            .iter()
            .filter(|(name, _)| !self.called.contains(*name))
            .map(|(name, endpoint)| MissingExample {
                name: name.clone(),
                endpoint: endpoint.clone(),
            })
            .collect();
        CoverageReport {
            registered: self.registered.len(),
            called: self.called.len(),
            missing,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
