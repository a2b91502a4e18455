// crates/example-gate-core/src/harness.rs
// ============================================================================
// Module: Harness Pipeline
// Description: Sequential execution of registered documentation examples.
// Purpose: Compose credentials, runner, parser, validators, and coverage.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`Harness::run`] materializes the credentials file, then for each selected
//! example in registration order: marks it called, renders the script, runs
//! it, decodes the output, validates every record against the response
//! schema, and compares records with the example's fixture when one is set.
//! The first failure stops the run. The credentials file is removed on every
//! path. After the loop the coverage report decides the exit status.
//!
//! Selecting a subset with [`ExampleSelection::Only`] leaves the remaining
//! examples uncalled, so a strict coverage gate reports them as gaps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::coverage::CoverageMode;
use crate::coverage::CoverageReport;
use crate::coverage::CoverageTracker;
use crate::credentials::ApiCredentials;
use crate::credentials::CredentialsError;
use crate::credentials::CredentialsFile;
use crate::endpoint::EndpointKey;
use crate::events::EventSink;
use crate::events::HarnessEvent;
use crate::events::NoopEvents;
use crate::fixtures::FixtureError;
use crate::fixtures::FixtureMismatch;
use crate::fixtures::FixtureSet;
use crate::fixtures::compare_shape;
use crate::output::OutputParseError;
use crate::output::parse_json_lines;
use crate::registry::ExampleName;
use crate::registry::ExampleRegistry;
use crate::registry::ExampleSpec;
use crate::runner::RunnerError;
use crate::runner::ScriptExecutor;
use crate::script::ScriptError;
use crate::script::ScriptTemplate;
use crate::validation::ResponseValidator;
use crate::validation::SchemaMismatch;
use crate::validation::validate_records;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reasons a single example failed.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ExampleFailure {
    /// The script could not be rendered.
    #[error(transparent)]
    Script(#[from] ScriptError),
    /// The runtime failed.
    #[error(transparent)]
    Runner(#[from] RunnerError),
    /// The runtime printed a line that is not JSON.
    #[error(transparent)]
    Output(#[from] OutputParseError),
    /// A record does not match the response schema.
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
    /// The example references a missing fixture.
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    /// A record does not match the fixture shape.
    #[error("record {record}: {source}")]
    FixtureShape {
        /// 1-based record position.
        record: usize,
        /// Shape difference.
        source: FixtureMismatch,
    },
}

/// Errors that abort a harness run.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The credentials file could not be written or removed.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    /// A selected example name is not registered.
    #[error("unknown example: {0}")]
    UnknownExample(String),
    /// An example failed.
    #[error("example {name} failed: {source}")]
    Example {
        /// Failing example.
        name: ExampleName,
        /// Failure cause.
        source: ExampleFailure,
    },
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Which registered examples a run executes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExampleSelection {
    /// Every registered example.
    #[default]
    All,
    /// Only the named examples, still in registration order.
    Only(Vec<String>),
}

/// Result of one executed example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleOutcome {
    /// Example name.
    pub name: ExampleName,
    /// Endpoint exercised.
    pub endpoint: EndpointKey,
    /// Records validated.
    pub records: usize,
}

/// Summary of a completed run.
///
/// # Invariants
/// - `exit_status` equals `coverage.exit_status(coverage_mode)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Executed examples in order.
    pub examples: Vec<ExampleOutcome>,
    /// Total records validated.
    pub records: usize,
    /// Coverage comparison.
    pub coverage: CoverageReport,
    /// Coverage mode applied.
    pub coverage_mode: CoverageMode,
    /// Process exit status implied by coverage.
    pub exit_status: u8,
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Runs registered examples through the execution and validation pipeline.
pub struct Harness {
    /// Registered examples.
    registry: ExampleRegistry,
    /// Script executor.
    executor: Arc<dyn ScriptExecutor>,
    /// Response schema validator.
    validator: Arc<dyn ResponseValidator>,
    /// Script template; also names the credentials file location.
    template: ScriptTemplate,
    /// Fixtures referenced by examples.
    fixtures: FixtureSet,
    /// Progress event sink.
    events: Arc<dyn EventSink>,
    /// Coverage gate mode.
    coverage_mode: CoverageMode,
}

impl Harness {
    /// Creates a harness with no fixtures, no-op events, and strict coverage.
    #[must_use]
    pub fn new(
        registry: ExampleRegistry,
        executor: Arc<dyn ScriptExecutor>,
        validator: Arc<dyn ResponseValidator>,
        template: ScriptTemplate,
    ) -> Self {
        Self {
            registry,
            executor,
            validator,
            template,
            fixtures: FixtureSet::default(),
            events: Arc::new(NoopEvents),
            coverage_mode: CoverageMode::default(),
        }
    }

    /// Sets the fixtures used for shape comparison.
    #[must_use]
    pub fn with_fixtures(mut self, fixtures: FixtureSet) -> Self {
        self.fixtures = fixtures;
        self
    }

    /// Sets the progress event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Sets the coverage gate mode.
    #[must_use]
    pub const fn with_coverage_mode(mut self, mode: CoverageMode) -> Self {
        self.coverage_mode = mode;
        self
    }

    /// Returns the registered examples.
    #[must_use]
    pub const fn registry(&self) -> &ExampleRegistry {
        &self.registry
    }

    /// Executes the selected examples.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] on the first failure. The credentials file is
    /// removed before returning in every case.
    pub async fn run(
        &self,
        credentials: &ApiCredentials,
        selection: &ExampleSelection,
    ) -> Result<RunSummary, HarnessError> {
        let selected = self.select(selection)?;
        let mut tracker = CoverageTracker::from_registry(&self.registry);
        self.events.record(&HarnessEvent::RunStarted {
            selected: selected.len(),
            registered: self.registry.len(),
        });

        let guard = CredentialsFile::materialize(self.template.credentials_path(), credentials)?;
        let mut outcomes = Vec::with_capacity(selected.len());
        for spec in selected {
            tracker.mark_called(&spec.name);
            self.events.record(&HarnessEvent::ExampleStarted {
                name: spec.name.to_string(),
                endpoint: spec.endpoint.to_string(),
            });
            match self.run_example(spec).await {
                Ok(records) => {
                    self.events.record(&HarnessEvent::ExampleFinished {
                        name: spec.name.to_string(),
                        records,
                        ok: true,
                        error: None,
                    });
                    outcomes.push(ExampleOutcome {
                        name: spec.name.clone(),
                        endpoint: spec.endpoint.clone(),
                        records,
                    });
                }
                Err(source) => {
                    self.events.record(&HarnessEvent::ExampleFinished {
                        name: spec.name.to_string(),
                        records: 0,
                        ok: false,
                        error: Some(source.to_string()),
                    });
                    drop(guard);
                    return Err(HarnessError::Example {
                        name: spec.name.clone(),
                        source,
                    });
                }
            }
        }
        guard.remove()?;

        let coverage = tracker.report();
        for missing in &coverage.missing {
            self.events.record(&HarnessEvent::CoverageGap {
                name: missing.name.to_string(),
                endpoint: missing.endpoint.to_string(),
            });
        }
        let records = outcomes.iter().map(|outcome| outcome.records).sum();
        let exit_status = coverage.exit_status(self.coverage_mode);
        self.events.record(&HarnessEvent::RunFinished {
            examples: outcomes.len(),
            records,
            coverage: self.coverage_mode,
            exit_status,
        });
        Ok(RunSummary {
            examples: outcomes,
            records,
            coverage,
            coverage_mode: self.coverage_mode,
            exit_status,
        })
    }

    /// Resolves the selection to specs in registration order.
    fn select(&self, selection: &ExampleSelection) -> Result<Vec<&ExampleSpec>, HarnessError> {
        match selection {
            ExampleSelection::All => Ok(self.registry.iter().collect()),
            ExampleSelection::Only(names) => {
                let mut wanted = BTreeSet::new();
                for name in names {
                    if self.registry.get(name).is_none() {
                        return Err(HarnessError::UnknownExample(name.clone()));
                    }
                    wanted.insert(name.as_str());
                }
                Ok(self.registry.iter().filter(|spec| wanted.contains(spec.name.as_str())).collect())
            }
        }
    }

    /// Runs one example and returns how many records it validated.
    async fn run_example(&self, spec: &ExampleSpec) -> Result<usize, ExampleFailure> {
        let script = self.template.render(&spec.fragments)?;
        let stdout = self.executor.execute(&script).await?;
        let records = parse_json_lines(&stdout)?;
        let validated =
            validate_records(self.validator.as_ref(), &records, &spec.endpoint, spec.status)?;
        if let Some(key) = &spec.fixture {
            let expected = self.fixtures.require(key)?;
            for (index, record) in records.iter().enumerate() {
                compare_shape(expected, record).map_err(|source| ExampleFailure::FixtureShape {
                    record: index + 1,
                    source,
                })?;
            }
        }
        Ok(validated)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
