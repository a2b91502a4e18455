// crates/example-gate-core/src/lib.rs
// ============================================================================
// Module: Example Gate Core Library
// Description: Execution and validation pipeline for documented API examples.
// Purpose: Run JavaScript doc examples and check their output against schemas.
// Dependencies: async-trait, jsonschema, serde, serde_json, serde_yaml, thiserror, tokio
// ============================================================================

//! ## Overview
//! `example-gate-core` executes the JavaScript code samples embedded in API
//! documentation, decodes the JSON records they print, and validates each
//! record against the documented response schema. A run-scoped coverage
//! tracker fails the run when a registered example was never exercised.
//!
//! The pipeline is strictly sequential: one example is rendered, executed,
//! parsed, and validated before the next begins. Every failure is a hard stop
//! and the transient credentials file is removed on all exit paths.
//!
//! ## Index
//! - Registration: [`ExampleRegistry`], [`ExampleSpec`], [`EndpointKey`]
//! - Coverage: [`CoverageTracker`], [`CoverageReport`], [`CoverageMode`]
//! - Execution: [`ScriptExecutor`], [`ProcessRunner`], [`ScriptTemplate`]
//! - Decoding: [`parse_json_lines`]
//! - Validation: [`ResponseValidator`], [`OpenApiValidator`], [`FixtureSet`]
//! - Orchestration: [`Harness`], [`RunSummary`]

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod coverage;
pub mod credentials;
pub mod endpoint;
pub mod events;
pub mod fixtures;
pub mod harness;
pub mod openapi;
pub mod output;
pub mod registry;
pub mod runner;
pub mod script;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::CatalogError;
pub use catalog::register_builtin_examples;
pub use coverage::CoverageMode;
pub use coverage::CoverageReport;
pub use coverage::CoverageTracker;
pub use coverage::MissingExample;
pub use credentials::ApiCredentials;
pub use credentials::CredentialsError;
pub use credentials::CredentialsFile;
pub use endpoint::EndpointError;
pub use endpoint::EndpointKey;
pub use endpoint::ExpectedStatus;
pub use endpoint::HttpMethod;
pub use events::EventSink;
pub use events::HarnessEvent;
pub use events::JsonLinesEvents;
pub use events::NoopEvents;
pub use fixtures::FixtureError;
pub use fixtures::FixtureMismatch;
pub use fixtures::FixtureSet;
pub use fixtures::compare_shape;
pub use harness::ExampleFailure;
pub use harness::ExampleOutcome;
pub use harness::ExampleSelection;
pub use harness::Harness;
pub use harness::HarnessError;
pub use harness::RunSummary;
pub use openapi::OpenApiError;
pub use openapi::OpenApiValidator;
pub use output::OutputParseError;
pub use output::parse_json_lines;
pub use registry::ExampleName;
pub use registry::ExampleRegistry;
pub use registry::ExampleSpec;
pub use registry::RegistryError;
pub use runner::ProcessRunner;
pub use runner::RunnerError;
pub use runner::RuntimeCheck;
pub use runner::ScriptExecutor;
pub use runner::resolve_runtime;
pub use script::ScriptError;
pub use script::ScriptTemplate;
pub use script::extract_code_examples;
pub use validation::ResponseValidator;
pub use validation::SchemaMismatch;
pub use validation::validate_records;
