// crates/example-gate-config/src/lib.rs
// ============================================================================
// Module: Example Gate Config Library
// Description: Canonical config model and validation for example-gate.
// Purpose: Single source of truth for example-gate.toml semantics.
// Dependencies: example-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `example-gate-config` loads `example-gate.toml`, enforces strict size,
//! encoding, and path limits, and turns the validated model into the core
//! types the harness needs: a process runner, a script template, credentials,
//! and a populated example registry.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
