// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for example-gate system-tests.
// Purpose: Provide runtime probing, stub workspaces, and artifact utilities.
// Dependencies: system-tests, example-gate-core
// ============================================================================

//! ## Overview
//! Shared helpers for example-gate system-tests.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod cli;
pub mod workspace;
