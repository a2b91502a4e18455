// system-tests/src/lib.rs
// ============================================================================
// Module: Example Gate System Tests Library
// Description: Shared configuration for end-to-end example runs.
// Purpose: Provide typed environment settings to system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts the environment-backed configuration used by the
//! system-test binaries in `system-tests/tests`. The tests themselves run
//! only with the `system-tests` feature enabled.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
