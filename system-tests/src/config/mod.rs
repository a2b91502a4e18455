// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for example-gate system tests.
// Purpose: Locate the JavaScript runtime and artifact root for system tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! `EXAMPLE_GATE_SYSTEM_TEST_*` variables choose the runtime program and its
//! timeout; `EXAMPLE_GATE_SYSTEM_TEST_RUN_ROOT` places run artifacts. When
//! `EXAMPLE_GATE_SYSTEM_TEST_REQUIRE_RUNTIME` is set, a missing runtime fails
//! the suite instead of skipping it.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
pub use env::read_env_strict;
