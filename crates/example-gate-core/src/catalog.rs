// crates/example-gate-core/src/catalog.rs
// ============================================================================
// Module: Built-in Catalog
// Description: Examples shipped with the harness.
// Purpose: Register the bundled JavaScript documentation examples.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Bundled example sources live under `js/` and are compiled into the binary.
//! Only the blocks between `{code_example|start}` and `{code_example|end}`
//! markers are executed; the surrounding lines are documentation context.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::endpoint::EndpointError;
use crate::endpoint::EndpointKey;
use crate::registry::ExampleName;
use crate::registry::ExampleRegistry;
use crate::registry::ExampleSpec;
use crate::registry::RegistryError;
use crate::script::ScriptError;
use crate::script::extract_code_examples;

// ============================================================================
// SECTION: Sources
// ============================================================================

/// Bundled example: send a stream message and a private message.
const SEND_MESSAGE_JS: &str = include_str!("../js/send_message.js");

/// Built-in examples as (name, endpoint, source).
const BUILTIN_EXAMPLES: &[(&str, &str, &str)] =
    &[("send_message", "/messages:post", SEND_MESSAGE_JS)];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while registering bundled examples.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A bundled example has malformed markers.
    #[error(transparent)]
    Script(#[from] ScriptError),
    /// A bundled endpoint key is malformed.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    /// A bundled example could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ============================================================================
// SECTION: Registration
// ============================================================================

/// Registers every bundled example into `registry`.
///
/// # Errors
///
/// Returns [`CatalogError`] when a bundled example is malformed or its name
/// is already registered.
pub fn register_builtin_examples(registry: &mut ExampleRegistry) -> Result<(), CatalogError> {
    for (name, endpoint, source) in BUILTIN_EXAMPLES {
        let endpoint: EndpointKey = endpoint.parse()?;
        let fragments = extract_code_examples(source)?;
        registry.register(ExampleSpec::new(ExampleName::new(*name)?, endpoint, fragments))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
