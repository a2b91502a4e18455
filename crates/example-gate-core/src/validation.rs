// crates/example-gate-core/src/validation.rs
// ============================================================================
// Module: Validator Bridge
// Description: Typed pass-through from decoded records to a schema validator.
// Purpose: Forward each response record with its endpoint and expected status.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The bridge owns no validation logic. It hands every record, together with
//! the endpoint path, method, and expected status, to a [`ResponseValidator`]
//! and stops at the first mismatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::endpoint::EndpointKey;
use crate::endpoint::ExpectedStatus;
use crate::endpoint::HttpMethod;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A response that does not match its documented schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema mismatch for {method} {path} ({status}): {}", .errors.join("; "))]
pub struct SchemaMismatch {
    /// Endpoint path.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Expected status code.
    pub status: ExpectedStatus,
    /// Validator messages describing each difference.
    pub errors: Vec<String>,
}

// ============================================================================
// SECTION: Validator Trait
// ============================================================================

/// Validates a response record against the documented response schema.
pub trait ResponseValidator: Send + Sync {
    /// Returns `Ok(())` when `record` matches the schema for
    /// (`path`, `method`, `status`).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaMismatch`] describing every difference found.
    fn validate(
        &self,
        record: &Value,
        path: &str,
        method: HttpMethod,
        status: ExpectedStatus,
    ) -> Result<(), SchemaMismatch>;
}

// ============================================================================
// SECTION: Bridge
// ============================================================================

/// Forwards `records` in order and returns how many were validated.
///
/// # Errors
///
/// Returns the first [`SchemaMismatch`]; later records are not forwarded.
pub fn validate_records<V: ResponseValidator + ?Sized>(
    validator: &V,
    records: &[Value],
    endpoint: &EndpointKey,
    status: ExpectedStatus,
) -> Result<usize, SchemaMismatch> {
    for record in records {
        validator.validate(record, endpoint.path(), endpoint.method(), status)?;
    }
    Ok(records.len())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
