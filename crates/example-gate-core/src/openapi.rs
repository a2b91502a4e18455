// crates/example-gate-core/src/openapi.rs
// ============================================================================
// Module: OpenAPI Validator Adapter
// Description: Response-schema validation backed by an OpenAPI document.
// Purpose: Implement the validator bridge with the `jsonschema` crate.
// Dependencies: jsonschema, serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! [`OpenApiValidator`] looks up
//! `paths[path][method].responses[status].content["application/json"].schema`
//! (falling back to the `default` response; a response given as a local
//! `$ref` is followed first) and validates records with a
//! draft 2020-12 validator. The document's `components` section is attached
//! to every compiled schema so local `#/components/...` references resolve.
//! OpenAPI 3.0 `nullable: true` is rewritten to a `null`-admitting `type`.
//!
//! Compiled validators are cached per (path, method, status).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::endpoint::ExpectedStatus;
use crate::endpoint::HttpMethod;
use crate::validation::ResponseValidator;
use crate::validation::SchemaMismatch;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum `OpenAPI` document size accepted by the loader.
pub const MAX_OPENAPI_BYTES: u64 = 16 * 1024 * 1024;

/// Media type whose schema is used for validation.
const JSON_MEDIA_TYPE: &str = "application/json";

/// Reference keyword shared by schemas and Response Objects.
const REF_KEY: &str = "$ref";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading an `OpenAPI` document.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum OpenApiError {
    /// The document could not be read.
    #[error("openapi io error: {0}")]
    Io(String),
    /// The document exceeds [`MAX_OPENAPI_BYTES`].
    #[error("openapi document exceeds size limit ({actual} > {limit})")]
    TooLarge {
        /// Actual size in bytes.
        actual: u64,
        /// Configured limit.
        limit: u64,
    },
    /// The document is not valid YAML or JSON.
    #[error("openapi parse error: {0}")]
    Parse(String),
    /// The document is structurally not an `OpenAPI` description.
    #[error("invalid openapi document: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Cache key for compiled response validators.
type CacheKey = (String, HttpMethod, ExpectedStatus);

/// Response validator backed by an `OpenAPI` document.
pub struct OpenApiValidator {
    /// Parsed `OpenAPI` document.
    document: Value,
    /// Compiled validators keyed by operation and status.
    cache: Mutex<BTreeMap<CacheKey, Arc<Validator>>>,
}

impl std::fmt::Debug for OpenApiValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenApiValidator").finish_non_exhaustive()
    }
}

impl OpenApiValidator {
    /// Loads an `OpenAPI` document from YAML (`.yaml`/`.yml`) or JSON.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiError`] when the file is unreadable, too large, or
    /// not an `OpenAPI` document.
    pub fn load(path: &Path) -> Result<Self, OpenApiError> {
        let size = fs::metadata(path)
            .map_err(|err| OpenApiError::Io(format!("{}: {err}", path.display())))?
            .len();
        if size > MAX_OPENAPI_BYTES {
            return Err(OpenApiError::TooLarge {
                actual: size,
                limit: MAX_OPENAPI_BYTES,
            });
        }
        let text = fs::read_to_string(path)
            .map_err(|err| OpenApiError::Io(format!("{}: {err}", path.display())))?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let document = if is_yaml { parse_yaml(&text)? } else { parse_json(&text)? };
        Self::from_document(document)
    }

    /// Wraps an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiError::Invalid`] when the document has no `paths` object.
    pub fn from_document(mut document: Value) -> Result<Self, OpenApiError> {
        if !document.get("paths").is_some_and(Value::is_object) {
            return Err(OpenApiError::Invalid("missing `paths` object".to_string()));
        }
        rewrite_nullable(&mut document);
        Ok(Self {
            document,
            cache: Mutex::new(BTreeMap::new()),
        })
    }

    /// Returns the compiled validator for an operation, compiling on first use.
    fn validator_for(
        &self,
        path: &str,
        method: HttpMethod,
        status: ExpectedStatus,
    ) -> Result<Arc<Validator>, String> {
        let key = (path.to_string(), method, status);
        if let Some(found) = self.cache.lock().ok().and_then(|cache| cache.get(&key).cloned()) {
            return Ok(found);
        }
        let schema = self.response_schema(path, method, status)?;
        let compiled = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .map(Arc::new)
            .map_err(|err| format!("response schema does not compile: {err}"))?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, Arc::clone(&compiled));
        }
        Ok(compiled)
    }

    /// Extracts the response schema and attaches `components` for `$ref` lookup.
    fn response_schema(
        &self,
        path: &str,
        method: HttpMethod,
        status: ExpectedStatus,
    ) -> Result<Value, String> {
        let operation = self
            .document
            .get("paths")
            .and_then(|paths| paths.get(path))
            .and_then(|item| item.get(method.as_str()))
            .ok_or_else(|| format!("no operation documented for {method} {path}"))?;
        let responses = operation
            .get("responses")
            .ok_or_else(|| format!("operation {method} {path} documents no responses"))?;
        let response = responses
            .get(status.to_string())
            .or_else(|| responses.get("default"))
            .ok_or_else(|| format!("no {status} response documented for {method} {path}"))?;
        let schema = self
            .resolve_local_ref(response)?
            .get("content")
            .and_then(|content| content.get(JSON_MEDIA_TYPE))
            .and_then(|media| media.get("schema"))
            .ok_or_else(|| {
                format!("{status} response for {method} {path} has no {JSON_MEDIA_TYPE} schema")
            })?;

        let mut root = match schema {
            Value::Object(map) => map.clone(),
            Value::Bool(_) => {
                let mut map = Map::new();
                map.insert("allOf".to_string(), Value::Array(vec![schema.clone()]));
                map
            }
            _ => return Err(format!("response schema for {method} {path} is not a schema")),
        };
        if let Some(components) = self.document.get("components") {
            root.insert("components".to_string(), components.clone());
        }
        Ok(Value::Object(root))
    }

    /// Follows local `$ref` pointers on a non-schema object such as a
    /// Response Object, failing on external or cyclic references.
    fn resolve_local_ref<'a>(&'a self, mut value: &'a Value) -> Result<&'a Value, String> {
        let mut seen = BTreeSet::new();
        while let Some(reference) = value.get(REF_KEY).and_then(Value::as_str) {
            let pointer = reference
                .strip_prefix('#')
                .ok_or_else(|| format!("non-local reference {reference} is not supported"))?;
            if !seen.insert(reference) {
                return Err(format!("reference cycle at {reference}"));
            }
            value = self
                .document
                .pointer(pointer)
                .ok_or_else(|| format!("unresolved reference {reference}"))?;
        }
        Ok(value)
    }
}

impl ResponseValidator for OpenApiValidator {
    fn validate(
        &self,
        record: &Value,
        path: &str,
        method: HttpMethod,
        status: ExpectedStatus,
    ) -> Result<(), SchemaMismatch> {
        let mismatch = |errors: Vec<String>| SchemaMismatch {
            path: path.to_string(),
            method,
            status,
            errors,
        };
        let validator = self.validator_for(path, method, status).map_err(|err| mismatch(vec![err]))?;
        let errors: Vec<String> = validator.iter_errors(record).map(|err| err.to_string()).collect();
        if errors.is_empty() { Ok(()) } else { Err(mismatch(errors)) }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses YAML, converting non-string mapping keys (such as `200:`) to strings.
fn parse_yaml(text: &str) -> Result<Value, OpenApiError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|err| OpenApiError::Parse(err.to_string()))?;
    serde_json::to_value(yaml).map_err(|err| OpenApiError::Parse(err.to_string()))
}

/// Parses JSON.
fn parse_json(text: &str) -> Result<Value, OpenApiError> {
    serde_json::from_str(text).map_err(|err| OpenApiError::Parse(err.to_string()))
}

/// Rewrites `nullable: true` schemas to admit `null` in draft 2020-12 terms.
fn rewrite_nullable(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("nullable") == Some(&Value::Bool(true)) {
                match map.get_mut("type") {
                    Some(Value::String(kind)) => {
                        let kind = std::mem::take(kind);
                        map.insert(
                            "type".to_string(),
                            Value::Array(vec![Value::String(kind), Value::String("null".to_string())]),
                        );
                    }
                    Some(Value::Array(kinds)) => {
                        let null = Value::String("null".to_string());
                        if !kinds.contains(&null) {
                            kinds.push(null);
                        }
                    }
                    _ => {}
                }
            }
            for child in map.values_mut() {
                rewrite_nullable(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_nullable(item);
            }
        }
        _ => {}
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
