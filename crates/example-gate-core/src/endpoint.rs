// crates/example-gate-core/src/endpoint.rs
// ============================================================================
// Module: Endpoint Keys
// Description: Typed endpoint keys and expected status codes.
// Purpose: Parse `<path>:<method>` keys used to index documented examples.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Examples are keyed by the endpoint they document, written as
//! `"<path>:<http-method>"` (for example `"/messages:post"`). Keys are split on
//! the last `:` so templated paths keep their own separators intact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing endpoint keys and status codes.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The key did not contain a `:` separator.
    #[error("endpoint key `{0}` must be `<path>:<method>`")]
    MissingSeparator(String),
    /// The path segment was empty or not absolute.
    #[error("endpoint path `{0}` must start with `/`")]
    InvalidPath(String),
    /// The method segment is not a supported HTTP method.
    #[error("unsupported http method `{0}`")]
    UnsupportedMethod(String),
    /// The status code is not a valid HTTP status.
    #[error("invalid status code `{0}`")]
    InvalidStatus(String),
}

// ============================================================================
// SECTION: HTTP Method
// ============================================================================

/// HTTP methods that documented examples may exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// `GET`.
    Get,
    /// `POST`.
    Post,
    /// `PUT`.
    Put,
    /// `PATCH`.
    Patch,
    /// `DELETE`.
    Delete,
}

impl HttpMethod {
    /// Returns the lowercase label used in endpoint keys and `OpenAPI` documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = EndpointError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            _ => Err(EndpointError::UnsupportedMethod(value.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Endpoint Key
// ============================================================================

/// Endpoint documented by an example, rendered as `<path>:<method>`.
///
/// # Invariants
/// - `path` starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EndpointKey {
    /// Endpoint path as written in the `OpenAPI` document.
    path: String,
    /// HTTP method.
    method: HttpMethod,
}

impl EndpointKey {
    /// Builds an endpoint key from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidPath`] when `path` is not absolute.
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Result<Self, EndpointError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(EndpointError::InvalidPath(path));
        }
        Ok(Self {
            path,
            method,
        })
    }

    /// Returns the endpoint path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.method)
    }
}

impl FromStr for EndpointKey {
    type Err = EndpointError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (path, method) = trimmed
            .rsplit_once(':')
            .ok_or_else(|| EndpointError::MissingSeparator(trimmed.to_string()))?;
        Self::new(path, method.parse()?)
    }
}

impl Serialize for EndpointKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EndpointKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Expected Status
// ============================================================================

/// Expected HTTP status code for a documented response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ExpectedStatus(u16);

impl ExpectedStatus {
    /// Status used when an example does not declare one.
    pub const OK: Self = Self(200);

    /// Builds a status code, rejecting values outside `100..=599`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::InvalidStatus`] for out-of-range codes.
    pub fn new(code: u16) -> Result<Self, EndpointError> {
        if (100..=599).contains(&code) {
            Ok(Self(code))
        } else {
            Err(EndpointError::InvalidStatus(code.to_string()))
        }
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }
}

impl Default for ExpectedStatus {
    fn default() -> Self {
        Self::OK
    }
}

impl fmt::Display for ExpectedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExpectedStatus {
    type Err = EndpointError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let code: u16 =
            value.trim().parse().map_err(|_| EndpointError::InvalidStatus(value.to_string()))?;
        Self::new(code)
    }
}

impl<'de> Deserialize<'de> for ExpectedStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u16::deserialize(deserializer)?;
        Self::new(code).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
