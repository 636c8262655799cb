//! Error types for Heron.
//!
//! Two families, split by when they happen:
//!
//! - [`ConfigError`]: a route or router could not be registered. These are
//!   raised at startup and are never seen by clients.
//! - [`BindError`]: a request could not be bound to its handler. These map
//!   to a client-facing status code and a JSON body.
//!
//! Validation failures carry one [`FieldError`] per offending value, shaped
//! as `{"loc": [...], "msg": "...", "type": "..."}`.

use std::fmt;

use heron_router::RuleError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias using [`BindError`].
pub type BindResult<T> = Result<T, BindError>;

/// Registration-time failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The route rule is invalid: ambiguous path parameter, multiple type
    /// qualifiers, or malformed.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// The route declares a method outside the allowed set.
    #[error("unsupported HTTP method '{method}', expected one of GET, POST, PUT, DELETE, PATCH")]
    UnsupportedMethod {
        /// The rejected method.
        method: String,
    },

    /// An endpoint name is already bound to a different handler.
    #[error("endpoint '{endpoint}' is already bound to handler '{existing}'")]
    EndpointConflict {
        /// Endpoint name.
        endpoint: String,
        /// Handler the name is already bound to.
        existing: String,
    },

    /// A different router is already registered under this name.
    #[error("a different router is already registered under the name '{name}'")]
    RouterConflict {
        /// Router name.
        name: String,
    },

    /// Two resolved parameters share a binding key.
    #[error("parameter '{key}' of handler '{handler}' is declared more than once")]
    DuplicateParameter {
        /// The repeated binding key.
        key: String,
        /// The handler being resolved.
        handler: String,
    },

    /// Two different dependencies, or a dependency and the handler itself,
    /// share a name.
    #[error("dependency '{name}' of handler '{handler}' collides with a different signature of the same name")]
    DependencyConflict {
        /// The shared name.
        name: String,
        /// The handler being resolved.
        handler: String,
    },

    /// A `pattern` constraint is not a valid regular expression.
    #[error("invalid pattern '{pattern}' on '{field}': {reason}")]
    InvalidPattern {
        /// Parameter or field carrying the pattern.
        field: String,
        /// The pattern text.
        pattern: String,
        /// Why it failed to compile.
        reason: String,
    },
}

impl ConfigError {
    /// Whether this is an ambiguous path parameter failure.
    #[must_use]
    pub const fn is_ambiguous_path(&self) -> bool {
        matches!(self, Self::Rule(RuleError::AmbiguousPathParameter { .. }))
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Location of the value: binding key, then nested field names or list
    /// indices.
    pub loc: Vec<String>,
    /// Human-readable message.
    pub msg: String,
    /// Machine-readable kind, e.g. `value_error.missing`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(loc: Vec<String>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// A required value is absent.
    #[must_use]
    pub fn missing(loc: Vec<String>) -> Self {
        Self::new(loc, "field required", "value_error.missing")
    }

    /// Null was supplied for a non-nullable value.
    #[must_use]
    pub fn none_not_allowed(loc: Vec<String>) -> Self {
        Self::new(loc, "none is not an allowed value", "type_error.none.not_allowed")
    }
}

/// All validation failures of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error.
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Appends every error of `other`.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// Whether nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The failures.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether some failure is located at `key`.
    #[must_use]
    pub fn mentions(&self, key: &str) -> bool {
        self.0.iter().any(|e| e.loc.iter().any(|l| l == key))
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0.len();
        write!(f, "{n} validation error{}", if n == 1 { "" } else { "s" })?;
        for e in &self.0 {
            write!(f, "\n  {}: {} ({})", e.loc.join("."), e.msg, e.kind)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Request-time failures.
#[derive(Debug, Error)]
pub enum BindError {
    /// One or more values failed validation.
    #[error("request validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The route's security requirement was not met.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Security scheme that rejected the request.
        scheme: String,
        /// What was missing or wrong.
        message: String,
    },

    /// The payload could not be read.
    #[error("malformed payload: {message}")]
    Payload {
        /// What went wrong.
        message: String,
    },
}

impl BindError {
    /// Creates a payload error.
    #[must_use]
    pub fn payload(message: impl Into<String>) -> Self {
        Self::Payload {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(scheme: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            scheme: scheme.into(),
            message: message.into(),
        }
    }

    /// Default HTTP status code.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Payload { .. } => StatusCode::BAD_REQUEST,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::Payload { .. } => "MALFORMED_PAYLOAD",
        }
    }

    /// The validation failures, if this is a validation error.
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// JSON response body: `{"detail": [...]}` for validation failures,
    /// `{"detail": "message"}` otherwise.
    #[must_use]
    pub fn to_body(&self) -> Value {
        match self {
            Self::Validation(errors) => json!({ "detail": errors }),
            Self::Unauthorized { message, .. } | Self::Payload { message } => {
                json!({ "detail": message })
            }
        }
    }
}
