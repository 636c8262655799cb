//! Errors raised while reading a request.
//!
//! These cover payloads that cannot be read at all. Values that are read
//! but fail validation are reported by the binder instead.

use std::fmt;

use heron_core::BindError;
use http::StatusCode;

/// Channel that could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Urlencoded form body.
    Form,
    /// Multipart body.
    Multipart,
    /// JSON payload.
    Json,
    /// Content-Type header.
    ContentType,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Form => write!(f, "form"),
            Self::Multipart => write!(f, "multipart"),
            Self::Json => write!(f, "json"),
            Self::ContentType => write!(f, "content-type"),
        }
    }
}

/// A request channel could not be read.
///
/// # Example
///
/// ```rust
/// use heron_extract::{ExtractionError, ExtractionSource};
/// use http::StatusCode;
///
/// let err = ExtractionError::malformed(ExtractionSource::Json, "expected value at line 1");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.extraction_source(), ExtractionSource::Json);
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Payload could not be decoded
    Malformed,
    /// Body exceeds the configured limit
    PayloadTooLarge,
    /// Content-Type is missing or unusable
    InvalidContentType,
}

impl ExtractionError {
    /// The channel's payload could not be decoded.
    #[must_use]
    pub fn malformed(source: ExtractionSource, details: impl Into<String>) -> Self {
        let details = details.into();
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::Malformed,
            message: format!("failed to read {source} payload: {details}"),
        }
    }

    /// The body exceeds `max_size` bytes.
    #[must_use]
    pub fn payload_too_large(source: ExtractionSource, max_size: usize, actual_size: usize) -> Self {
        Self {
            extraction_source: source,
            kind: ExtractionErrorKind::PayloadTooLarge,
            message: format!("payload too large: max {max_size} bytes, got {actual_size} bytes"),
        }
    }

    /// The Content-Type header cannot be used.
    #[must_use]
    pub fn invalid_content_type(details: impl Into<String>) -> Self {
        Self {
            extraction_source: ExtractionSource::ContentType,
            kind: ExtractionErrorKind::InvalidContentType,
            message: format!("invalid content type: {}", details.into()),
        }
    }

    /// The channel that failed.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::Malformed => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractionErrorKind::InvalidContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }

    /// Error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ExtractionErrorKind::Malformed => "MALFORMED_PAYLOAD",
            ExtractionErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ExtractionErrorKind::InvalidContentType => "INVALID_CONTENT_TYPE",
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExtractionError {}

impl From<ExtractionError> for BindError {
    fn from(err: ExtractionError) -> Self {
        BindError::payload(err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed() {
        let err = ExtractionError::malformed(ExtractionSource::Form, "invalid utf-8");
        assert_eq!(err.extraction_source(), ExtractionSource::Form);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "MALFORMED_PAYLOAD");
        assert_eq!(err.to_string(), "failed to read form payload: invalid utf-8");
    }

    #[test]
    fn test_payload_too_large() {
        let err = ExtractionError::payload_too_large(ExtractionSource::Json, 1024, 2048);
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.to_string().contains("1024"));
        assert!(err.to_string().contains("2048"));
    }

    #[test]
    fn test_invalid_content_type() {
        let err = ExtractionError::invalid_content_type("missing multipart boundary");
        assert_eq!(err.extraction_source(), ExtractionSource::ContentType);
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_into_bind_error() {
        let err = ExtractionError::malformed(ExtractionSource::Json, "eof");
        let bind: BindError = err.into();
        assert_eq!(bind.status_code(), StatusCode::BAD_REQUEST);
        assert!(bind.to_string().contains("json"));
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ExtractionSource::Multipart.to_string(), "multipart");
        assert_eq!(ExtractionSource::ContentType.to_string(), "content-type");
    }
}
