//! Error types for document generation.

use thiserror::Error;

/// Errors that can occur while generating a document.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the document to JSON.
    #[error("failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A hand-written schema could not be read.
    #[error("failed to convert schema for {context}: {reason}")]
    SchemaConversionError {
        /// Where the schema was declared.
        context: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An operation could not be documented.
    #[error("invalid operation '{operation_id}': {reason}")]
    InvalidOperation {
        /// The operation being documented.
        operation_id: String,
        /// Why it is invalid.
        reason: String,
    },
}

/// Result type for document generation.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid").unwrap_err().into();
        assert!(matches!(err, DocsError::SerializationError(_)));
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_invalid_operation_error() {
        let err = DocsError::InvalidOperation {
            operation_id: "shop.item_get".to_string(),
            reason: "documented twice".to_string(),
        };
        assert!(err.to_string().contains("shop.item_get"));
        assert!(err.to_string().contains("documented twice"));
    }

    #[test]
    fn test_schema_conversion_error() {
        let err = DocsError::SchemaConversionError {
            context: "response 200 of shop.item".to_string(),
            reason: "expected a map".to_string(),
        };
        assert!(err.to_string().contains("response 200 of shop.item"));
    }
}
