//! Rule validation errors.

use thiserror::Error;

/// Errors raised while validating or rewriting a route rule.
///
/// These are registration-time failures: a rule that produces one of them
/// can never be mounted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A placeholder declares more than one converter qualifier (`<a:b:c>`).
    #[error("multiple type qualifiers in placeholder '<{placeholder}>' of rule {rule}")]
    MultipleTypeQualifiers {
        /// The offending rule.
        rule: String,
        /// The placeholder text between the brackets.
        placeholder: String,
    },

    /// The same parameter name appears in more than one placeholder.
    #[error("invalid path: '{key}' appears more than once in {path}")]
    AmbiguousPathParameter {
        /// The repeated parameter name.
        key: String,
        /// The rule it was found in.
        path: String,
    },

    /// The rule is malformed for another reason.
    #[error("invalid rule '{rule}': {reason}")]
    InvalidRule {
        /// The offending rule.
        rule: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl RuleError {
    pub(crate) fn invalid(rule: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuleError::AmbiguousPathParameter {
            key: "id".to_string(),
            path: "/a/<id>/b/<id>".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid path: 'id' appears more than once in /a/<id>/b/<id>"
        );

        let err = RuleError::MultipleTypeQualifiers {
            rule: "/a/<int:str:id>".to_string(),
            placeholder: "int:str:id".to_string(),
        };
        assert!(err.to_string().contains("<int:str:id>"));
    }

    #[test]
    fn test_invalid_helper() {
        let err = RuleError::invalid("users", "rule must start with '/'");
        assert!(matches!(err, RuleError::InvalidRule { ref rule, .. } if rule == "users"));
    }
}
