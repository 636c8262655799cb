//! HTTP methods routes may be declared for.

use http::Method;

use crate::error::{ConfigError, ConfigResult};

/// Methods accepted at route registration.
pub const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
];

/// Parses a method name, case-insensitively, against [`ALLOWED_METHODS`].
///
/// # Errors
///
/// [`ConfigError::UnsupportedMethod`] for anything outside the allowed set.
///
/// # Example
///
/// ```
/// use heron_core::parse_method;
/// use http::Method;
///
/// assert_eq!(parse_method("post").unwrap(), Method::POST);
/// assert!(parse_method("OPTIONS").is_err());
/// ```
pub fn parse_method(name: &str) -> ConfigResult<Method> {
    ALLOWED_METHODS
        .iter()
        .find(|m| m.as_str().eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| ConfigError::UnsupportedMethod {
            method: name.to_string(),
        })
}

/// Whether requests with `method` have their form and body channels read.
///
/// Everything except GET does.
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_allowed() {
        for name in ["GET", "post", "Put", "DELETE", "patch"] {
            assert!(parse_method(name).is_ok(), "{name} should be allowed");
        }
    }

    #[test]
    fn test_parse_method_rejected() {
        for name in ["HEAD", "OPTIONS", "TRACE", "CONNECT", "FETCH", ""] {
            let err = parse_method(name).unwrap_err();
            assert_eq!(
                err,
                ConfigError::UnsupportedMethod {
                    method: name.to_string()
                }
            );
        }
    }

    #[test]
    fn test_carries_body() {
        assert!(!carries_body(&Method::GET));
        assert!(carries_body(&Method::POST));
        assert!(carries_body(&Method::DELETE));
    }
}
