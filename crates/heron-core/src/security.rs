//! Per-route security requirements.
//!
//! A requirement names a security scheme for documentation and is checked
//! against the request headers before any parameter is bound.

use http::header::AUTHORIZATION;
use http::HeaderMap;

use crate::error::{BindError, BindResult};

/// A credential a route requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityRequirement {
    /// `Authorization: Bearer <token>`.
    Bearer {
        /// Scheme name used in documentation.
        scheme_name: String,
    },
    /// An API key carried in a header.
    ApiKeyHeader {
        /// Scheme name used in documentation.
        scheme_name: String,
        /// Header carrying the key.
        header: String,
    },
}

impl SecurityRequirement {
    /// A bearer-token requirement.
    #[must_use]
    pub fn bearer(scheme_name: impl Into<String>) -> Self {
        Self::Bearer {
            scheme_name: scheme_name.into(),
        }
    }

    /// An API-key-in-header requirement.
    #[must_use]
    pub fn api_key(scheme_name: impl Into<String>, header: impl Into<String>) -> Self {
        Self::ApiKeyHeader {
            scheme_name: scheme_name.into(),
            header: header.into(),
        }
    }

    /// Scheme name used in documentation.
    pub fn scheme_name(&self) -> &str {
        match self {
            Self::Bearer { scheme_name } | Self::ApiKeyHeader { scheme_name, .. } => scheme_name,
        }
    }

    /// Checks that `headers` carry the credential.
    ///
    /// Only presence and shape are checked; verifying the credential is the
    /// handler's business.
    ///
    /// # Errors
    ///
    /// [`BindError::Unauthorized`] when the credential is missing or empty.
    pub fn check(&self, headers: &HeaderMap) -> BindResult<()> {
        match self {
            Self::Bearer { scheme_name } => {
                let token = headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| {
                        v.split_once(' ')
                            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
                    })
                    .map(|(_, token)| token.trim())
                    .filter(|token| !token.is_empty());

                match token {
                    Some(_) => Ok(()),
                    None => Err(BindError::unauthorized(
                        scheme_name,
                        "missing or malformed bearer token",
                    )),
                }
            }
            Self::ApiKeyHeader {
                scheme_name,
                header,
            } => {
                let present = headers
                    .get(header.as_str())
                    .is_some_and(|v| !v.as_bytes().is_empty());
                if present {
                    Ok(())
                } else {
                    Err(BindError::unauthorized(
                        scheme_name,
                        format!("missing API key header '{header}'"),
                    ))
                }
            }
        }
    }
}
