//! Route rules and matched path values for Heron.
//!
//! Heron does not match requests against routes itself; that belongs to the
//! transport layer. This crate covers the two pieces of routing the binding
//! engine still needs:
//!
//! - **Rule normalization**: rules are written with angle-bracket placeholders
//!   (`/users/<int:id>`). They are validated, stripped of their converter
//!   qualifiers, and rewritten to the brace syntax used by OpenAPI
//!   (`/users/{id}`).
//! - **Path values**: [`Params`] carries the values the transport layer
//!   matched for a request, in rule order.
//!
//! # Example
//!
//! ```rust
//! use heron_router::{check_params_in_path, to_docs_path, validate_rule};
//!
//! let rule = validate_rule("/orgs/<org>/users/<int:id>").unwrap();
//! assert_eq!(rule, "/orgs/<org>/users/<id>");
//! assert_eq!(to_docs_path(&rule).unwrap(), "/orgs/{org}/users/{id}");
//! assert!(check_params_in_path("id", &rule).unwrap());
//! assert!(!check_params_in_path("page", &rule).unwrap());
//! ```

mod error;
mod params;
mod rule;

pub use error::RuleError;
pub use params::Params;
pub use rule::{check_params_in_path, placeholders, to_docs_path, validate_rule, Placeholder};
