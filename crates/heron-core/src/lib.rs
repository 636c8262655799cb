//! # Heron Core
//!
//! Core types shared by every Heron crate:
//!
//! - [`ParamSource`] / [`SourceKind`] - where a handler parameter is read from
//! - [`TypeDesc`], [`ModelSchema`], [`EnumType`] - declared parameter types
//! - [`ConfigError`] - registration-time failures
//! - [`BindError`], [`FieldError`] - request-time failures
//! - [`SecurityRequirement`] - per-route credential requirements
//! - [`ALLOWED_METHODS`] - the HTTP methods routes may be declared for

#![doc(html_root_url = "https://docs.rs/heron-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod fixtures;
mod method;
mod security;
mod source;
mod types;

pub use error::{BindError, BindResult, ConfigError, ConfigResult, FieldError, ValidationErrors};
pub use method::{carries_body, parse_method, ALLOWED_METHODS};
pub use security::SecurityRequirement;
pub use source::{Constraints, DefaultValue, ParamSource, SourceKind};
pub use types::{EnumType, ModelField, ModelSchema, TypeDesc};
