//! # Heron Docs
//!
//! OpenAPI document generation for Heron endpoints.
//!
//! The generator walks an [`EndpointRegistry`](heron::EndpointRegistry) in
//! declaration order and writes one operation per documented endpoint:
//!
//! - path, query and header parameters become `parameters`, under their wire names
//! - a single structured body is documented as its model; several bodies as
//!   an object keyed by alias
//! - form and file parameters become a `multipart/form-data` body, or
//!   `application/x-www-form-urlencoded` when every one is urlencoded
//! - models land in `components.schemas` and are referenced with `$ref`
//! - route security requirements land in `components.securitySchemes`
//!
//! Routes with auto-docs disabled are skipped. A route carrying custom
//! documentation is written out as given.
//!
//! ## Quick Start
//!
//! ```rust
//! use heron::prelude::*;
//! use heron::config::HeronConfig;
//! use heron_docs::OpenApiGenerator;
//!
//! let mut router: ApiRouter<()> = ApiRouter::new("users");
//! router
//!     .post(
//!         "/users",
//!         HandlerSignature::new("create_user")
//!             .param("user", TypeDesc::model(heron::core::fixtures::user_model()), ParamSource::body_required()),
//!         |_| (),
//!     )
//!     .unwrap();
//!
//! let mut registry = EndpointRegistry::new();
//! registry.mount(&router).unwrap();
//!
//! let config = HeronConfig::default();
//! let json = OpenApiGenerator::from_config(&config.docs).generate_json(&registry).unwrap();
//! assert!(json.contains("#/components/schemas/User"));
//! ```

#![doc(html_root_url = "https://docs.rs/heron-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod generator;
mod openapi;
mod schema;

pub use error::{DocsError, DocsResult};
pub use generator::OpenApiGenerator;
pub use openapi::{
    Components, Contact, Info, License, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem,
    RequestBody, Response, Schema, SchemaType, SecurityRequirement, SecurityScheme, Server, Tag,
};
pub use schema::{apply_constraints, SchemaConverter};
