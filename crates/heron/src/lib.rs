//! # Heron
//!
//! **Declarative parameter binding for HTTP handlers.**
//!
//! A handler declares its parameters once, with where each one comes from
//! (path, query, header, JSON body, form, file), its type, default and
//! constraints. Heron then:
//!
//! - resolves the declaration, dependencies included, into a flat signature
//!   at registration time, failing fast on ambiguous rules and key clashes
//! - binds each request into validated, coerced [`Arguments`](heron_binding::Arguments)
//!   with per-field errors in the familiar `{"detail": [{loc, msg, type}]}` shape
//! - records an [`EndpointDescriptor`] per route and method for
//!   documentation generators such as `heron-docs`
//!
//! ## Quick Start
//!
//! ```rust
//! use heron::prelude::*;
//! use http::Uri;
//!
//! let mut router = ApiRouter::new("items");
//! let route = router
//!     .get(
//!         "/items",
//!         HandlerSignature::new("list_items")
//!             .param("page", TypeDesc::Integer, ParamSource::query(1).ge(1.0))
//!             .param("color", TypeDesc::enumeration(heron::core::fixtures::color_enum()), ParamSource::query("red")),
//!         |args| (args.get::<i64>("page").unwrap(), args.get::<String>("color").unwrap()),
//!     )
//!     .unwrap();
//!
//! let ctx = RequestContext::builder()
//!     .uri(Uri::from_static("/items?page=2&color=blue"))
//!     .build();
//! assert_eq!(route.call(&ctx).unwrap(), (2, "blue".to_string()));
//!
//! let ctx = RequestContext::builder()
//!     .uri(Uri::from_static("/items?page=0"))
//!     .build();
//! let err = route.call(&ctx).unwrap_err();
//! assert_eq!(route.status_for(&err).as_u16(), 422);
//! ```
//!
//! ## Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`core`] | Sources, types, errors, security requirements |
//! | [`router`] | Rule validation and path values |
//! | [`extract`] | The request abstraction |
//! | [`binding`] | Signature resolution, schemas and the binder |
//! | [`config`] | Layered configuration |
//! | [`telemetry`] | Logging setup and metrics |

#![doc(html_root_url = "https://docs.rs/heron/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod endpoint;
mod routing;

pub use endpoint::{default_responses, EndpointDescriptor, EndpointRegistry, ResponseSpec};
pub use routing::{ApiRouter, BoundRoute, Handler, RouteOptions};

// Re-export member crates
pub use heron_binding as binding;
pub use heron_config as config;
pub use heron_core as core;
pub use heron_extract as extract;
pub use heron_router as router;
pub use heron_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use heron::prelude::*;
///
/// let router: ApiRouter<()> = ApiRouter::new("health");
/// assert_eq!(router.name(), "health");
/// ```
pub mod prelude {
    pub use crate::{ApiRouter, BoundRoute, EndpointDescriptor, EndpointRegistry, ResponseSpec, RouteOptions};

    pub use heron_binding::{Argument, Arguments, BindingOptions, HandlerSignature, ParamDefault};
    pub use heron_core::{
        BindError, ConfigError, EnumType, ModelField, ModelSchema, ParamSource, SecurityRequirement, TypeDesc,
    };
    pub use heron_extract::{RequestContext, UploadedFile};
}
