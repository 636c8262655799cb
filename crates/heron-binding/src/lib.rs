//! # Heron Binding
//!
//! Turns a declared handler signature into validated call arguments.
//!
//! Registration time, once per route:
//!
//! 1. [`resolve`] flattens a [`HandlerSignature`] and its dependencies into
//!    a [`ResolvedSignature`], classifying each parameter by source.
//! 2. [`AliasTable::new`] records the wire name of every parameter.
//! 3. [`ValidationSchema::synthesize`] builds the full schema, and
//!    [`ValidationSchema::relaxed`] the variant used for GET requests.
//!
//! [`RouteBinding`] bundles these artifacts. Request time,
//! [`RouteBinding::bind`] reads the [`RequestContext`](heron_extract::RequestContext),
//! validates, normalizes enums and returns [`Arguments`].
//!
//! # Example
//!
//! ```rust
//! use heron_binding::{resolve, HandlerSignature, RouteBinding};
//! use heron_core::{ParamSource, TypeDesc};
//! use heron_extract::RequestContext;
//! use http::Uri;
//!
//! let signature = HandlerSignature::new("list_items")
//!     .param("page", TypeDesc::Integer, ParamSource::query(1))
//!     .untyped("q", serde_json::json!(""));
//!
//! let resolved = resolve(&signature, "/items", &[]).unwrap();
//! let binding = RouteBinding::new(resolved, Default::default()).unwrap();
//!
//! let ctx = RequestContext::builder()
//!     .uri(Uri::from_static("/items?page=3"))
//!     .build();
//! let args = binding.bind(&ctx).unwrap();
//! assert_eq!(args.get::<i64>("page").unwrap(), 3);
//! assert_eq!(args.get::<String>("q").unwrap(), "");
//! ```

#![doc(html_root_url = "https://docs.rs/heron-binding/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aliases;
mod arguments;
mod binder;
mod normalize;
mod schema;
mod signature;

pub use aliases::AliasTable;
pub use arguments::{Argument, ArgumentError, Arguments};
pub use binder::{BindingOptions, RouteBinding, FILE_PLACEHOLDER};
pub use normalize::{normalize, Coerced};
pub use schema::{SchemaField, ValidationSchema};
pub use signature::{
    resolve, DeclaredParam, HandlerSignature, ParamDefault, ParamSignature, ResolvedSignature,
};
