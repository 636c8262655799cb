//! # Heron Extract
//!
//! Read access to the parts of an HTTP request the binder consumes.
//!
//! | Channel | Accessor | Notes |
//! |---------|----------|-------|
//! | Path values | [`RequestContext::path_params`] | Filled by the transport layer |
//! | Query | [`RequestContext::query`] | First occurrence wins |
//! | Headers | [`RequestContext::header`] | Case-insensitive |
//! | Form fields | [`FormData::field`] | urlencoded or multipart |
//! | Files | [`FormData::file`] | multipart only |
//! | JSON | [`RequestContext::json_payload`] | Parsed on demand |
//!
//! Form bodies, urlencoded or multipart, are decoded once by
//! [`RequestContext::read_form`] before binding.
//!
//! ## Example
//!
//! ```rust
//! use heron_extract::RequestContext;
//! use http::{Method, Uri};
//!
//! let ctx = RequestContext::builder()
//!     .method(Method::POST)
//!     .uri(Uri::from_static("/users?page=2&page=3"))
//!     .header("content-type", "application/json")
//!     .body(r#"{"name": "Ada"}"#)
//!     .path_param("org", "acme")
//!     .build();
//!
//! assert_eq!(ctx.query("page"), Some("2"));
//! assert_eq!(ctx.header("Content-Type"), Some("application/json"));
//! assert_eq!(ctx.path_params().get("org"), Some("acme"));
//! assert_eq!(ctx.json_payload().unwrap().unwrap()["name"], "Ada");
//! ```

#![doc(html_root_url = "https://docs.rs/heron-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod form;
mod multipart;

pub use context::{RequestContext, RequestContextBuilder, DEFAULT_MAX_BODY_SIZE};
pub use error::{ExtractionError, ExtractionSource};
pub use form::{FormData, UploadedFile};
pub use multipart::{parse_multipart, MultipartConfig};

// Re-export useful types from dependencies
pub use heron_router::Params;
