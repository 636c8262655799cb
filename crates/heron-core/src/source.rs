//! Parameter sources.
//!
//! A [`ParamSource`] says which request channel supplies a handler
//! parameter, what happens when the value is missing, the wire name it is
//! read under, and the constraints the value must satisfy.
//!
//! # Example
//!
//! ```
//! use heron_core::{ParamSource, SourceKind};
//!
//! let page = ParamSource::query(1).alias("p").ge(1.0).description("Page number");
//! assert_eq!(page.kind(), SourceKind::Query);
//! assert_eq!(page.wire_name("page"), "p");
//! assert!(!page.is_required());
//!
//! let token = ParamSource::header_required().alias("X-Token");
//! assert!(token.is_required());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ModelSchema;

/// The request channel a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A placeholder in the route rule.
    Path,
    /// A query-string parameter.
    Query,
    /// A request header.
    Header,
    /// The JSON payload, or a key of it.
    Body,
    /// A multipart form field.
    Form,
    /// A urlencoded form field.
    FormEncoded,
    /// An uploaded file.
    File,
}

impl SourceKind {
    /// Sources read from the form channel of a body-carrying request.
    #[must_use]
    pub const fn is_form_family(self) -> bool {
        matches!(self, Self::Form | Self::FormEncoded | Self::File)
    }

    /// Lowercase name, as used in documentation `in` fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
            Self::Form => "form",
            Self::FormEncoded => "form_encoded",
            Self::File => "file",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default of a parameter or model field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// Absence is a validation error.
    Required,
    /// Absence binds this value.
    Value(Value),
}

impl DefaultValue {
    /// Whether absence is an error.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    /// The concrete default, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Required => None,
            Self::Value(v) => Some(v),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Value constraints, checked after coercion.
///
/// Numeric bounds apply to integers and numbers; length bounds apply to
/// strings and lists; `pattern` applies to strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Exclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    /// Inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ge: Option<f64>,
    /// Exclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    /// Inclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub le: Option<f64>,
    /// Minimum length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression a string must match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Constraints {
    /// Whether no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A parameter's source, default, wire name and constraints.
///
/// Build one with a per-source constructor and chain the builder methods.
/// Constructors taking a value produce an optional parameter with that
/// default; the `*_required` forms produce a required one.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSource {
    kind: SourceKind,
    default: DefaultValue,
    alias: Option<String>,
    title: Option<String>,
    description: Option<String>,
    example: Option<Value>,
    deprecated: bool,
    constraints: Constraints,
    model: Option<Arc<ModelSchema>>,
}

macro_rules! source_constructors {
    ($($(#[$doc:meta])* $kind:ident => $optional:ident, $required:ident;)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $optional(default: impl Into<Value>) -> Self {
                Self::new(SourceKind::$kind, DefaultValue::Value(default.into()))
            }

            $(#[$doc])*
            /// Absence is a validation error.
            #[must_use]
            pub fn $required() -> Self {
                Self::new(SourceKind::$kind, DefaultValue::Required)
            }
        )*
    };
}

impl ParamSource {
    /// Creates a source of `kind` with `default`.
    #[must_use]
    pub fn new(kind: SourceKind, default: DefaultValue) -> Self {
        Self {
            kind,
            default,
            alias: None,
            title: None,
            description: None,
            example: None,
            deprecated: false,
            constraints: Constraints::default(),
            model: None,
        }
    }

    source_constructors! {
        /// A path placeholder parameter.
        Path => path, path_required;
        /// A query-string parameter.
        Query => query, query_required;
        /// A header parameter.
        Header => header, header_required;
        /// A JSON body parameter.
        Body => body, body_required;
        /// A multipart form field.
        Form => form, form_required;
        /// A urlencoded form field.
        FormEncoded => form_encoded, form_encoded_required;
        /// An uploaded file.
        File => file, file_required;
    }

    /// Sets the wire name the value is read under.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the documentation title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the documentation description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets an example value for documentation.
    pub fn example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Marks the parameter deprecated in documentation.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Value must be greater than `bound`.
    pub fn gt(mut self, bound: f64) -> Self {
        self.constraints.gt = Some(bound);
        self
    }

    /// Value must be greater than or equal to `bound`.
    pub fn ge(mut self, bound: f64) -> Self {
        self.constraints.ge = Some(bound);
        self
    }

    /// Value must be less than `bound`.
    pub fn lt(mut self, bound: f64) -> Self {
        self.constraints.lt = Some(bound);
        self
    }

    /// Value must be less than or equal to `bound`.
    pub fn le(mut self, bound: f64) -> Self {
        self.constraints.le = Some(bound);
        self
    }

    /// Minimum string or list length.
    pub fn min_length(mut self, len: usize) -> Self {
        self.constraints.min_length = Some(len);
        self
    }

    /// Maximum string or list length.
    pub fn max_length(mut self, len: usize) -> Self {
        self.constraints.max_length = Some(len);
        self
    }

    /// Regular expression a string value must match.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    /// Re-homes this parameter on a path placeholder.
    ///
    /// Only the default survives; alias, metadata and constraints are
    /// dropped because the placeholder name is the wire name.
    #[must_use]
    pub fn into_path(self) -> Self {
        Self::new(SourceKind::Path, self.default)
    }

    /// Re-homes this parameter on the JSON body, carrying `model`.
    ///
    /// Default, alias, metadata and constraints are kept.
    #[must_use]
    pub fn into_body(mut self, model: Option<Arc<ModelSchema>>) -> Self {
        self.kind = SourceKind::Body;
        self.model = model;
        self
    }

    /// The channel this parameter is read from.
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /// The default.
    pub const fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    /// Whether absence is an error.
    pub const fn is_required(&self) -> bool {
        self.default.is_required()
    }

    /// The declared alias, if any.
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The name the value is read under: the alias, else `key`.
    pub fn wire_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.alias.as_deref().unwrap_or(key)
    }

    /// Documentation title.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Documentation description.
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Documentation example.
    pub const fn example_value(&self) -> Option<&Value> {
        self.example.as_ref()
    }

    /// Whether documentation marks this deprecated.
    pub const fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Value constraints.
    pub const fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Nested model carried by a Body source.
    pub const fn model(&self) -> Option<&Arc<ModelSchema>> {
        self.model.as_ref()
    }
}
