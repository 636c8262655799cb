//! Declared parameter types.
//!
//! [`TypeDesc`] is the type a parameter or model field is coerced to. It
//! is an explicit tree: scalars at the leaves, with enums, models and the
//! `Optional` / `List` / `Union` wrappers above them.
//!
//! # Example
//!
//! ```
//! use heron_core::{ModelField, ModelSchema, TypeDesc};
//!
//! let user = ModelSchema::new("User")
//!     .field(ModelField::required("name", TypeDesc::String))
//!     .field(ModelField::required("age", TypeDesc::Integer));
//!
//! let ty = TypeDesc::optional(TypeDesc::list(TypeDesc::model(user)));
//! assert_eq!(ty.structured().map(|m| m.name()), Some("User"));
//! assert!(TypeDesc::optional(TypeDesc::Integer).structured().is_none());
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::source::{Constraints, DefaultValue};

/// A declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDesc {
    /// UTF-8 string.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Floating point number.
    Number,
    /// Boolean.
    Boolean,
    /// Anything, passed through unchanged.
    Any,
    /// An uploaded file. Never coerced.
    File,
    /// One of a fixed set of values.
    Enum(Arc<EnumType>),
    /// A structured object.
    Model(Arc<ModelSchema>),
    /// The inner type or null.
    Optional(Box<TypeDesc>),
    /// A homogeneous list.
    List(Box<TypeDesc>),
    /// The first member that accepts the value.
    Union(Vec<TypeDesc>),
}

impl TypeDesc {
    /// Wraps `inner` as nullable.
    #[must_use]
    pub fn optional(inner: TypeDesc) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// A list of `item`.
    #[must_use]
    pub fn list(item: TypeDesc) -> Self {
        Self::List(Box::new(item))
    }

    /// A structured model.
    #[must_use]
    pub fn model(schema: ModelSchema) -> Self {
        Self::Model(Arc::new(schema))
    }

    /// An enumeration.
    #[must_use]
    pub fn enumeration(ty: EnumType) -> Self {
        Self::Enum(Arc::new(ty))
    }

    /// Finds the structured model this type unwraps to.
    ///
    /// A model is itself. Wrappers are searched argument by argument, one
    /// layer at a time, stopping at the first model found.
    pub fn structured(&self) -> Option<&Arc<ModelSchema>> {
        match self {
            Self::Model(model) => Some(model),
            Self::Optional(inner) | Self::List(inner) => inner.structured(),
            Self::Union(members) => members.iter().find_map(Self::structured),
            _ => None,
        }
    }

    /// Whether null is an acceptable value.
    pub fn accepts_null(&self) -> bool {
        match self {
            Self::Optional(_) | Self::Any => true,
            Self::Union(members) => members.iter().any(Self::accepts_null),
            _ => false,
        }
    }

    /// Whether this is, or wraps, an uploaded file.
    pub fn is_file(&self) -> bool {
        match self {
            Self::File => true,
            Self::Optional(inner) => inner.is_file(),
            _ => false,
        }
    }

    /// Short name used in error messages.
    pub fn name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Any => "any",
            Self::File => "file",
            Self::Enum(e) => e.name(),
            Self::Model(m) => m.name(),
            Self::Optional(inner) => inner.name(),
            Self::List(_) => "list",
            Self::Union(_) => "union",
        }
    }
}

/// An enumeration: named members, each standing for a primitive value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    name: String,
    members: Vec<(String, Value)>,
}

impl EnumType {
    /// Creates an enumeration with no members.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a member.
    #[must_use]
    pub fn member(mut self, label: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.push((label.into(), value.into()));
        self
    }

    /// Enumeration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members as `(label, value)` pairs.
    pub fn members(&self) -> &[(String, Value)] {
        &self.members
    }

    /// Member values, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.members.iter().map(|(_, v)| v)
    }

    /// Finds the member whose value equals `value`.
    ///
    /// A string also matches a numeric or boolean member with the same
    /// textual form, since query and header values always arrive as text.
    pub fn lookup(&self, value: &Value) -> Option<(&str, &Value)> {
        self.members
            .iter()
            .find(|(_, member)| {
                member == value
                    || matches!((member, value), (Value::Number(_) | Value::Bool(_), Value::String(s)) if member.to_string() == *s)
            })
            .map(|(label, member)| (label.as_str(), member))
    }
}

/// A field of a [`ModelSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelField {
    /// Field name.
    pub name: String,
    /// Key read from the JSON object, if different from `name`.
    pub alias: Option<String>,
    /// Field type.
    pub ty: TypeDesc,
    /// Default when the key is missing.
    pub default: DefaultValue,
    /// Value constraints.
    pub constraints: Constraints,
}

impl ModelField {
    /// A field that must be present.
    #[must_use]
    pub fn required(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            alias: None,
            ty,
            default: DefaultValue::Required,
            constraints: Constraints::default(),
        }
    }

    /// A field with a default.
    #[must_use]
    pub fn with_default(name: impl Into<String>, ty: TypeDesc, default: impl Into<Value>) -> Self {
        Self {
            default: DefaultValue::Value(default.into()),
            ..Self::required(name, ty)
        }
    }

    /// Reads the field from `alias` instead of its name.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the field constraints.
    #[must_use]
    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// The JSON key this field is read from.
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A named, ordered set of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    name: String,
    fields: Vec<ModelField>,
}

impl ModelSchema {
    /// Creates an empty model.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: ModelField) -> Self {
        self.fields.push(field);
        self
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[ModelField] {
        &self.fields
    }

    /// Finds a field by name.
    pub fn get(&self, name: &str) -> Option<&ModelField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
