//! Validated values and enum normalization.
//!
//! Validation produces a [`Coerced`] tree that still remembers which
//! values matched an enumeration member. Handlers receive plain JSON, so
//! [`normalize`] replaces every member by its underlying value, at any
//! depth.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A validated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// A plain value.
    Value(Value),
    /// An enumeration member.
    Enum {
        /// Enumeration name.
        ty: String,
        /// Member label.
        label: String,
        /// Underlying value.
        value: Value,
    },
    /// A validated model, by field name.
    Model(IndexMap<String, Coerced>),
    /// A validated list.
    List(Vec<Coerced>),
}

impl Coerced {
    /// Whether this is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }
}

impl From<Value> for Coerced {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Converts a validated value into plain JSON, replacing enumeration
/// members by their values.
pub fn normalize(value: Coerced) -> Value {
    match value {
        Coerced::Value(v) => v,
        Coerced::Enum { value, .. } => value,
        Coerced::Model(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .collect::<Map<String, Value>>(),
        ),
        Coerced::List(items) => Value::Array(items.into_iter().map(normalize).collect()),
    }
}
