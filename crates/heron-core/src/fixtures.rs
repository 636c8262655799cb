//! Sample types for tests and documentation.
//!
//! # Example
//!
//! ```
//! use heron_core::fixtures;
//!
//! let user = fixtures::user_model();
//! assert_eq!(user.name(), "User");
//! assert!(user.get("age").is_some());
//! ```

use crate::source::Constraints;
use crate::types::{EnumType, ModelField, ModelSchema, TypeDesc};

/// `Color`: `"red"`, `"green"`, `"blue"`.
#[must_use]
pub fn color_enum() -> EnumType {
    EnumType::new("Color")
        .member("Red", "red")
        .member("Green", "green")
        .member("Blue", "blue")
}

/// `Priority`: integer-valued `Low = 1`, `High = 2`.
#[must_use]
pub fn priority_enum() -> EnumType {
    EnumType::new("Priority").member("Low", 1).member("High", 2)
}

/// `User { name: string (min length 1), age: integer (>= 0) }`, both required.
#[must_use]
pub fn user_model() -> ModelSchema {
    ModelSchema::new("User")
        .field(ModelField::required("name", TypeDesc::String).constraints(Constraints {
            min_length: Some(1),
            ..Constraints::default()
        }))
        .field(ModelField::required("age", TypeDesc::Integer).constraints(Constraints {
            ge: Some(0.0),
            ..Constraints::default()
        }))
}

/// `Meta { trace: string, priority: Priority = 1, tags: [Color] = [] }`.
#[must_use]
pub fn meta_model() -> ModelSchema {
    ModelSchema::new("Meta")
        .field(ModelField::required("trace", TypeDesc::String))
        .field(ModelField::with_default(
            "priority",
            TypeDesc::enumeration(priority_enum()),
            1,
        ))
        .field(ModelField::with_default(
            "tags",
            TypeDesc::list(TypeDesc::enumeration(color_enum())),
            serde_json::json!([]),
        ))
}

/// `Order { item: string, color: Color, owner: User, note: string? }`.
#[must_use]
pub fn order_model() -> ModelSchema {
    ModelSchema::new("Order")
        .field(ModelField::required("item", TypeDesc::String))
        .field(ModelField::required("color", TypeDesc::enumeration(color_enum())))
        .field(ModelField::required("owner", TypeDesc::model(user_model())))
        .field(ModelField::with_default(
            "note",
            TypeDesc::optional(TypeDesc::String),
            serde_json::Value::Null,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_shape() {
        assert_eq!(color_enum().members().len(), 3);
        assert_eq!(user_model().fields().len(), 2);
        assert_eq!(meta_model().fields().len(), 3);

        let order = order_model();
        let owner = order.get("owner").unwrap();
        assert_eq!(owner.ty.structured().map(|m| m.name()), Some("User"));
    }
}
