//! Conversion of declared types to JSON Schema.
//!
//! Models become component schemas referenced by `$ref`; everything else
//! is inlined. Nullability is written the way the target OpenAPI version
//! expects: `anyOf` with a `null` branch on 3.1, `nullable` on 3.0.

use heron::core::{Constraints, DefaultValue, EnumType, ModelSchema, TypeDesc};
use indexmap::IndexMap;
use serde_json::Value;

use crate::openapi::{Schema, SchemaType};

/// Converts [`TypeDesc`] trees, collecting model schemas as it goes.
#[derive(Debug)]
pub struct SchemaConverter {
    legacy_nullable: bool,
    components: IndexMap<String, Schema>,
}

impl SchemaConverter {
    /// A converter targeting `openapi_version`.
    #[must_use]
    pub fn new(openapi_version: &str) -> Self {
        Self {
            legacy_nullable: openapi_version.starts_with("3.0"),
            components: IndexMap::new(),
        }
    }

    /// Schema for `ty`.
    pub fn convert(&mut self, ty: &TypeDesc) -> Schema {
        match ty {
            TypeDesc::String => Schema::string(),
            TypeDesc::Integer => Schema::integer(),
            TypeDesc::Number => Schema::number(),
            TypeDesc::Boolean => Schema::boolean(),
            TypeDesc::Any => Schema::default(),
            TypeDesc::File => Schema::binary(),
            TypeDesc::Enum(e) => enum_schema(e),
            TypeDesc::Model(model) => self.model(model),
            TypeDesc::List(item) => Schema::array(self.convert(item)),
            TypeDesc::Optional(inner) => {
                let inner = self.convert(inner);
                self.nullable(inner)
            }
            TypeDesc::Union(members) => Schema {
                any_of: members.iter().map(|m| self.convert(m)).collect(),
                ..Schema::default()
            },
        }
    }

    /// Schema for `ty` with `constraints` and `default` applied.
    pub fn convert_constrained(&mut self, ty: &TypeDesc, constraints: &Constraints, default: &DefaultValue) -> Schema {
        let mut schema = self.convert(ty);
        apply_constraints(&mut schema, constraints);
        if let DefaultValue::Value(value) = default {
            schema.default = Some(value.clone());
        }
        schema
    }

    /// Registers `model` as a component and returns a reference to it.
    pub fn model(&mut self, model: &ModelSchema) -> Schema {
        if !self.components.contains_key(model.name()) {
            // placeholder first so self-referencing models terminate
            self.components.insert(model.name().to_string(), Schema::object());
            let schema = self.model_body(model);
            self.components.insert(model.name().to_string(), schema);
        }
        Schema::component(model.name())
    }

    fn model_body(&mut self, model: &ModelSchema) -> Schema {
        let mut schema = Schema {
            title: Some(model.name().to_string()),
            ..Schema::object()
        };
        for field in model.fields() {
            let mut property = self.convert_constrained(&field.ty, &field.constraints, &field.default);
            if property.reference.is_none() && property.title.is_none() {
                property.title = Some(title_case(&field.name));
            }
            schema = schema.property(field.key(), property, field.default.is_required());
        }
        schema
    }

    /// Component schemas collected so far, in first-use order.
    pub fn into_components(self) -> IndexMap<String, Schema> {
        self.components
    }

    fn nullable(&self, inner: Schema) -> Schema {
        if self.legacy_nullable {
            if inner.reference.is_some() {
                return Schema {
                    all_of: vec![inner],
                    nullable: true,
                    ..Schema::default()
                };
            }
            return Schema { nullable: true, ..inner };
        }
        Schema {
            any_of: vec![inner, Schema::of_type(SchemaType::Null)],
            ..Schema::default()
        }
    }
}

fn enum_schema(e: &EnumType) -> Schema {
    let values: Vec<Value> = e.values().cloned().collect();
    let schema_type = if values.iter().all(Value::is_string) {
        Some(SchemaType::String)
    } else if values.iter().all(|v| v.is_i64() || v.is_u64()) {
        Some(SchemaType::Integer)
    } else if values.iter().all(Value::is_number) {
        Some(SchemaType::Number)
    } else {
        None
    };
    Schema {
        schema_type,
        title: Some(e.name().to_string()),
        enum_values: values,
        ..Schema::default()
    }
}

/// Writes `constraints` into `schema`.
///
/// Length bounds become `minItems` / `maxItems` on arrays.
pub fn apply_constraints(schema: &mut Schema, constraints: &Constraints) {
    schema.exclusive_minimum = constraints.gt;
    schema.minimum = constraints.ge;
    schema.exclusive_maximum = constraints.lt;
    schema.maximum = constraints.le;
    let min = constraints.min_length.map(|n| n as u64);
    let max = constraints.max_length.map(|n| n as u64);
    if schema.schema_type == Some(SchemaType::Array) {
        schema.min_items = min;
        schema.max_items = max;
    } else {
        schema.min_length = min;
        schema.max_length = max;
    }
    schema.pattern.clone_from(&constraints.pattern);
}

/// `user_id` → `User Id`.
pub(crate) fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
