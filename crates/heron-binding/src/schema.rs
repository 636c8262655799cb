//! Validation schemas.
//!
//! A [`ValidationSchema`] lists every parameter of a route with its type,
//! default, constraints and source, and validates a working set of raw
//! values against them. Coercion is lax, since path, query, header and
//! form values always arrive as text: `"3"` is a valid integer, `"true"` a
//! valid boolean, and `7` a valid string.
//!
//! Each route has two variants. The full one checks everything; the
//! relaxed one, used for GET requests, passes body parameters through
//! unchecked since GET never reads a body.

use std::collections::HashMap;
use std::sync::Arc;

use heron_core::{
    ConfigError, ConfigResult, Constraints, DefaultValue, EnumType, FieldError, ModelSchema,
    SourceKind, TypeDesc, ValidationErrors,
};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Value};

use crate::normalize::Coerced;
use crate::signature::ResolvedSignature;

/// One parameter of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Binding key.
    pub key: String,
    /// Target type.
    pub ty: TypeDesc,
    /// Default when absent.
    pub default: DefaultValue,
    /// Constraints on the coerced value.
    pub constraints: Constraints,
    /// Source the value was read from.
    pub source: SourceKind,
}

/// Per-route validation schema.
#[derive(Debug, Clone)]
pub struct ValidationSchema {
    name: String,
    fields: IndexMap<String, SchemaField>,
    body_relaxed: bool,
    patterns: Arc<HashMap<String, Regex>>,
}

fn compile_pattern(
    patterns: &mut HashMap<String, Regex>,
    field: &str,
    pattern: &str,
) -> ConfigResult<()> {
    if patterns.contains_key(pattern) {
        return Ok(());
    }
    let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        field: field.to_string(),
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    patterns.insert(pattern.to_string(), regex);
    Ok(())
}

fn compile_type_patterns(patterns: &mut HashMap<String, Regex>, ty: &TypeDesc) -> ConfigResult<()> {
    match ty {
        TypeDesc::Model(model) => {
            for field in model.fields() {
                if let Some(pattern) = &field.constraints.pattern {
                    compile_pattern(patterns, &format!("{}.{}", model.name(), field.name), pattern)?;
                }
                compile_type_patterns(patterns, &field.ty)?;
            }
            Ok(())
        }
        TypeDesc::Optional(inner) | TypeDesc::List(inner) => compile_type_patterns(patterns, inner),
        TypeDesc::Union(members) => members
            .iter()
            .try_for_each(|member| compile_type_patterns(patterns, member)),
        _ => Ok(()),
    }
}

impl ValidationSchema {
    /// Builds the full schema for a resolved signature.
    ///
    /// Every `pattern` constraint, including those of nested model fields,
    /// is compiled here.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPattern`] if a pattern does not compile.
    pub fn synthesize(name: impl Into<String>, signature: &ResolvedSignature) -> ConfigResult<Self> {
        let mut patterns = HashMap::new();
        let mut fields = IndexMap::new();

        for param in signature.iter() {
            let constraints = param.source.constraints().clone();
            if let Some(pattern) = &constraints.pattern {
                compile_pattern(&mut patterns, &param.name, pattern)?;
            }
            compile_type_patterns(&mut patterns, &param.ty)?;

            fields.insert(
                param.name.clone(),
                SchemaField {
                    key: param.name.clone(),
                    ty: param.ty.clone(),
                    default: param.source.default_value().clone(),
                    constraints,
                    source: param.source.kind(),
                },
            );
        }

        Ok(Self {
            name: name.into(),
            fields,
            body_relaxed: false,
            patterns: Arc::new(patterns),
        })
    }

    /// The GET variant: an independent copy with body checks disabled.
    #[must_use]
    pub fn relaxed(&self) -> Self {
        Self {
            name: format!("{}_no_Body", self.name),
            fields: self.fields.clone(),
            body_relaxed: true,
            patterns: Arc::clone(&self.patterns),
        }
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether body checks are disabled.
    pub fn is_relaxed(&self) -> bool {
        self.body_relaxed
    }

    /// Fields in parameter order.
    pub fn fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.values()
    }

    /// Looks up a field.
    pub fn get(&self, key: &str) -> Option<&SchemaField> {
        self.fields.get(key)
    }

    /// Whether `key` is declared.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Validates and coerces `working`. Keys not declared are ignored.
    ///
    /// # Errors
    ///
    /// Every failing value, each located by binding key and then nested
    /// field name or list index.
    pub fn validate(&self, working: &IndexMap<String, Value>) -> Result<IndexMap<String, Coerced>, ValidationErrors> {
        let mut validator = Validator::new(&self.patterns);
        let mut out = IndexMap::with_capacity(self.fields.len());
        let no_constraints = Constraints::default();

        for field in self.fields.values() {
            let value = working.get(&field.key);

            if self.body_relaxed && field.source == SourceKind::Body {
                out.insert(field.key.clone(), Coerced::Value(value.cloned().unwrap_or(Value::Null)));
                continue;
            }

            let loc = vec![field.key.clone()];
            // only presence is checked for uploads; the file is attached after validation
            let (ty, constraints) = if field.source == SourceKind::File {
                (&TypeDesc::Any, &no_constraints)
            } else {
                (&field.ty, &field.constraints)
            };
            if let Some(coerced) = validator.field(&loc, ty, &field.default, constraints, value) {
                out.insert(field.key.clone(), coerced);
            }
        }

        if validator.errors.is_empty() {
            Ok(out)
        } else {
            Err(validator.errors.into())
        }
    }
}

fn child(loc: &[String], segment: impl Into<String>) -> Vec<String> {
    let mut next = loc.to_vec();
    next.push(segment.into());
    next
}

fn format_bound(bound: f64) -> String {
    // 3.0 prints as "3"
    format!("{bound}")
}

struct Validator<'a> {
    patterns: &'a HashMap<String, Regex>,
    errors: Vec<FieldError>,
}

impl<'a> Validator<'a> {
    fn new(patterns: &'a HashMap<String, Regex>) -> Self {
        Self {
            patterns,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, loc: &[String], msg: impl Into<String>, kind: &str) -> Option<Coerced> {
        self.errors.push(FieldError::new(loc.to_vec(), msg, kind));
        None
    }

    /// A value that may be absent or null, with its default.
    fn field(
        &mut self,
        loc: &[String],
        ty: &TypeDesc,
        default: &DefaultValue,
        constraints: &Constraints,
        value: Option<&Value>,
    ) -> Option<Coerced> {
        match (value, default) {
            (None, DefaultValue::Required) => {
                self.errors.push(FieldError::missing(loc.to_vec()));
                None
            }
            (None, DefaultValue::Value(v)) => Some(Coerced::Value(v.clone())),
            (Some(Value::Null), DefaultValue::Value(Value::Null)) => Some(Coerced::Value(Value::Null)),
            (Some(v), _) => self.coerce(loc, ty, constraints, v),
        }
    }

    fn coerce(&mut self, loc: &[String], ty: &TypeDesc, constraints: &Constraints, value: &Value) -> Option<Coerced> {
        if value.is_null() {
            if ty.accepts_null() {
                return Some(Coerced::Value(Value::Null));
            }
            self.errors.push(FieldError::none_not_allowed(loc.to_vec()));
            return None;
        }

        match ty {
            TypeDesc::Any | TypeDesc::File => Some(Coerced::Value(value.clone())),
            TypeDesc::String => self.string(loc, constraints, value),
            TypeDesc::Integer => self.integer(loc, constraints, value),
            TypeDesc::Number => self.number(loc, constraints, value),
            TypeDesc::Boolean => self.boolean(loc, value),
            TypeDesc::Enum(enumeration) => self.enumeration(loc, enumeration, value),
            TypeDesc::Model(model) => self.model(loc, model, value),
            TypeDesc::Optional(inner) => self.coerce(loc, inner, constraints, value),
            TypeDesc::List(item) => self.list(loc, item, constraints, value),
            TypeDesc::Union(members) => self.union(loc, members, constraints, value),
        }
    }

    fn string(&mut self, loc: &[String], constraints: &Constraints, value: &Value) -> Option<Coerced> {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return self.fail(loc, "str type expected", "type_error.str"),
        };

        let len = text.chars().count();
        if let Some(min) = constraints.min_length {
            if len < min {
                return self.fail(
                    loc,
                    format!("ensure this value has at least {min} characters"),
                    "value_error.any_str.min_length",
                );
            }
        }
        if let Some(max) = constraints.max_length {
            if len > max {
                return self.fail(
                    loc,
                    format!("ensure this value has at most {max} characters"),
                    "value_error.any_str.max_length",
                );
            }
        }
        if let Some(pattern) = &constraints.pattern {
            let matched = self
                .patterns
                .get(pattern)
                .and_then(|re| re.find(&text))
                .is_some_and(|m| m.start() == 0);
            if !matched {
                return self.fail(
                    loc,
                    format!("string does not match regex \"{pattern}\""),
                    "value_error.str.regex",
                );
            }
        }

        Some(Coerced::Value(Value::String(text)))
    }

    fn bounds(&mut self, loc: &[String], constraints: &Constraints, n: f64) -> bool {
        let checks = [
            (constraints.gt, n > constraints.gt.unwrap_or(f64::NEG_INFINITY), "greater than", "not_gt"),
            (constraints.ge, n >= constraints.ge.unwrap_or(f64::NEG_INFINITY), "greater than or equal to", "not_ge"),
            (constraints.lt, n < constraints.lt.unwrap_or(f64::INFINITY), "less than", "not_lt"),
            (constraints.le, n <= constraints.le.unwrap_or(f64::INFINITY), "less than or equal to", "not_le"),
        ];

        for (bound, ok, phrase, kind) in checks {
            if let (Some(bound), false) = (bound, ok) {
                self.errors.push(FieldError::new(
                    loc.to_vec(),
                    format!("ensure this value is {phrase} {}", format_bound(bound)),
                    format!("value_error.number.{kind}"),
                ));
                return false;
            }
        }
        true
    }

    fn integer(&mut self, loc: &[String], constraints: &Constraints, value: &Value) -> Option<Coerced> {
        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        };

        let Some(n) = parsed else {
            return self.fail(loc, "value is not a valid integer", "type_error.integer");
        };
        self.bounds(loc, constraints, n as f64)
            .then(|| Coerced::Value(json!(n)))
    }

    fn number(&mut self, loc: &[String], constraints: &Constraints, value: &Value) -> Option<Coerced> {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|f| f.is_finite());

        let Some(n) = parsed else {
            return self.fail(loc, "value is not a valid float", "type_error.float");
        };
        if !self.bounds(loc, constraints, n) {
            return None;
        }
        // keep integers integral
        match value {
            Value::Number(original) => Some(Coerced::Value(Value::Number(original.clone()))),
            _ => Some(Coerced::Value(json!(n))),
        }
    }

    fn boolean(&mut self, loc: &[String], value: &Value) -> Option<Coerced> {
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
                "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
                _ => None,
            },
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            _ => None,
        };

        match parsed {
            Some(b) => Some(Coerced::Value(Value::Bool(b))),
            None => self.fail(loc, "value could not be parsed to a boolean", "type_error.bool"),
        }
    }

    fn enumeration(&mut self, loc: &[String], enumeration: &EnumType, value: &Value) -> Option<Coerced> {
        if let Some((label, member)) = enumeration.lookup(value) {
            return Some(Coerced::Enum {
                ty: enumeration.name().to_string(),
                label: label.to_string(),
                value: member.clone(),
            });
        }

        let permitted = enumeration
            .values()
            .map(|v| match v {
                Value::String(s) => format!("'{s}'"),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        self.fail(
            loc,
            format!("value is not a valid enumeration member; permitted: {permitted}"),
            "type_error.enum",
        )
    }

    fn model(&mut self, loc: &[String], model: &ModelSchema, value: &Value) -> Option<Coerced> {
        let Value::Object(object) = value else {
            return self.fail(loc, "value is not a valid dict", "type_error.dict");
        };

        let before = self.errors.len();
        let mut fields = IndexMap::with_capacity(model.fields().len());
        for field in model.fields() {
            let field_loc = child(loc, field.key());
            if let Some(coerced) = self.field(&field_loc, &field.ty, &field.default, &field.constraints, object.get(field.key())) {
                fields.insert(field.name.clone(), coerced);
            }
        }

        (self.errors.len() == before).then_some(Coerced::Model(fields))
    }

    fn list(&mut self, loc: &[String], item: &TypeDesc, constraints: &Constraints, value: &Value) -> Option<Coerced> {
        let Value::Array(items) = value else {
            return self.fail(loc, "value is not a valid list", "type_error.list");
        };

        if let Some(min) = constraints.min_length {
            if items.len() < min {
                return self.fail(
                    loc,
                    format!("ensure this value has at least {min} items"),
                    "value_error.list.min_items",
                );
            }
        }
        if let Some(max) = constraints.max_length {
            if items.len() > max {
                return self.fail(
                    loc,
                    format!("ensure this value has at most {max} items"),
                    "value_error.list.max_items",
                );
            }
        }

        let before = self.errors.len();
        let none = Constraints::default();
        let coerced: Vec<Coerced> = items
            .iter()
            .enumerate()
            .filter_map(|(i, v)| self.coerce(&child(loc, i.to_string()), item, &none, v))
            .collect();

        (self.errors.len() == before).then_some(Coerced::List(coerced))
    }

    fn union(&mut self, loc: &[String], members: &[TypeDesc], constraints: &Constraints, value: &Value) -> Option<Coerced> {
        let mut failures = Vec::new();
        for member in members {
            let mut trial = Validator::new(self.patterns);
            match trial.coerce(loc, member, constraints, value) {
                Some(coerced) if trial.errors.is_empty() => return Some(coerced),
                _ => failures.extend(trial.errors),
            }
        }
        self.errors.extend(failures);
        None
    }
}
