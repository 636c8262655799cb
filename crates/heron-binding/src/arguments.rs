//! Bound call arguments.

use heron_extract::UploadedFile;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// One bound argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A validated, normalized value.
    Value(Value),
    /// An uploaded file.
    File(UploadedFile),
}

impl Argument {
    /// The value, unless this is a file.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::File(_) => None,
        }
    }

    /// The file, if this is one.
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(f) => Some(f),
            Self::Value(_) => None,
        }
    }
}

/// Error reading an argument.
#[derive(Debug, Error)]
pub enum ArgumentError {
    /// No argument under this name.
    #[error("no argument named '{name}'")]
    Missing {
        /// Requested name.
        name: String,
    },

    /// The argument is a file.
    #[error("argument '{name}' is a file, not a value")]
    NotAValue {
        /// Requested name.
        name: String,
    },

    /// The value does not deserialize into the requested type.
    #[error("argument '{name}' has an unexpected shape: {source}")]
    Deserialize {
        /// Requested name.
        name: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Arguments for one handler call, by binding key, in parameter order.
///
/// # Example
///
/// ```rust
/// use heron_binding::{Argument, Arguments};
/// use serde_json::json;
///
/// let args: Arguments = [("page".to_string(), Argument::Value(json!(2)))]
///     .into_iter()
///     .collect();
/// assert_eq!(args.get::<u32>("page").unwrap(), 2);
/// assert!(args.get::<u32>("size").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(IndexMap<String, Argument>);

impl Arguments {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, argument: Argument) {
        self.0.insert(key.into(), argument);
    }

    /// Deserializes the value under `name`.
    ///
    /// # Errors
    ///
    /// Fails if the argument is absent, is a file, or has another shape.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        let value = self.value(name).ok_or_else(|| match self.0.get(name) {
            Some(_) => ArgumentError::NotAValue {
                name: name.to_string(),
            },
            None => ArgumentError::Missing {
                name: name.to_string(),
            },
        })?;
        T::deserialize(value).map_err(|source| ArgumentError::Deserialize {
            name: name.to_string(),
            source,
        })
    }

    /// Raw value under `name`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.0.get(name).and_then(Argument::as_value)
    }

    /// File under `name`.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.0.get(name).and_then(Argument::as_file)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are none.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Binding keys in parameter order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(key, argument)` pairs in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Argument)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Values only, as a JSON object. Files are left out.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .filter_map(|(k, v)| v.as_value().map(|v| (k.clone(), v.clone())))
                .collect(),
        )
    }
}

impl FromIterator<(String, Argument)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Argument)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde::Deserialize;
    use serde_json::json;

    fn sample() -> Arguments {
        let mut args = Arguments::new();
        args.insert("id", Argument::Value(json!(7)));
        args.insert("user", Argument::Value(json!({"name": "a", "age": 3})));
        args.insert(
            "avatar",
            Argument::File(UploadedFile::new("avatar", Some("a.png".into()), None, Bytes::from_static(b"png"))),
        );
        args
    }

    #[test]
    fn test_typed_get() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            name: String,
            age: u8,
        }

        let args = sample();
        assert_eq!(args.get::<i64>("id").unwrap(), 7);
        assert_eq!(
            args.get::<User>("user").unwrap(),
            User {
                name: "a".to_string(),
                age: 3
            }
        );
    }

    #[test]
    fn test_get_errors() {
        let args = sample();
        assert!(matches!(args.get::<i64>("nope"), Err(ArgumentError::Missing { .. })));
        assert!(matches!(args.get::<i64>("avatar"), Err(ArgumentError::NotAValue { .. })));
        assert!(matches!(args.get::<String>("id"), Err(ArgumentError::Deserialize { .. })));
    }

    #[test]
    fn test_files_and_order() {
        let args = sample();
        assert_eq!(args.file("avatar").unwrap().data().as_ref(), b"png");
        assert!(args.file("id").is_none());
        assert_eq!(args.keys().collect::<Vec<_>>(), ["id", "user", "avatar"]);
        assert_eq!(args.to_json(), json!({"id": 7, "user": {"name": "a", "age": 3}}));
    }
}
