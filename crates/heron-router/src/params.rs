//! Path values matched by the transport layer.

use smallvec::SmallVec;

/// Values stored inline before spilling to the heap.
const INLINE_VALUES: usize = 4;

/// Raw path values for one request, in rule order.
///
/// The transport layer fills this after matching a rule such as
/// `/users/<id>`; the binder seeds its working set from it. Values are kept
/// as the raw strings that appeared in the URL and are coerced later.
///
/// # Example
///
/// ```rust
/// use heron_router::Params;
///
/// let params: Params = [("org", "acme"), ("id", "42")].into_iter().collect();
///
/// assert_eq!(params.get("id"), Some("42"));
/// assert!(params.contains("org"));
/// assert_eq!(params.names().collect::<Vec<_>>(), ["org", "id"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    values: SmallVec<[(String, String); INLINE_VALUES]>,
}

impl Params {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value. A later value for an existing name replaces it.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// Returns the raw value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a value was matched for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(n, _)| n == name)
    }

    /// Number of matched values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(name, value)` pairs in rule order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Iterates matched names in rule order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}
