//! Wire names per source family.

use heron_core::SourceKind;
use indexmap::IndexMap;

use crate::signature::ResolvedSignature;

/// Binding key to wire name, one map per source family.
///
/// Form and urlencoded-form parameters share the `form` map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    path: IndexMap<String, String>,
    query: IndexMap<String, String>,
    header: IndexMap<String, String>,
    body: IndexMap<String, String>,
    form: IndexMap<String, String>,
    file: IndexMap<String, String>,
}

impl AliasTable {
    /// Builds the table for a resolved signature.
    #[must_use]
    pub fn new(signature: &ResolvedSignature) -> Self {
        let mut table = Self::default();
        for param in signature.iter() {
            table
                .family_mut(param.source.kind())
                .insert(param.name.clone(), param.wire_name().to_string());
        }
        table
    }

    fn family_mut(&mut self, kind: SourceKind) -> &mut IndexMap<String, String> {
        match kind {
            SourceKind::Path => &mut self.path,
            SourceKind::Query => &mut self.query,
            SourceKind::Header => &mut self.header,
            SourceKind::Body => &mut self.body,
            SourceKind::Form | SourceKind::FormEncoded => &mut self.form,
            SourceKind::File => &mut self.file,
        }
    }

    /// The map `kind` belongs to.
    pub fn family(&self, kind: SourceKind) -> &IndexMap<String, String> {
        match kind {
            SourceKind::Path => &self.path,
            SourceKind::Query => &self.query,
            SourceKind::Header => &self.header,
            SourceKind::Body => &self.body,
            SourceKind::Form | SourceKind::FormEncoded => &self.form,
            SourceKind::File => &self.file,
        }
    }

    /// Wire name of `key` read from `kind`.
    pub fn wire_name(&self, kind: SourceKind, key: &str) -> Option<&str> {
        self.family(kind).get(key).map(String::as_str)
    }

    /// `(key, wire name)` pairs of the `kind` family.
    pub fn entries(&self, kind: SourceKind) -> impl Iterator<Item = (&str, &str)> {
        self.family(kind)
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
