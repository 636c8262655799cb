//! Form fields and uploaded files.

use bytes::Bytes;

use crate::{ExtractionError, ExtractionSource};

/// A file uploaded through a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    field_name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl UploadedFile {
    /// Creates an uploaded file.
    #[must_use]
    pub fn new(
        field_name: impl Into<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name,
            content_type,
            data: data.into(),
        }
    }

    /// The form field it was uploaded under.
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The client-side file name.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The declared MIME type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// File contents.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Extension of the client-side file name.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
    }
}

/// Text fields and files of a form body.
///
/// Lookups return the first occurrence of a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<UploadedFile>,
}

impl FormData {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    ///
    /// Fails if the body is not valid urlencoded text.
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, ExtractionError> {
        let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| ExtractionError::malformed(ExtractionSource::Form, e.to_string()))?;
        Ok(Self {
            fields,
            files: Vec::new(),
        })
    }

    /// Appends a text field.
    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Appends a file.
    pub fn push_file(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    /// First text value for `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First file uploaded under `name`.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field_name == name)
    }

    /// All text fields.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// All files.
    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Whether the form has neither fields nor files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }
}
