//! Multipart form parsing.
//!
//! The whole body is already buffered, so it is fed to `multer` as a
//! single-chunk stream and every part is read into memory: text parts
//! become form fields, parts with a file name become [`UploadedFile`]s.

use std::io;

use bytes::Bytes;
use http::{header, HeaderMap};

use crate::{ExtractionError, ExtractionSource, FormData, UploadedFile};

/// Default maximum total body size for multipart (50 MB).
pub const DEFAULT_MULTIPART_MAX_BODY_SIZE: usize = 50 * 1024 * 1024;

/// Default maximum size per part (10 MB).
pub const DEFAULT_MAX_FIELD_SIZE: usize = 10 * 1024 * 1024;

/// Limits applied while parsing.
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Maximum total body size in bytes.
    pub max_body_size: usize,
    /// Maximum size per part in bytes.
    pub max_field_size: usize,
    /// Maximum number of parts.
    pub max_fields: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MULTIPART_MAX_BODY_SIZE,
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
            max_fields: 100,
        }
    }
}

impl MultipartConfig {
    /// Sets the maximum body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Sets the maximum part size.
    #[must_use]
    pub fn max_field_size(mut self, size: usize) -> Self {
        self.max_field_size = size;
        self
    }

    /// Sets the maximum number of parts.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }
}

fn malformed(details: impl Into<String>) -> ExtractionError {
    ExtractionError::malformed(ExtractionSource::Multipart, details)
}

/// Parses a `multipart/form-data` body into fields and files.
///
/// # Errors
///
/// - the Content-Type header is missing or has no boundary
/// - the body, a part, or the part count exceeds `config`
/// - the body is not valid multipart, or a text part is not UTF-8
pub async fn parse_multipart(
    headers: &HeaderMap,
    body: Bytes,
    config: &MultipartConfig,
) -> Result<FormData, ExtractionError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .ok_or_else(|| ExtractionError::invalid_content_type("missing Content-Type header"))?
        .to_str()
        .map_err(|_| ExtractionError::invalid_content_type("invalid UTF-8 in Content-Type header"))?;

    let boundary = multer::parse_boundary(content_type).map_err(|_| {
        ExtractionError::invalid_content_type("missing or invalid boundary in multipart Content-Type")
    })?;

    if body.len() > config.max_body_size {
        return Err(ExtractionError::payload_too_large(
            ExtractionSource::Multipart,
            config.max_body_size,
            body.len(),
        ));
    }

    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);
    let mut form = FormData::new();
    let mut count = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| malformed(e.to_string()))?
    {
        count += 1;
        if count > config.max_fields {
            return Err(malformed(format!("too many parts (max {})", config.max_fields)));
        }

        // Unnamed parts cannot be bound to anything.
        let Some(name) = field.name().map(String::from) else {
            continue;
        };
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field.bytes().await.map_err(|e| malformed(e.to_string()))?;

        if data.len() > config.max_field_size {
            return Err(ExtractionError::payload_too_large(
                ExtractionSource::Multipart,
                config.max_field_size,
                data.len(),
            ));
        }

        if file_name.is_some() {
            form.push_file(UploadedFile::new(name, file_name, content_type, data));
        } else {
            let text = String::from_utf8(data.to_vec())
                .map_err(|e| malformed(format!("part '{name}' is not valid UTF-8: {e}")))?;
            form.push_field(name, text);
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    const BOUNDARY: &str = "X-HERON-BOUNDARY";

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={BOUNDARY}")).unwrap(),
        );
        headers
    }

    fn body() -> Bytes {
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             Quarterly report\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"doc\"; filename=\"q3.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             numbers go here\r\n\
             --{b}--\r\n",
            b = BOUNDARY
        );
        Bytes::from(body)
    }

    #[tokio::test]
    async fn test_parse_fields_and_files() {
        let form = parse_multipart(&headers(), body(), &MultipartConfig::default())
            .await
            .unwrap();

        assert_eq!(form.field("title"), Some("Quarterly report"));
        let doc = form.file("doc").unwrap();
        assert_eq!(doc.file_name(), Some("q3.txt"));
        assert_eq!(doc.content_type(), Some("text/plain"));
        assert_eq!(doc.data().as_ref(), b"numbers go here");
        // files are not text fields
        assert_eq!(form.field("doc"), None);
    }

    #[tokio::test]
    async fn test_missing_boundary() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("multipart/form-data"));
        let err = parse_multipart(&headers, body(), &MultipartConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.extraction_source(), ExtractionSource::ContentType);
    }

    #[tokio::test]
    async fn test_limits() {
        let config = MultipartConfig::default().max_body_size(10);
        let err = parse_multipart(&headers(), body(), &config).await.unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::PAYLOAD_TOO_LARGE);

        let config = MultipartConfig::default().max_fields(1);
        assert!(parse_multipart(&headers(), body(), &config).await.is_err());

        let config = MultipartConfig::default().max_field_size(5);
        assert!(parse_multipart(&headers(), body(), &config).await.is_err());
    }
}
