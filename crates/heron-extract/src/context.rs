//! The request as seen by the binder.

use bytes::Bytes;
use heron_router::Params;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, Uri};
use serde_json::Value;

use crate::multipart::{parse_multipart, MultipartConfig};
use crate::{ExtractionError, ExtractionSource, FormData, UploadedFile};

/// Default maximum JSON payload size (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Read access to every request channel the binder consumes.
///
/// Query pairs are decoded once at construction. Form bodies are decoded
/// by [`read_form`](Self::read_form), which must run before binding on
/// body-carrying requests; the JSON payload is parsed on demand.
///
/// # Example
///
/// ```rust
/// use heron_extract::RequestContext;
/// use http::{Method, Uri};
///
/// let ctx = RequestContext::builder()
///     .method(Method::GET)
///     .uri(Uri::from_static("/items/7?sort=asc"))
///     .path_param("id", "7")
///     .build();
///
/// assert_eq!(ctx.path(), "/items/7");
/// assert_eq!(ctx.query("sort"), Some("asc"));
/// assert_eq!(ctx.path_params().get("id"), Some("7"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
    query: Vec<(String, String)>,
    form: FormData,
    max_body_size: usize,
}

impl RequestContext {
    /// Creates a context from request parts.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes, path_params: Params) -> Self {
        let query = uri
            .query()
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();
        Self {
            method,
            uri,
            headers,
            body,
            path_params,
            query,
            form: FormData::new(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The path portion of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Values matched from the route rule.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    /// First query value for `name`.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value as text; lookup is case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The media type of the body, without parameters.
    #[must_use]
    pub fn media_type(&self) -> Option<mime::Mime> {
        self.header(CONTENT_TYPE.as_str())
            .and_then(|v| v.parse::<mime::Mime>().ok())
    }

    /// The raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decoded form fields and files.
    #[must_use]
    pub fn form(&self) -> &FormData {
        &self.form
    }

    /// Decodes the body as a form if its Content-Type is urlencoded or
    /// multipart. Other bodies are left alone.
    ///
    /// # Errors
    ///
    /// Fails if the body is a malformed form or exceeds `config`.
    pub async fn read_form(&mut self, config: &MultipartConfig) -> Result<(), ExtractionError> {
        let Some(media) = self.media_type() else {
            return Ok(());
        };

        if media.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
            self.form = FormData::from_urlencoded(&self.body)?;
        } else if media.type_() == mime::MULTIPART && media.subtype() == mime::FORM_DATA {
            self.form = parse_multipart(&self.headers, self.body.clone(), config).await?;
        }
        Ok(())
    }

    /// Parses the body as JSON.
    ///
    /// Returns `None` for an empty body or a form body.
    ///
    /// # Errors
    ///
    /// Fails if the body is too large or is not valid JSON.
    pub fn json_payload(&self) -> Result<Option<Value>, ExtractionError> {
        if self.body.is_empty() {
            return Ok(None);
        }
        if let Some(media) = self.media_type() {
            if media.type_() == mime::MULTIPART
                || media.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str()
            {
                return Ok(None);
            }
        }
        if self.body.len() > self.max_body_size {
            return Err(ExtractionError::payload_too_large(
                ExtractionSource::Json,
                self.max_body_size,
                self.body.len(),
            ));
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| ExtractionError::malformed(ExtractionSource::Json, e.to_string()))
    }
}

/// Builder for [`RequestContext`].
///
/// Method defaults to GET and URI to `/`.
#[derive(Debug, Default)]
pub struct RequestContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
    form: FormData,
    max_body_size: Option<usize>,
}

impl RequestContextBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI.
    #[must_use]
    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = Some(uri);
        self
    }

    /// Sets the headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and its Content-Type.
    #[must_use]
    pub fn json(self, value: &Value) -> Self {
        self.header(CONTENT_TYPE.as_str(), mime::APPLICATION_JSON.as_ref())
            .body(value.to_string())
    }

    /// Sets the path values.
    #[must_use]
    pub fn path_params(mut self, params: Params) -> Self {
        self.path_params = params;
        self
    }

    /// Adds a path value.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Adds an already-decoded form field.
    #[must_use]
    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push_field(name, value);
        self
    }

    /// Adds an already-decoded uploaded file.
    #[must_use]
    pub fn file(mut self, file: UploadedFile) -> Self {
        self.form.push_file(file);
        self
    }

    /// Limits the JSON payload size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = Some(size);
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> RequestContext {
        let mut ctx = RequestContext::new(
            self.method.unwrap_or(Method::GET),
            self.uri.unwrap_or_else(|| Uri::from_static("/")),
            self.headers,
            self.body,
            self.path_params,
        );
        ctx.form = self.form;
        if let Some(size) = self.max_body_size {
            ctx.max_body_size = size;
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let ctx = RequestContext::builder().build();
        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.path(), "/");
        assert!(ctx.path_params().is_empty());
        assert!(ctx.form().is_empty());
    }

    #[test]
    fn test_query_first_occurrence_wins() {
        let ctx = RequestContext::builder()
            .uri(Uri::from_static("/s?q=rust&q=go&empty=&enc=a%20b"))
            .build();
        assert_eq!(ctx.query("q"), Some("rust"));
        assert_eq!(ctx.query("empty"), Some(""));
        assert_eq!(ctx.query("enc"), Some("a b"));
        assert_eq!(ctx.query("missing"), None);
    }

    #[test]
    fn test_header_case_insensitive() {
        let ctx = RequestContext::builder()
            .header("X-Request-Id", "abc")
            .build();
        assert_eq!(ctx.header("x-request-id"), Some("abc"));
        assert_eq!(ctx.header("X-REQUEST-ID"), Some("abc"));
    }

    #[test]
    fn test_json_payload() {
        let ctx = RequestContext::builder()
            .method(Method::POST)
            .json(&json!({"a": 1}))
            .build();
        assert_eq!(ctx.json_payload().unwrap(), Some(json!({"a": 1})));

        let empty = RequestContext::builder().method(Method::POST).build();
        assert_eq!(empty.json_payload().unwrap(), None);
    }

    #[test]
    fn test_json_payload_errors() {
        let ctx = RequestContext::builder()
            .method(Method::POST)
            .body("{not json")
            .build();
        let err = ctx.json_payload().unwrap_err();
        assert_eq!(err.extraction_source(), ExtractionSource::Json);

        let ctx = RequestContext::builder()
            .method(Method::POST)
            .body("[1, 2, 3]")
            .max_body_size(4)
            .build();
        assert_eq!(
            ctx.json_payload().unwrap_err().status_code(),
            http::StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_form_body_is_not_json() {
        let ctx = RequestContext::builder()
            .method(Method::POST)
            .header("content-type", "application/x-www-form-urlencoded")
            .body("a=1")
            .build();
        assert_eq!(ctx.json_payload().unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_urlencoded_form() {
        let mut ctx = RequestContext::builder()
            .method(Method::POST)
            .header("content-type", "application/x-www-form-urlencoded; charset=utf-8")
            .body("name=Ada&age=36")
            .build();
        ctx.read_form(&MultipartConfig::default()).await.unwrap();
        assert_eq!(ctx.form().field("name"), Some("Ada"));
        assert_eq!(ctx.form().field("age"), Some("36"));
    }

    #[tokio::test]
    async fn test_read_form_ignores_json() {
        let mut ctx = RequestContext::builder()
            .method(Method::POST)
            .json(&json!({"name": "Ada"}))
            .form_field("preset", "yes")
            .build();
        ctx.read_form(&MultipartConfig::default()).await.unwrap();
        assert_eq!(ctx.form().field("preset"), Some("yes"));
    }
}
