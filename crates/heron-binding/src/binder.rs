//! Per-request binding.
//!
//! [`RouteBinding::bind`] runs one request through a fixed sequence of
//! stages against the route's precomputed artifacts:
//!
//! 1. path values seed the working set
//! 2. query values are merged, never overwriting a path value
//! 3. headers are merged; an empty header counts as absent
//! 4. on body-carrying methods, form fields and uploaded files replace the
//!    working set (or are merged into it, see [`BindingOptions`])
//! 5. body parameters are resolved from the JSON payload
//! 6. the working set is validated, with the relaxed schema for GET
//! 7. enumeration members are normalized to their values
//! 8. uploaded files take the place of their placeholders

use std::sync::Arc;
use std::time::Instant;

use heron_core::{carries_body, BindError, BindResult, ConfigResult, SourceKind};
use heron_extract::{RequestContext, UploadedFile, DEFAULT_MAX_BODY_SIZE};
use heron_telemetry::{record_bind, BindOutcome};
use http::{Method, StatusCode};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{trace, warn};

use crate::aliases::AliasTable;
use crate::arguments::{Argument, Arguments};
use crate::normalize::normalize;
use crate::schema::ValidationSchema;
use crate::signature::ResolvedSignature;

/// Stand-in value for an uploaded file during validation.
pub const FILE_PLACEHOLDER: &str = "__heron_file__";

/// Binding behavior shared by every route of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingOptions {
    /// Merge form values into path, query and header values on
    /// body-carrying methods instead of replacing them.
    pub preserve_sources_on_body_methods: bool,
    /// Status reported for validation failures.
    pub validation_status: StatusCode,
    /// Largest JSON payload that is parsed.
    pub max_body_bytes: usize,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            preserve_sources_on_body_methods: false,
            validation_status: StatusCode::UNPROCESSABLE_ENTITY,
            max_body_bytes: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    PathCollected,
    QueryMerged,
    HeaderMerged,
    BodyResolved,
    Validated,
    EnumNormalized,
}

impl Stage {
    const fn as_str(self) -> &'static str {
        match self {
            Self::PathCollected => "path_collected",
            Self::QueryMerged => "query_merged",
            Self::HeaderMerged => "header_merged",
            Self::BodyResolved => "body_resolved",
            Self::Validated => "validated",
            Self::EnumNormalized => "enum_normalized",
        }
    }
}

fn file_present(file: &UploadedFile) -> bool {
    !file.is_empty() || file.file_name().is_some_and(|name| !name.is_empty())
}

/// Everything needed to bind requests for one route.
///
/// Built once at registration and shared read-only afterward; each call
/// to [`bind`](Self::bind) works on its own state.
#[derive(Debug, Clone)]
pub struct RouteBinding {
    signature: Arc<ResolvedSignature>,
    aliases: AliasTable,
    full: ValidationSchema,
    relaxed: ValidationSchema,
    options: BindingOptions,
}

impl RouteBinding {
    /// Builds the alias table and both schema variants for `signature`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPattern`](heron_core::ConfigError::InvalidPattern)
    /// if a constraint pattern does not compile.
    pub fn new(signature: ResolvedSignature, options: BindingOptions) -> ConfigResult<Self> {
        let full = ValidationSchema::synthesize(format!("{}Schema", signature.handler()), &signature)?;
        let relaxed = full.relaxed();
        let aliases = AliasTable::new(&signature);

        Ok(Self {
            signature: Arc::new(signature),
            aliases,
            full,
            relaxed,
            options,
        })
    }

    /// The resolved signature.
    pub fn signature(&self) -> &ResolvedSignature {
        &self.signature
    }

    /// Wire names per source.
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// The full schema.
    pub fn full_schema(&self) -> &ValidationSchema {
        &self.full
    }

    /// The schema used for GET requests.
    pub fn relaxed_schema(&self) -> &ValidationSchema {
        &self.relaxed
    }

    /// The schema `method` is validated with.
    pub fn schema_for(&self, method: &Method) -> &ValidationSchema {
        if carries_body(method) {
            &self.full
        } else {
            &self.relaxed
        }
    }

    /// Binding options.
    pub fn options(&self) -> &BindingOptions {
        &self.options
    }

    /// Status to report for `error`.
    pub fn status_for(&self, error: &BindError) -> StatusCode {
        match error {
            BindError::Validation(_) => self.options.validation_status,
            other => other.status_code(),
        }
    }

    /// Binds one request.
    ///
    /// # Errors
    ///
    /// - [`BindError::Validation`] with every failing value
    /// - [`BindError::Payload`] if the JSON payload is too large or malformed
    pub fn bind(&self, ctx: &RequestContext) -> BindResult<Arguments> {
        let started = Instant::now();
        let route = self.signature.handler();
        let result = self.run(ctx);

        let (outcome, field_errors) = match &result {
            Ok(_) => (BindOutcome::Bound, 0),
            Err(BindError::Validation(errors)) => {
                warn!(route, errors = errors.len(), "request validation failed");
                (BindOutcome::Invalid, errors.len())
            }
            Err(BindError::Unauthorized { .. }) => (BindOutcome::Unauthorized, 0),
            Err(BindError::Payload { message }) => {
                warn!(route, error = %message, "malformed request payload");
                (BindOutcome::Malformed, 0)
            }
        };
        record_bind(route, outcome, field_errors, started.elapsed());

        result
    }

    fn trace_stage(&self, stage: Stage, working: &IndexMap<String, Value>) {
        trace!(
            route = self.signature.handler(),
            stage = stage.as_str(),
            keys = working.len(),
            "binder stage"
        );
    }

    fn run(&self, ctx: &RequestContext) -> BindResult<Arguments> {
        let body_method = carries_body(ctx.method());

        let mut working: IndexMap<String, Value> = ctx
            .path_params()
            .iter()
            .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
            .collect();
        self.trace_stage(Stage::PathCollected, &working);

        for (key, alias) in self.aliases.entries(SourceKind::Query) {
            if let Some(value) = ctx.query(alias) {
                working
                    .entry(key.to_string())
                    .or_insert_with(|| Value::String(value.to_string()));
            }
        }
        self.trace_stage(Stage::QueryMerged, &working);

        for (key, alias) in self.aliases.entries(SourceKind::Header) {
            if let Some(value) = ctx.header(alias).filter(|v| !v.is_empty()) {
                working.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        self.trace_stage(Stage::HeaderMerged, &working);

        let mut files = Vec::new();
        if body_method {
            let form = ctx.form();
            let mut sourced = IndexMap::new();

            for (key, alias) in self.aliases.entries(SourceKind::Form) {
                if let Some(value) = form.field(alias).filter(|v| !v.is_empty()) {
                    sourced.insert(key.to_string(), Value::String(value.to_string()));
                }
            }
            for (key, alias) in self.aliases.entries(SourceKind::File) {
                if let Some(file) = form.file(alias).filter(|f| file_present(f)) {
                    sourced.insert(key.to_string(), Value::String(FILE_PLACEHOLDER.to_string()));
                    files.push((key.to_string(), file));
                }
            }

            if self.options.preserve_sources_on_body_methods {
                working.extend(sourced);
            } else {
                working = sourced;
            }
        }

        self.resolve_bodies(ctx, body_method, &mut working)?;
        self.trace_stage(Stage::BodyResolved, &working);

        let validated = self.schema_for(ctx.method()).validate(&working)?;
        trace!(route = self.signature.handler(), stage = Stage::Validated.as_str(), "binder stage");

        let mut arguments: Arguments = validated
            .into_iter()
            .map(|(key, value)| (key, Argument::Value(normalize(value))))
            .collect();
        trace!(route = self.signature.handler(), stage = Stage::EnumNormalized.as_str(), "binder stage");

        for (key, file) in files {
            arguments.insert(key, Argument::File(file.clone()));
        }

        Ok(arguments)
    }

    fn resolve_bodies(
        &self,
        ctx: &RequestContext,
        body_method: bool,
        working: &mut IndexMap<String, Value>,
    ) -> BindResult<()> {
        let total_body = self.signature.body_count();
        if total_body == 0 {
            return Ok(());
        }

        let payload = if body_method { self.payload(ctx)? } else { None };

        for param in self.signature.of_kind(SourceKind::Body) {
            if working.contains_key(&param.name) {
                continue;
            }
            let value = match &payload {
                None => Value::Null,
                Some(whole) if total_body == 1 && param.ty.structured().is_some() => whole.clone(),
                Some(Value::Object(fields)) => fields.get(param.wire_name()).cloned().unwrap_or(Value::Null),
                Some(_) => Value::Null,
            };
            working.insert(param.name.clone(), value);
        }
        Ok(())
    }

    fn payload(&self, ctx: &RequestContext) -> BindResult<Option<Value>> {
        let len = ctx.body().len();
        if len > self.options.max_body_bytes {
            return Err(BindError::payload(format!(
                "payload too large: max {} bytes, got {len} bytes",
                self.options.max_body_bytes
            )));
        }
        Ok(ctx.json_payload()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{resolve, HandlerSignature, ParamDefault};
    use bytes::Bytes;
    use heron_core::fixtures::{color_enum, meta_model, user_model};
    use heron_core::{ParamSource, TypeDesc};
    use http::Uri;
    use serde_json::json;

    fn binding(sig: &HandlerSignature, rule: &str) -> RouteBinding {
        binding_with(sig, rule, BindingOptions::default())
    }

    fn binding_with(sig: &HandlerSignature, rule: &str, options: BindingOptions) -> RouteBinding {
        RouteBinding::new(resolve(sig, rule, &[]).unwrap(), options).unwrap()
    }

    fn post(body: &Value) -> heron_extract::RequestContextBuilder {
        RequestContext::builder().method(Method::POST).json(body)
    }

    #[test]
    fn test_query_default() {
        let sig = HandlerSignature::new("list").param("page", TypeDesc::Integer, ParamSource::query(1));
        let b = binding(&sig, "/items");

        let args = b.bind(&RequestContext::builder().uri(Uri::from_static("/items")).build()).unwrap();
        assert_eq!(args.to_json(), json!({"page": 1}));

        let args = b
            .bind(&RequestContext::builder().uri(Uri::from_static("/items?page=4&page=9")).build())
            .unwrap();
        assert_eq!(args.get::<i64>("page").unwrap(), 4);
    }

    #[test]
    fn test_query_alias_and_empty_value() {
        let sig = HandlerSignature::new("search")
            .param("term", TypeDesc::String, ParamSource::query("none").alias("q"))
            .param("term_raw", TypeDesc::String, ParamSource::query("none"));
        let b = binding(&sig, "/search");

        let ctx = RequestContext::builder()
            .uri(Uri::from_static("/search?q=&term=ignored"))
            .build();
        let args = b.bind(&ctx).unwrap();
        // present but empty still counts for query
        assert_eq!(args.get::<String>("term").unwrap(), "");
        assert_eq!(args.get::<String>("term_raw").unwrap(), "none");
    }

    #[test]
    fn test_path_beats_query() {
        let sig = HandlerSignature::new("get_item").param("id", TypeDesc::Integer, ParamDefault::Missing);
        let b = binding(&sig, "/items/<int:id>");

        let ctx = RequestContext::builder()
            .uri(Uri::from_static("/items/5?id=9"))
            .path_param("id", "5")
            .build();
        assert_eq!(b.bind(&ctx).unwrap().get::<i64>("id").unwrap(), 5);
    }

    #[test]
    fn test_header_case_insensitive_and_empty_absent() {
        let sig = HandlerSignature::new("h")
            .param("token", TypeDesc::String, ParamSource::header("anon").alias("X-Token"));
        let b = binding(&sig, "/");

        let ctx = RequestContext::builder().header("x-token", "abc").build();
        assert_eq!(b.bind(&ctx).unwrap().get::<String>("token").unwrap(), "abc");

        let ctx = RequestContext::builder().header("X-Token", "").build();
        assert_eq!(b.bind(&ctx).unwrap().get::<String>("token").unwrap(), "anon");
    }

    #[test]
    fn test_get_never_reads_payload() {
        let sig = HandlerSignature::new("h").param("page", TypeDesc::Integer, json!(1));
        let b = binding(&sig, "/");

        // malformed JSON would fail if it were parsed
        let ctx = RequestContext::builder()
            .header("content-type", "application/json")
            .body(Bytes::from_static(b"{not json"))
            .build();
        assert!(b.bind(&ctx).is_ok());
    }

    #[test]
    fn test_get_with_body_param_is_relaxed() {
        let sig = HandlerSignature::new("h").param("user", TypeDesc::model(user_model()), ParamSource::body_required());
        let b = binding(&sig, "/");

        let args = b.bind(&RequestContext::builder().json(&json!({"name": "a"})).build()).unwrap();
        assert_eq!(args.value("user"), Some(&Value::Null));
    }

    #[test]
    fn test_single_structured_body_takes_whole_payload() {
        // an unannotated default still becomes a body for a model type
        let sig = HandlerSignature::new("create").param("user", TypeDesc::model(user_model()), ParamDefault::Missing);
        let b = binding(&sig, "/users");

        let args = b.bind(&post(&json!({"name": "a", "age": 3})).build()).unwrap();
        assert_eq!(args.to_json(), json!({"user": {"name": "a", "age": 3}}));

        let err = b.bind(&post(&json!({"name": "a"})).build()).unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.errors()[0].loc, ["user", "age"]);
        assert_eq!(b.status_for(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_scalar_body_reads_by_alias() {
        let sig = HandlerSignature::new("h")
            .param("count", TypeDesc::Integer, ParamSource::body_required().alias("n"));
        let b = binding(&sig, "/");

        let args = b.bind(&post(&json!({"n": "7"})).build()).unwrap();
        assert_eq!(args.get::<i64>("count").unwrap(), 7);

        let err = b.bind(&post(&json!(7)).build()).unwrap_err();
        assert_eq!(err.validation_errors().unwrap().errors()[0].kind, "type_error.none.not_allowed");
    }

    #[test]
    fn test_multiple_bodies_keyed_independently() {
        let sig = HandlerSignature::new("h")
            .param("user", TypeDesc::model(user_model()), ParamSource::body_required())
            .param("meta", TypeDesc::model(meta_model()), ParamSource::body(Value::Null));
        let b = binding(&sig, "/");

        let payload = json!({"meta": {"trace": "t", "tags": ["red"]}, "user": {"name": "a", "age": 1}});
        let args = b.bind(&post(&payload).build()).unwrap();
        assert_eq!(args.get::<Value>("user").unwrap(), json!({"name": "a", "age": 1}));
        assert_eq!(
            args.get::<Value>("meta").unwrap(),
            json!({"trace": "t", "priority": 1, "tags": ["red"]})
        );

        // a missing key is null, and only that parameter is affected
        let args = b.bind(&post(&json!({"user": {"name": "b", "age": 2}})).build()).unwrap();
        assert_eq!(args.value("meta"), Some(&Value::Null));
        assert_eq!(args.get::<Value>("user").unwrap()["name"], "b");
    }

    #[test]
    fn test_malformed_and_oversized_payloads() {
        let sig = HandlerSignature::new("h").param("user", TypeDesc::model(user_model()), ParamDefault::Missing);
        let options = BindingOptions {
            max_body_bytes: 16,
            ..BindingOptions::default()
        };
        let b = binding_with(&sig, "/", options);

        let ctx = RequestContext::builder()
            .method(Method::PUT)
            .header("content-type", "application/json")
            .body(Bytes::from_static(b"{oops"))
            .build();
        let err = b.bind(&ctx).unwrap_err();
        assert!(matches!(err, BindError::Payload { .. }));
        assert_eq!(b.status_for(&err), StatusCode::BAD_REQUEST);

        let err = b.bind(&post(&json!({"name": "a long enough name", "age": 3})).build()).unwrap_err();
        assert!(matches!(err, BindError::Payload { ref message } if message.contains("too large")));
    }

    #[test]
    fn test_body_method_replaces_sources() {
        let sig = HandlerSignature::new("h")
            .param("page", TypeDesc::Integer, ParamSource::query(1))
            .param("name", TypeDesc::String, ParamSource::form("anon"));
        let b = binding(&sig, "/");

        let ctx = RequestContext::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/?page=3"))
            .form_field("name", "alice")
            .build();
        let args = b.bind(&ctx).unwrap();
        assert_eq!(args.to_json(), json!({"page": 1, "name": "alice"}));

        let preserving = binding_with(
            &sig,
            "/",
            BindingOptions {
                preserve_sources_on_body_methods: true,
                ..BindingOptions::default()
            },
        );
        let args = preserving.bind(&ctx).unwrap();
        assert_eq!(args.to_json(), json!({"page": 3, "name": "alice"}));
    }

    #[test]
    fn test_empty_form_value_is_absent() {
        let sig = HandlerSignature::new("h").param("name", TypeDesc::String, ParamSource::form("anon"));
        let b = binding(&sig, "/");
        let ctx = RequestContext::builder()
            .method(Method::POST)
            .form_field("name", "")
            .build();
        assert_eq!(b.bind(&ctx).unwrap().get::<String>("name").unwrap(), "anon");
    }

    #[test]
    fn test_file_is_passed_through() {
        let sig = HandlerSignature::new("upload")
            .param("avatar", TypeDesc::File, ParamSource::file_required().alias("picture"));
        let b = binding(&sig, "/");

        let upload = UploadedFile::new("picture", Some("me.png".to_string()), Some("image/png".to_string()), Bytes::from_static(b"\x89PNG"));
        let ctx = RequestContext::builder()
            .method(Method::POST)
            .file(upload.clone())
            .build();
        let args = b.bind(&ctx).unwrap();
        assert_eq!(args.file("avatar"), Some(&upload));
        assert!(args.value("avatar").is_none());

        let err = b.bind(&RequestContext::builder().method(Method::POST).build()).unwrap_err();
        assert!(err.validation_errors().unwrap().mentions("avatar"));
    }

    #[test]
    fn test_file_skips_type_and_constraints() {
        let sig = HandlerSignature::new("upload").param("doc", TypeDesc::Integer, ParamSource::file_required().max_length(3));
        let b = binding(&sig, "/");

        let upload = UploadedFile::new("doc", Some("report.pdf".to_string()), None, Bytes::from_static(b"%PDF-1.7"));
        let ctx = RequestContext::builder().method(Method::POST).file(upload.clone()).build();
        let args = b.bind(&ctx).unwrap();
        assert_eq!(args.file("doc"), Some(&upload));
    }

    #[test]
    fn test_enum_normalized_in_query_and_body() {
        let sig = HandlerSignature::new("h")
            .param("color", TypeDesc::enumeration(color_enum()), ParamSource::query("red"))
            .param("meta", TypeDesc::model(meta_model()), ParamDefault::Missing);
        let b = binding_with(
            &sig,
            "/",
            BindingOptions {
                preserve_sources_on_body_methods: true,
                ..BindingOptions::default()
            },
        );

        let ctx = post(&json!({"trace": "t", "priority": 2, "tags": ["blue", "green"]}))
            .uri(Uri::from_static("/?color=green"))
            .build();
        let args = b.bind(&ctx).unwrap();
        assert_eq!(args.get::<String>("color").unwrap(), "green");
        assert_eq!(args.get::<Value>("meta").unwrap()["tags"], json!(["blue", "green"]));
        assert_eq!(args.get::<Value>("meta").unwrap()["priority"], json!(2));
    }

    #[test]
    fn test_validation_status_is_configurable() {
        let sig = HandlerSignature::new("h").param("page", TypeDesc::Integer, ParamDefault::Missing);
        let b = binding_with(
            &sig,
            "/",
            BindingOptions {
                validation_status: StatusCode::BAD_REQUEST,
                ..BindingOptions::default()
            },
        );
        let err = b.bind(&RequestContext::builder().build()).unwrap_err();
        assert_eq!(b.status_for(&err), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_body(),
            json!({"detail": [{"loc": ["page"], "msg": "field required", "type": "value_error.missing"}]})
        );
    }

    #[test]
    fn test_schema_names() {
        let sig = HandlerSignature::new("get_user").param("id", TypeDesc::Integer, ParamDefault::Missing);
        let b = binding(&sig, "/users/<id>");
        assert_eq!(b.full_schema().name(), "get_userSchema");
        assert_eq!(b.relaxed_schema().name(), "get_userSchema_no_Body");
        assert!(b.schema_for(&Method::GET).is_relaxed());
        assert!(!b.schema_for(&Method::DELETE).is_relaxed());
        assert_eq!(b.signature().get("id").unwrap().source.kind(), SourceKind::Path);
    }
}
