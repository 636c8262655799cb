//! Endpoint metadata.
//!
//! Every route declaration produces one [`EndpointDescriptor`] per method.
//! Routers accumulate them; [`EndpointRegistry::mount`] collects them in
//! declaration order for documentation generators.

use std::sync::Arc;

use heron_binding::{AliasTable, ResolvedSignature, RouteBinding, ValidationSchema};
use heron_core::{ConfigError, ConfigResult, SecurityRequirement};
use http::Method;
use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::debug;

use crate::routing::ApiRouter;

/// A documented response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    /// Human-readable description.
    pub description: String,
    /// JSON schema of the content; `{}` when unspecified.
    pub schema: Value,
    /// Example content.
    pub example: Option<Value>,
}

impl ResponseSpec {
    /// A response with an unspecified schema.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            schema: json!({}),
            example: None,
        }
    }

    /// Sets the content schema.
    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    /// Sets an example.
    #[must_use]
    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    /// The validation failure response.
    #[must_use]
    pub fn validation_error() -> Self {
        Self::new("ValidationError").example(json!({
            "detail": [{"loc": ["string"], "msg": "string", "type": "string"}]
        }))
    }
}

/// Responses documented when a route declares none: `200` and `422`.
pub fn default_responses(success_description: &str) -> IndexMap<u16, ResponseSpec> {
    let mut responses = IndexMap::new();
    responses.insert(200, ResponseSpec::new(success_description));
    responses.insert(422, ResponseSpec::validation_error());
    responses
}

/// Metadata for one (path, method) pair.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    pub(crate) endpoint: String,
    pub(crate) path: String,
    pub(crate) method: Method,
    pub(crate) binding: Arc<RouteBinding>,
    pub(crate) tags: Vec<String>,
    pub(crate) summary: String,
    pub(crate) description: String,
    pub(crate) response_description: String,
    pub(crate) responses: IndexMap<u16, ResponseSpec>,
    pub(crate) auto_docs: bool,
    pub(crate) custom_docs: Option<Value>,
    pub(crate) security: Option<SecurityRequirement>,
}

impl EndpointDescriptor {
    /// Endpoint (view) name, `router.handler` unless overridden.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Path in `{name}` syntax, router prefix included.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The resolved signature.
    pub fn signature(&self) -> &ResolvedSignature {
        self.binding.signature()
    }

    /// The full schema, body requirements included.
    pub fn schema(&self) -> &ValidationSchema {
        self.binding.full_schema()
    }

    /// The schema requests with this method are validated with; the
    /// relaxed variant for GET.
    pub fn validation_schema(&self) -> &ValidationSchema {
        self.binding.schema_for(&self.method)
    }

    /// Wire names per source.
    pub fn aliases(&self) -> &AliasTable {
        self.binding.aliases()
    }

    /// Tags, never empty.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Summary.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Description of the success response.
    pub fn response_description(&self) -> &str {
        &self.response_description
    }

    /// Documented responses by status code.
    pub fn responses(&self) -> &IndexMap<u16, ResponseSpec> {
        &self.responses
    }

    /// Whether documentation is generated for this endpoint.
    pub fn auto_docs(&self) -> bool {
        self.auto_docs
    }

    /// Operation object used verbatim instead of the generated one.
    pub fn custom_docs(&self) -> Option<&Value> {
        self.custom_docs.as_ref()
    }

    /// Required credential.
    pub fn security(&self) -> Option<&SecurityRequirement> {
        self.security.as_ref()
    }
}

/// Every endpoint of an application, in declaration order.
///
/// Built at startup and read-only afterward.
///
/// # Example
///
/// ```rust
/// use heron::prelude::*;
///
/// let mut users = ApiRouter::<String>::new("users").url_prefix("/users");
/// users
///     .get(
///         "/<int:id>",
///         HandlerSignature::new("get_user").param("id", TypeDesc::Integer, ParamDefault::Missing),
///         |args| format!("user {}", args.get::<i64>("id").unwrap()),
///     )
///     .unwrap();
///
/// let mut registry = EndpointRegistry::new();
/// registry.mount(&users).unwrap();
/// assert_eq!(registry.len(), 1);
/// assert_eq!(registry.iter().next().unwrap().path(), "/users/{id}");
/// ```
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: Vec<Arc<EndpointDescriptor>>,
    routers: IndexMap<String, MountedRouter>,
}

#[derive(Debug, Clone, Copy)]
struct MountedRouter {
    id: u64,
    contributed: usize,
}

impl EndpointRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the endpoints of `router`.
    ///
    /// Mounting the same router again appends only the routes declared
    /// since it was last mounted.
    ///
    /// # Errors
    ///
    /// [`ConfigError::RouterConflict`] if a different router was mounted
    /// under the same name.
    pub fn mount<R>(&mut self, router: &ApiRouter<R>) -> ConfigResult<()> {
        let contributed = match self.routers.get(router.name()) {
            Some(mounted) if mounted.id == router.id() => mounted.contributed,
            Some(_) => {
                return Err(ConfigError::RouterConflict {
                    name: router.name().to_string(),
                })
            }
            None => 0,
        };

        let added = router.descriptors().get(contributed..).unwrap_or_default();
        self.endpoints.extend(added.iter().cloned());
        self.routers.insert(
            router.name().to_string(),
            MountedRouter {
                id: router.id(),
                contributed: router.descriptors().len(),
            },
        );
        debug!(router = router.name(), endpoints = added.len(), "mounted router");
        Ok(())
    }

    /// Endpoints in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EndpointDescriptor>> {
        self.endpoints.iter()
    }

    /// Endpoints with documentation enabled.
    pub fn documented(&self) -> impl Iterator<Item = &Arc<EndpointDescriptor>> {
        self.endpoints.iter().filter(|e| e.auto_docs())
    }

    /// Finds the descriptor for `endpoint` and `method`.
    pub fn find(&self, endpoint: &str, method: &Method) -> Option<&Arc<EndpointDescriptor>> {
        self.endpoints
            .iter()
            .find(|e| e.endpoint() == endpoint && e.method() == method)
    }

    /// Names of the mounted routers.
    pub fn routers(&self) -> impl Iterator<Item = &str> {
        self.routers.keys().map(String::as_str)
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether no endpoint is registered.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_binding::{HandlerSignature, ParamDefault};
    use heron_core::fixtures::user_model;
    use heron_core::{ParamSource, TypeDesc};

    fn router(name: &str) -> ApiRouter<()> {
        let mut router = ApiRouter::new(name);
        router
            .route(
                "/items/<id>",
                &["GET", "DELETE"],
                HandlerSignature::new("item").param("id", TypeDesc::Integer, ParamDefault::Missing),
                |_| (),
                crate::RouteOptions::new(),
            )
            .unwrap();
        router
    }

    #[test]
    fn test_default_responses() {
        let responses = default_responses("Successful Response");
        assert_eq!(responses.keys().copied().collect::<Vec<_>>(), [200, 422]);
        assert_eq!(responses[&200].schema, json!({}));
        assert_eq!(
            responses[&422].example.as_ref().unwrap()["detail"][0]["type"],
            "string"
        );
    }

    #[test]
    fn test_mount_collects_one_descriptor_per_method() {
        let mut registry = EndpointRegistry::new();
        registry.mount(&router("shop")).unwrap();

        let methods: Vec<_> = registry.iter().map(|e| e.method().clone()).collect();
        assert_eq!(methods, [Method::GET, Method::DELETE]);
        assert!(registry.find("shop.item", &Method::DELETE).is_some());
        assert!(registry.find("shop.item", &Method::POST).is_none());
    }

    #[test]
    fn test_mount_same_router_twice_is_noop() {
        let shop = router("shop");
        let mut registry = EndpointRegistry::new();
        registry.mount(&shop).unwrap();
        registry.mount(&shop).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_routes_declared_after_mount_are_picked_up() {
        let mut shop: ApiRouter<()> = ApiRouter::new("shop");
        shop.get("/a", HandlerSignature::new("a"), |_| ()).unwrap();

        let mut registry = EndpointRegistry::new();
        registry.mount(&shop).unwrap();
        shop.get("/b", HandlerSignature::new("b"), |_| ()).unwrap();
        registry.mount(&shop).unwrap();

        let paths: Vec<_> = registry.iter().map(|e| e.path().to_string()).collect();
        assert_eq!(paths, ["/a", "/b"]);

        registry.mount(&shop).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_get_descriptor_keeps_full_schema() {
        let mut shop: ApiRouter<()> = ApiRouter::new("shop");
        shop.get(
            "/search",
            HandlerSignature::new("search").param("filter", TypeDesc::model(user_model()), ParamSource::body_required()),
            |_| (),
        )
        .unwrap();

        let get = &shop.descriptors()[0];
        assert!(!get.schema().is_relaxed());
        assert_eq!(get.schema().name(), "searchSchema");
        assert!(get.validation_schema().is_relaxed());
    }

    #[test]
    fn test_router_name_conflict() {
        let mut registry = EndpointRegistry::new();
        registry.mount(&router("shop")).unwrap();
        let err = registry.mount(&router("shop")).unwrap_err();
        assert_eq!(err, ConfigError::RouterConflict { name: "shop".to_string() });

        registry.mount(&router("admin")).unwrap();
        assert_eq!(registry.routers().collect::<Vec<_>>(), ["shop", "admin"]);
        assert_eq!(registry.len(), 4);
    }
}
