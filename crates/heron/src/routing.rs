//! Route registration.
//!
//! An [`ApiRouter`] groups routes under a name and URL prefix, with shared
//! tags, security and dependencies. Declaring a route does all the
//! per-route work up front: the rule is validated, the handler signature
//! is resolved, the alias table and both schema variants are built, and an
//! [`EndpointDescriptor`] is recorded for every method. What remains for
//! request time is [`BoundRoute::call`].
//!
//! # Example
//!
//! ```rust
//! use heron::prelude::*;
//! use http::{Method, Uri};
//!
//! let mut router = ApiRouter::new("items").url_prefix("/api");
//! let route = router
//!     .post(
//!         "/items",
//!         HandlerSignature::new("create_item")
//!             .param("name", TypeDesc::String, ParamSource::body_required())
//!             .param("qty", TypeDesc::Integer, ParamSource::body(1)),
//!         |args| args.to_json(),
//!     )
//!     .unwrap()
//!     .clone();
//!
//! let ctx = RequestContext::builder()
//!     .method(Method::POST)
//!     .uri(Uri::from_static("/api/items"))
//!     .json(&serde_json::json!({"name": "pen", "qty": "3"}))
//!     .build();
//! let created = route.call(&ctx).unwrap();
//! assert_eq!(created, serde_json::json!({"name": "pen", "qty": 3}));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use heron_binding::{resolve, Arguments, BindingOptions, HandlerSignature, RouteBinding};
use heron_core::{parse_method, BindError, BindResult, ConfigError, ConfigResult, SecurityRequirement};
use heron_extract::RequestContext;
use heron_router::{to_docs_path, validate_rule};
use heron_telemetry::{record_bind, record_route_registered, BindOutcome};
use http::{Method, StatusCode};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::endpoint::{default_responses, EndpointDescriptor, ResponseSpec};

/// Type-erased handler.
pub type Handler<R> = Arc<dyn Fn(Arguments) -> R + Send + Sync>;

static NEXT_ROUTER_ID: AtomicU64 = AtomicU64::new(1);

const DEFAULT_SUCCESS_DESCRIPTION: &str = "Successful Response";

/// Per-route settings.
#[derive(Debug, Clone)]
pub struct RouteOptions {
    endpoint: Option<String>,
    tags: Vec<String>,
    summary: Option<String>,
    description: Option<String>,
    response_description: Option<String>,
    responses: IndexMap<u16, ResponseSpec>,
    auto_docs: bool,
    custom_docs: Option<Value>,
    security: Option<SecurityRequirement>,
    dependencies: Vec<Arc<HandlerSignature>>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            tags: Vec::new(),
            summary: None,
            description: None,
            response_description: None,
            responses: IndexMap::new(),
            auto_docs: true,
            custom_docs: None,
            security: None,
            dependencies: Vec::new(),
        }
    }
}

impl RouteOptions {
    /// Default options: documented, no tags, no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the endpoint name, which defaults to the handler name.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the success response description.
    #[must_use]
    pub fn response_description(mut self, description: impl Into<String>) -> Self {
        self.response_description = Some(description.into());
        self
    }

    /// Documents a response. Declaring any replaces the defaults.
    #[must_use]
    pub fn response(mut self, status: u16, response: ResponseSpec) -> Self {
        self.responses.insert(status, response);
        self
    }

    /// Enables or disables documentation.
    #[must_use]
    pub fn auto_docs(mut self, enabled: bool) -> Self {
        self.auto_docs = enabled;
        self
    }

    /// Uses `operation` verbatim as the documented operation.
    #[must_use]
    pub fn custom_docs(mut self, operation: Value) -> Self {
        self.custom_docs = Some(operation);
        self
    }

    /// Requires a credential, overriding the router's.
    #[must_use]
    pub fn security(mut self, requirement: SecurityRequirement) -> Self {
        self.security = Some(requirement);
        self
    }

    /// Adds a dependency for this route only.
    #[must_use]
    pub fn dependency(mut self, dependency: impl Into<Arc<HandlerSignature>>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }
}

/// A handler bound to its route's binding artifacts.
pub struct BoundRoute<R> {
    endpoint: String,
    rule: String,
    methods: Vec<Method>,
    binding: Arc<RouteBinding>,
    security: Option<SecurityRequirement>,
    handler: Handler<R>,
}

impl<R> Clone for BoundRoute<R> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            rule: self.rule.clone(),
            methods: self.methods.clone(),
            binding: Arc::clone(&self.binding),
            security: self.security.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<R> fmt::Debug for BoundRoute<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundRoute")
            .field("endpoint", &self.endpoint)
            .field("rule", &self.rule)
            .field("methods", &self.methods)
            .field("security", &self.security)
            .finish_non_exhaustive()
    }
}

impl<R> BoundRoute<R> {
    /// Endpoint name.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Rule with type qualifiers stripped, without the router prefix.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Methods the route was declared for.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Whether the route was declared for `method`.
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// Binding artifacts.
    pub fn binding(&self) -> &RouteBinding {
        &self.binding
    }

    /// Status to report for `error`.
    pub fn status_for(&self, error: &BindError) -> StatusCode {
        self.binding.status_for(error)
    }

    /// Checks the route's credential requirement, then binds the request.
    ///
    /// # Errors
    ///
    /// [`BindError::Unauthorized`] before anything is bound, otherwise
    /// whatever [`RouteBinding::bind`] reports.
    pub fn bind(&self, ctx: &RequestContext) -> BindResult<Arguments> {
        if let Some(requirement) = &self.security {
            if let Err(err) = requirement.check(ctx.headers()) {
                warn!(route = self.endpoint.as_str(), scheme = requirement.scheme_name(), "credential rejected");
                record_bind(&self.endpoint, BindOutcome::Unauthorized, 0, Duration::ZERO);
                return Err(err);
            }
        }
        self.binding.bind(ctx)
    }

    /// Binds the request and invokes the handler.
    ///
    /// # Errors
    ///
    /// See [`bind`](Self::bind); the handler is not invoked on error.
    pub fn call(&self, ctx: &RequestContext) -> BindResult<R> {
        let arguments = self.bind(ctx)?;
        Ok((self.handler)(arguments))
    }
}

/// A named group of routes.
pub struct ApiRouter<R> {
    id: u64,
    name: String,
    url_prefix: String,
    tags: Vec<String>,
    auto_docs: bool,
    security: Option<SecurityRequirement>,
    dependencies: Vec<Arc<HandlerSignature>>,
    options: BindingOptions,
    routes: Vec<BoundRoute<R>>,
    descriptors: Vec<Arc<EndpointDescriptor>>,
    endpoints: HashMap<String, String>,
}

impl<R> fmt::Debug for ApiRouter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRouter")
            .field("name", &self.name)
            .field("url_prefix", &self.url_prefix)
            .field("tags", &self.tags)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

impl<R> ApiRouter<R> {
    /// Creates an empty router.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_ROUTER_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            url_prefix: String::new(),
            tags: Vec::new(),
            auto_docs: true,
            security: None,
            dependencies: Vec::new(),
            options: BindingOptions::default(),
            routes: Vec::new(),
            descriptors: Vec::new(),
            endpoints: HashMap::new(),
        }
    }

    /// Prefixes every documented path.
    #[must_use]
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    /// Adds a tag to every route.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Enables or disables documentation for every route.
    #[must_use]
    pub fn auto_docs(mut self, enabled: bool) -> Self {
        self.auto_docs = enabled;
        self
    }

    /// Requires a credential on every route that does not set its own.
    #[must_use]
    pub fn security(mut self, requirement: SecurityRequirement) -> Self {
        self.security = Some(requirement);
        self
    }

    /// Adds a dependency resolved into every route.
    #[must_use]
    pub fn dependency(mut self, dependency: impl Into<Arc<HandlerSignature>>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    /// Sets the binding options of every route declared afterward.
    #[must_use]
    pub fn binding_options(mut self, options: BindingOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Router name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documented path prefix.
    pub fn prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Declared routes.
    pub fn routes(&self) -> &[BoundRoute<R>] {
        &self.routes
    }

    /// Endpoint descriptors, one per route and method.
    pub fn descriptors(&self) -> &[Arc<EndpointDescriptor>] {
        &self.descriptors
    }

    /// Declares a route.
    ///
    /// An empty `methods` list means GET.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnsupportedMethod`] for a method outside GET, POST,
    ///   PUT, DELETE and PATCH
    /// - [`ConfigError::Rule`] for a malformed or ambiguous rule
    /// - [`ConfigError::DuplicateParameter`] if two parameters share a key
    /// - [`ConfigError::DependencyConflict`] if two different dependencies share a name
    /// - [`ConfigError::InvalidPattern`] for a pattern that does not compile
    /// - [`ConfigError::EndpointConflict`] if the endpoint name is taken by
    ///   another handler
    pub fn route<F>(
        &mut self,
        rule: &str,
        methods: &[&str],
        signature: HandlerSignature,
        handler: F,
        options: RouteOptions,
    ) -> ConfigResult<&BoundRoute<R>>
    where
        F: Fn(Arguments) -> R + Send + Sync + 'static,
    {
        let methods = if methods.is_empty() {
            vec![Method::GET]
        } else {
            methods.iter().map(|m| parse_method(m)).collect::<ConfigResult<Vec<_>>>()?
        };

        let rule = validate_rule(rule)?;
        let docs_path = format!("{}{}", self.url_prefix, to_docs_path(&rule)?);

        let dependencies: Vec<_> = self
            .dependencies
            .iter()
            .chain(options.dependencies.iter())
            .cloned()
            .collect();
        let resolved = resolve(&signature, &rule, &dependencies)?;

        let handler_name = signature.name().to_string();
        let endpoint = format!(
            "{}.{}",
            self.name,
            options.endpoint.as_deref().unwrap_or(&handler_name)
        );
        if let Some(existing) = self.endpoints.get(&endpoint) {
            if *existing != handler_name {
                return Err(ConfigError::EndpointConflict {
                    endpoint,
                    existing: existing.clone(),
                });
            }
        }

        let binding = Arc::new(RouteBinding::new(resolved, self.options)?);

        let tags = if options.tags.is_empty() && self.tags.is_empty() {
            vec!["default".to_string()]
        } else {
            options.tags.iter().chain(self.tags.iter()).cloned().collect()
        };
        let summary = options.summary.clone().unwrap_or_else(|| handler_name.clone());
        let description = options.description.clone().unwrap_or_else(|| handler_name.clone());
        let response_description = options
            .response_description
            .clone()
            .unwrap_or_else(|| DEFAULT_SUCCESS_DESCRIPTION.to_string());
        let responses = if options.responses.is_empty() {
            default_responses(&response_description)
        } else {
            options.responses.clone()
        };
        let security = options.security.clone().or_else(|| self.security.clone());

        for method in &methods {
            self.descriptors.push(Arc::new(EndpointDescriptor {
                endpoint: endpoint.clone(),
                path: docs_path.clone(),
                method: method.clone(),
                binding: Arc::clone(&binding),
                tags: tags.clone(),
                summary: summary.clone(),
                description: description.clone(),
                response_description: response_description.clone(),
                responses: responses.clone(),
                auto_docs: self.auto_docs && options.auto_docs,
                custom_docs: options.custom_docs.clone(),
                security: security.clone(),
            }));
            record_route_registered(method.as_str());
        }

        debug!(
            router = self.name.as_str(),
            path = docs_path.as_str(),
            methods = ?methods,
            params = binding.signature().len(),
            "registered route"
        );

        self.endpoints.insert(endpoint.clone(), handler_name);
        let index = self.routes.len();
        self.routes.push(BoundRoute {
            endpoint,
            rule,
            methods,
            binding,
            security,
            handler: Arc::new(handler),
        });

        Ok(&self.routes[index])
    }

    /// Declares a GET route with default options.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn get<F>(&mut self, rule: &str, signature: HandlerSignature, handler: F) -> ConfigResult<&BoundRoute<R>>
    where
        F: Fn(Arguments) -> R + Send + Sync + 'static,
    {
        self.route(rule, &["GET"], signature, handler, RouteOptions::new())
    }

    /// Declares a POST route with default options.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn post<F>(&mut self, rule: &str, signature: HandlerSignature, handler: F) -> ConfigResult<&BoundRoute<R>>
    where
        F: Fn(Arguments) -> R + Send + Sync + 'static,
    {
        self.route(rule, &["POST"], signature, handler, RouteOptions::new())
    }

    /// Declares a PUT route with default options.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn put<F>(&mut self, rule: &str, signature: HandlerSignature, handler: F) -> ConfigResult<&BoundRoute<R>>
    where
        F: Fn(Arguments) -> R + Send + Sync + 'static,
    {
        self.route(rule, &["PUT"], signature, handler, RouteOptions::new())
    }

    /// Declares a DELETE route with default options.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn delete<F>(&mut self, rule: &str, signature: HandlerSignature, handler: F) -> ConfigResult<&BoundRoute<R>>
    where
        F: Fn(Arguments) -> R + Send + Sync + 'static,
    {
        self.route(rule, &["DELETE"], signature, handler, RouteOptions::new())
    }

    /// Declares a PATCH route with default options.
    ///
    /// # Errors
    ///
    /// See [`route`](Self::route).
    pub fn patch<F>(&mut self, rule: &str, signature: HandlerSignature, handler: F) -> ConfigResult<&BoundRoute<R>>
    where
        F: Fn(Arguments) -> R + Send + Sync + 'static,
    {
        self.route(rule, &["PATCH"], signature, handler, RouteOptions::new())
    }
}
