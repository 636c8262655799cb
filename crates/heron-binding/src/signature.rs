//! Handler signatures and their resolution.
//!
//! A [`HandlerSignature`] lists a handler's parameters in declaration
//! order, each with an optional type and a [`ParamDefault`]. Resolution
//! turns it into a [`ResolvedSignature`]: one [`ParamSignature`] per binding
//! key, each with a concrete type and exactly one source.
//!
//! Rules, applied per parameter:
//!
//! - an explicit [`ParamSource`] is used as declared
//! - a dependency is resolved recursively and its parameters spliced in
//!   at that position; the parameter itself binds nothing
//! - a plain default becomes an optional query parameter
//! - no default becomes a required query parameter
//! - a name matching a placeholder of the rule is moved to the path,
//!   keeping only its default
//! - a missing type is `String`, or `Any` for form and file sources
//! - outside the form family, a type that unwraps to a model moves the
//!   parameter to the body, carrying that model

use std::collections::HashMap;
use std::sync::Arc;

use heron_core::{ConfigError, ConfigResult, ParamSource, SourceKind, TypeDesc};
use heron_router::check_params_in_path;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

/// How a declared parameter gets its value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamDefault {
    /// An explicit source.
    Source(ParamSource),
    /// A plain default; the parameter is an optional query parameter.
    Plain(Value),
    /// No default; the parameter is a required query parameter.
    Missing,
    /// The parameters of another signature, spliced in.
    Depends(Arc<HandlerSignature>),
}

impl From<ParamSource> for ParamDefault {
    fn from(source: ParamSource) -> Self {
        Self::Source(source)
    }
}

impl From<Value> for ParamDefault {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

impl From<Arc<HandlerSignature>> for ParamDefault {
    fn from(dependency: Arc<HandlerSignature>) -> Self {
        Self::Depends(dependency)
    }
}

impl From<HandlerSignature> for ParamDefault {
    fn from(dependency: HandlerSignature) -> Self {
        Self::Depends(Arc::new(dependency))
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredParam {
    /// Binding key.
    pub name: String,
    /// Declared type, if annotated.
    pub ty: Option<TypeDesc>,
    /// Default or source.
    pub default: ParamDefault,
}

/// The declared parameters of a handler or dependency.
///
/// # Example
///
/// ```rust
/// use heron_binding::{HandlerSignature, ParamDefault};
/// use heron_core::{ParamSource, TypeDesc};
///
/// let auth = HandlerSignature::new("auth")
///     .param("token", TypeDesc::String, ParamSource::header_required().alias("X-Token"));
///
/// let signature = HandlerSignature::new("get_user")
///     .param("id", TypeDesc::Integer, ParamDefault::Missing)
///     .untyped("verbose", serde_json::json!(false))
///     .depends("_auth", auth);
///
/// assert_eq!(signature.params().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerSignature {
    name: String,
    params: Vec<DeclaredParam>,
}

impl HandlerSignature {
    /// Starts an empty signature.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Adds a typed parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: TypeDesc, default: impl Into<ParamDefault>) -> Self {
        self.params.push(DeclaredParam {
            name: name.into(),
            ty: Some(ty),
            default: default.into(),
        });
        self
    }

    /// Adds a parameter without a type annotation.
    #[must_use]
    pub fn untyped(mut self, name: impl Into<String>, default: impl Into<ParamDefault>) -> Self {
        self.params.push(DeclaredParam {
            name: name.into(),
            ty: None,
            default: default.into(),
        });
        self
    }

    /// Adds a dependency parameter.
    #[must_use]
    pub fn depends(self, name: impl Into<String>, dependency: impl Into<Arc<HandlerSignature>>) -> Self {
        let dependency: Arc<HandlerSignature> = dependency.into();
        self.untyped(name, ParamDefault::Depends(dependency))
    }

    /// Handler or dependency name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters, in order.
    pub fn params(&self) -> &[DeclaredParam] {
        &self.params
    }
}

/// A resolved parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSignature {
    /// Binding key.
    pub name: String,
    /// Type the value is coerced to.
    pub ty: TypeDesc,
    /// Where the value comes from.
    pub source: ParamSource,
}

impl ParamSignature {
    /// The name the value is read under.
    pub fn wire_name(&self) -> &str {
        self.source.wire_name(&self.name)
    }
}

/// Every parameter of a handler, dependencies included, by binding key.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSignature {
    handler: String,
    params: IndexMap<String, ParamSignature>,
}

impl ResolvedSignature {
    /// Name of the handler this was resolved from.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Looks up a parameter.
    pub fn get(&self, key: &str) -> Option<&ParamSignature> {
        self.params.get(key)
    }

    /// Parameters in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = &ParamSignature> {
        self.params.values()
    }

    /// Binding keys in resolution order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the handler takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters read from `kind`.
    pub fn of_kind(&self, kind: SourceKind) -> impl Iterator<Item = &ParamSignature> {
        self.params.values().filter(move |p| p.source.kind() == kind)
    }

    /// Number of body parameters.
    pub fn body_count(&self) -> usize {
        self.of_kind(SourceKind::Body).count()
    }
}

struct Resolver<'a> {
    rule: &'a str,
    handler: &'a str,
    params: IndexMap<String, ParamSignature>,
    seen: HashMap<&'a str, &'a HandlerSignature>,
}

impl<'a> Resolver<'a> {
    /// Records `dependency` under its name. `false` when the same signature
    /// was already spliced.
    fn enter(&mut self, dependency: &'a HandlerSignature) -> ConfigResult<bool> {
        match self.seen.get(dependency.name()) {
            None => {
                self.seen.insert(dependency.name(), dependency);
                Ok(true)
            }
            Some(existing) if std::ptr::eq(*existing, dependency) || **existing == *dependency => Ok(false),
            Some(_) => Err(ConfigError::DependencyConflict {
                name: dependency.name().to_string(),
                handler: self.handler.to_string(),
            }),
        }
    }

    fn collect(&mut self, signature: &'a HandlerSignature) -> ConfigResult<()> {
        for declared in signature.params() {
            let source = match &declared.default {
                ParamDefault::Depends(dependency) => {
                    if self.enter(dependency)? {
                        trace!(dependency = dependency.name(), "splicing dependency");
                        self.collect(dependency)?;
                    }
                    continue;
                }
                ParamDefault::Source(source) => source.clone(),
                ParamDefault::Plain(value) => ParamSource::query(value.clone()),
                ParamDefault::Missing => ParamSource::query_required(),
            };
            self.insert(declared, source)?;
        }
        Ok(())
    }

    fn insert(&mut self, declared: &DeclaredParam, mut source: ParamSource) -> ConfigResult<()> {
        if check_params_in_path(&declared.name, self.rule)? {
            source = source.into_path();
        }

        let ty = declared.ty.clone().unwrap_or(if source.kind().is_form_family() {
            TypeDesc::Any
        } else {
            TypeDesc::String
        });

        if !source.kind().is_form_family() {
            if let Some(model) = ty.structured() {
                source = source.into_body(Some(Arc::clone(model)));
            }
        }

        if self.params.contains_key(&declared.name) {
            return Err(ConfigError::DuplicateParameter {
                key: declared.name.clone(),
                handler: self.handler.to_string(),
            });
        }

        self.params.insert(
            declared.name.clone(),
            ParamSignature {
                name: declared.name.clone(),
                ty,
                source,
            },
        );
        Ok(())
    }
}

/// Resolves `signature` mounted on `rule`, then every router-level
/// dependency in `dependencies`.
///
/// A dependency reached more than once is spliced in once. Dependencies
/// are told apart by name; two reached under one name must be the same
/// signature. Resolution has no side effects: the same inputs always give
/// an equal result.
///
/// # Errors
///
/// - [`ConfigError::Rule`] if a parameter name appears in more than one
///   placeholder of `rule`, or the rule is malformed
/// - [`ConfigError::DuplicateParameter`] if two parameters share a key
/// - [`ConfigError::DependencyConflict`] if two different signatures, the
///   handler included, share a name
pub fn resolve(
    signature: &HandlerSignature,
    rule: &str,
    dependencies: &[Arc<HandlerSignature>],
) -> ConfigResult<ResolvedSignature> {
    let mut resolver = Resolver {
        rule,
        handler: signature.name(),
        params: IndexMap::new(),
        seen: HashMap::new(),
    };
    resolver.enter(signature)?;
    resolver.collect(signature)?;

    for dependency in dependencies {
        if resolver.enter(dependency)? {
            resolver.collect(dependency)?;
        }
    }

    Ok(ResolvedSignature {
        handler: signature.name().to_string(),
        params: resolver.params,
    })
}
