//! OpenAPI document generation from the endpoint registry.

use heron::binding::ParamSignature;
use heron::config::DocsConfig;
use heron::core::{carries_body, SecurityRequirement, SourceKind};
use heron::{EndpointDescriptor, EndpointRegistry, ResponseSpec};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::error::{DocsError, DocsResult};
use crate::openapi::{
    self, Components, Contact, Info, License, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem,
    RequestBody, Response, Schema, SecurityScheme, Server, Tag,
};
use crate::schema::{title_case, SchemaConverter};

const JSON: &str = "application/json";
const MULTIPART: &str = "multipart/form-data";
const URLENCODED: &str = "application/x-www-form-urlencoded";

/// Builds an [`OpenApi`] document from an [`EndpointRegistry`].
///
/// # Example
///
/// ```rust
/// use heron::prelude::*;
/// use heron_docs::OpenApiGenerator;
///
/// let mut router: ApiRouter<()> = ApiRouter::new("items");
/// router
///     .get(
///         "/items/<int:item_id>",
///         HandlerSignature::new("get_item").param("item_id", TypeDesc::Integer, ParamDefault::Missing),
///         |_| (),
///     )
///     .unwrap();
///
/// let mut registry = EndpointRegistry::new();
/// registry.mount(&router).unwrap();
///
/// let doc = OpenApiGenerator::new().title("Shop").version("1.0.0").generate(&registry).unwrap();
/// assert!(doc.paths.contains_key("/items/{item_id}"));
/// ```
#[derive(Debug, Clone)]
pub struct OpenApiGenerator {
    title: String,
    version: String,
    description: Option<String>,
    openapi_version: String,
    servers: Vec<Server>,
    contact: Option<Contact>,
    license: Option<License>,
}

impl Default for OpenApiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiGenerator {
    /// Create a new generator with the default document settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&DocsConfig::default())
    }

    /// Create a generator from the `docs` configuration section.
    #[must_use]
    pub fn from_config(config: &DocsConfig) -> Self {
        Self {
            title: config.title.clone(),
            version: config.version.clone(),
            description: config.description.clone(),
            openapi_version: config.openapi_version.clone(),
            servers: Vec::new(),
            contact: None,
            license: None,
        }
    }

    /// Set the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the OpenAPI version written out. `3.0.x` switches nullability to `nullable`.
    #[must_use]
    pub fn openapi_version(mut self, version: impl Into<String>) -> Self {
        self.openapi_version = version.into();
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Set contact information.
    #[must_use]
    pub fn contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    /// Set license information.
    #[must_use]
    pub fn license(mut self, name: impl Into<String>, url: Option<String>) -> Self {
        self.license = Some(License { name: name.into(), url });
        self
    }

    /// Generate a document covering every documented endpoint.
    ///
    /// # Errors
    ///
    /// - [`DocsError::InvalidOperation`] when a path and method are documented
    ///   twice or a hand-written operation does not parse
    /// - [`DocsError::SchemaConversionError`] when a response schema does not parse
    pub fn generate(&self, registry: &EndpointRegistry) -> DocsResult<OpenApi> {
        let mut converter = SchemaConverter::new(&self.openapi_version);
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut tags: IndexSet<String> = IndexSet::new();
        let mut security_schemes: IndexMap<String, SecurityScheme> = IndexMap::new();

        for descriptor in registry.documented() {
            let operation_id = operation_id(descriptor);
            let operation = match descriptor.custom_docs() {
                Some(custom) => custom_operation(&operation_id, custom)?,
                None => build_operation(descriptor, operation_id.clone(), &mut converter)?,
            };

            if let Some(requirement) = descriptor.security() {
                security_schemes
                    .entry(requirement.scheme_name().to_string())
                    .or_insert_with(|| security_scheme(requirement));
            }
            tags.extend(operation.tags.iter().cloned());

            let item = paths.entry(descriptor.path().to_string()).or_default();
            let slot = item.slot_mut(descriptor.method()).ok_or_else(|| DocsError::InvalidOperation {
                operation_id: operation_id.clone(),
                reason: format!("method {} cannot be documented", descriptor.method()),
            })?;
            if slot.is_some() {
                return Err(DocsError::InvalidOperation {
                    operation_id,
                    reason: format!("{} {} is documented twice", descriptor.method(), descriptor.path()),
                });
            }
            *slot = Some(operation);
        }

        let components = Components {
            schemas: converter.into_components(),
            security_schemes,
        };

        Ok(OpenApi {
            openapi: self.openapi_version.clone(),
            info: Info {
                title: self.title.clone(),
                version: self.version.clone(),
                description: self.description.clone(),
                contact: self.contact.clone(),
                license: self.license.clone(),
            },
            servers: self.servers.clone(),
            paths,
            components: (!components.is_empty()).then_some(components),
            tags: tags.into_iter().map(|name| Tag { name, description: None }).collect(),
        })
    }

    /// Generate the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Anything [`generate`](Self::generate) fails with, or a serialization error.
    pub fn generate_json(&self, registry: &EndpointRegistry) -> DocsResult<String> {
        let doc = self.generate(registry)?;
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

fn build_operation(
    descriptor: &EndpointDescriptor,
    operation_id: String,
    converter: &mut SchemaConverter,
) -> DocsResult<Operation> {
    let signature = descriptor.signature();

    let parameters = signature
        .iter()
        .filter_map(|param| {
            let location = match param.source.kind() {
                SourceKind::Path => ParameterIn::Path,
                SourceKind::Query => ParameterIn::Query,
                SourceKind::Header => ParameterIn::Header,
                _ => return None,
            };
            Some(parameter(param, location, converter))
        })
        .collect();

    let request_body = if carries_body(descriptor.method()) {
        request_body(descriptor, converter)
    } else {
        None
    };

    let mut responses = IndexMap::new();
    for (status, spec) in descriptor.responses() {
        responses.insert(status.to_string(), response(&operation_id, *status, spec)?);
    }

    let security = descriptor
        .security()
        .map(|requirement| {
            let mut entry = openapi::SecurityRequirement::new();
            entry.insert(requirement.scheme_name().to_string(), Vec::new());
            vec![entry]
        })
        .unwrap_or_default();

    Ok(Operation {
        operation_id: Some(operation_id),
        summary: Some(descriptor.summary().to_string()),
        description: Some(descriptor.description().to_string()),
        tags: descriptor.tags().to_vec(),
        deprecated: false,
        parameters,
        request_body,
        responses,
        security,
        extensions: IndexMap::new(),
    })
}


/// `shop.item` + GET → `shop.item_get`.
fn operation_id(descriptor: &EndpointDescriptor) -> String {
    format!(
        "{}_{}",
        descriptor.endpoint(),
        descriptor.method().as_str().to_ascii_lowercase()
    )
}

fn custom_operation(operation_id: &str, custom: &Value) -> DocsResult<Operation> {
    serde_json::from_value(custom.clone()).map_err(|e| DocsError::InvalidOperation {
        operation_id: operation_id.to_string(),
        reason: format!("custom documentation is not an operation: {e}"),
    })
}

fn parameter(param: &ParamSignature, location: ParameterIn, converter: &mut SchemaConverter) -> Parameter {
    let source = &param.source;
    let mut schema = converter.convert_constrained(&param.ty, source.constraints(), source.default_value());
    schema.title = Some(
        source
            .title_text()
            .map_or_else(|| title_case(&param.name), str::to_string),
    );
    Parameter {
        name: param.wire_name().to_string(),
        location,
        description: source.description_text().map(str::to_string),
        required: location == ParameterIn::Path || source.is_required(),
        deprecated: source.is_deprecated(),
        schema: Some(schema),
        example: source.example_value().cloned(),
    }
}

fn property(param: &ParamSignature, converter: &mut SchemaConverter) -> Schema {
    let source = &param.source;
    let mut schema = converter.convert_constrained(&param.ty, source.constraints(), source.default_value());
    if schema.reference.is_none() {
        schema.title = Some(
            source
                .title_text()
                .map_or_else(|| title_case(&param.name), str::to_string),
        );
        schema.description = source.description_text().map(str::to_string);
        schema.example = source.example_value().cloned();
        schema.deprecated = source.is_deprecated();
    }
    schema
}

fn request_body(descriptor: &EndpointDescriptor, converter: &mut SchemaConverter) -> Option<RequestBody> {
    let signature = descriptor.signature();
    let bodies: Vec<&ParamSignature> = signature.of_kind(SourceKind::Body).collect();
    let forms: Vec<&ParamSignature> = signature
        .iter()
        .filter(|p| matches!(p.source.kind(), SourceKind::Form | SourceKind::FormEncoded | SourceKind::File))
        .collect();

    let mut content = IndexMap::new();
    let mut required = false;

    if let [single] = bodies.as_slice() {
        if let Some(model) = single.ty.structured() {
            let schema = converter.model(model);
            content.insert(JSON.to_string(), media(schema));
            required = single.source.is_required();
        }
    }
    if content.is_empty() && !bodies.is_empty() {
        let schema = object_of(&bodies, converter);
        required = !schema.required.is_empty();
        content.insert(JSON.to_string(), media(schema));
    }

    if !forms.is_empty() {
        let media_type = if forms.iter().all(|p| p.source.kind() == SourceKind::FormEncoded) {
            URLENCODED
        } else {
            MULTIPART
        };
        let schema = object_of(&forms, converter);
        required |= !schema.required.is_empty();
        content.insert(media_type.to_string(), media(schema));
    }

    (!content.is_empty()).then(|| RequestBody {
        description: None,
        required,
        content,
    })
}

fn object_of(params: &[&ParamSignature], converter: &mut SchemaConverter) -> Schema {
    params.iter().fold(Schema::object(), |schema, param| {
        let property = property(param, converter);
        schema.property(param.wire_name(), property, param.source.is_required())
    })
}

const fn media(schema: Schema) -> MediaType {
    MediaType {
        schema: Some(schema),
        example: None,
    }
}

fn response(operation_id: &str, status: u16, spec: &ResponseSpec) -> DocsResult<Response> {
    let schema: Schema = serde_json::from_value(spec.schema.clone()).map_err(|e| DocsError::SchemaConversionError {
        context: format!("response {status} of {operation_id}"),
        reason: e.to_string(),
    })?;
    let mut content = IndexMap::new();
    content.insert(
        JSON.to_string(),
        MediaType {
            schema: Some(schema),
            example: spec.example.clone(),
        },
    );
    Ok(Response {
        description: spec.description.clone(),
        content,
    })
}

fn security_scheme(requirement: &SecurityRequirement) -> SecurityScheme {
    match requirement {
        SecurityRequirement::Bearer { .. } => SecurityScheme::bearer(),
        SecurityRequirement::ApiKeyHeader { header, .. } => SecurityScheme::api_key_header(header.clone()),
    }
}
