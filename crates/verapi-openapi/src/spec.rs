//! OpenAPI specification types
//!
//! Serialization order is fixed so that two builds of the same document are
//! byte-identical: `paths` keep insertion (route table) order, response codes
//! and component schemas are sorted by key.

use http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// OpenAPI version emitted when the application does not override it
pub const DEFAULT_OPENAPI_VERSION: &str = "3.1.0";

/// Contact information for the exposed API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Contact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// License information for the exposed API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl License {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            url: None,
        }
    }

    /// SPDX license expression
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Server entry of the `servers` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// External documentation link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Globally declared tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            external_docs: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn external_docs(mut self, url: impl Into<String>) -> Self {
        self.external_docs = Some(ExternalDocs {
            url: url.into(),
            description: None,
        });
        self
    }
}

/// API information for OpenAPI spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    pub version: String,
}

/// Reusable components
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, serde_json::Value>,
}

impl Components {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// OpenAPI specification document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,
    pub info: ApiInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default, skip_serializing_if = "Components::is_empty")]
    pub components: Components,
    /// `None` when the application declares no tag catalogue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

/// Path item in OpenAPI spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: &Method) -> Option<&mut Option<Operation>> {
        let slot = match *method {
            Method::GET => &mut self.get,
            Method::PUT => &mut self.put,
            Method::POST => &mut self.post,
            Method::DELETE => &mut self.delete,
            Method::OPTIONS => &mut self.options,
            Method::HEAD => &mut self.head,
            Method::PATCH => &mut self.patch,
            Method::TRACE => &mut self.trace,
            _ => return None,
        };
        Some(slot)
    }

    /// Set the operation for `method` unless one is already documented.
    ///
    /// Returns `false` when the slot was taken (first registration wins) or
    /// the method has no slot in a path item.
    pub fn insert(&mut self, method: &Method, operation: Operation) -> bool {
        match self.slot(method) {
            Some(slot @ None) => {
                *slot = Some(operation);
                true
            }
            _ => false,
        }
    }

    /// All documented operations in serialization order
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        [
            &self.get,
            &self.put,
            &self.post,
            &self.delete,
            &self.options,
            &self.head,
            &self.patch,
            &self.trace,
        ]
        .into_iter()
        .filter_map(Option::as_ref)
    }
}

/// Operation (endpoint) in OpenAPI spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, ResponseSpec>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Component schemas referenced by this operation, merged into the
    /// document's `components` when the operation is added to a spec
    #[serde(skip)]
    pub schemas: BTreeMap<String, serde_json::Value>,
}

/// Parameter in OpenAPI spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: SchemaRef,
}

/// Request body in OpenAPI spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

/// Media type in OpenAPI spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: SchemaRef,
}

/// Response specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResponseSpec {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// Schema reference or inline schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(serde_json::Value),
}

impl SchemaRef {
    /// Reference to `#/components/schemas/{name}`
    pub fn component(name: &str) -> Self {
        SchemaRef::Ref {
            reference: format!("#/components/schemas/{}", name),
        }
    }
}

impl OpenApiSpec {
    /// Create a new OpenAPI specification
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: DEFAULT_OPENAPI_VERSION.to_string(),
            info: ApiInfo {
                title: title.into(),
                summary: None,
                description: None,
                terms_of_service: None,
                contact: None,
                license: None,
                version: version.into(),
            },
            servers: Vec::new(),
            paths: IndexMap::new(),
            components: Components::default(),
            tags: None,
        }
    }

    /// Set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.info.description = Some(desc.into());
        self
    }

    /// Add a path operation
    pub fn path(mut self, path: &str, method: &Method, operation: Operation) -> Self {
        self.add_operation(path, method, operation);
        self
    }

    /// Document `operation` under `path`, merging the schemas it references.
    ///
    /// An already documented path/method pair is left untouched.
    pub fn add_operation(&mut self, path: &str, method: &Method, mut operation: Operation) -> bool {
        let schemas = std::mem::take(&mut operation.schemas);
        let inserted = self
            .paths
            .entry(path.to_string())
            .or_default()
            .insert(method, operation);
        if inserted {
            for (name, schema) in schemas {
                self.components.schemas.entry(name).or_insert(schema);
            }
        }
        inserted
    }

    /// Add a schema definition
    pub fn schema(mut self, name: &str, schema: serde_json::Value) -> Self {
        self.components.schemas.insert(name.to_string(), schema);
        self
    }

    /// Register a type that implements Schema (utoipa::ToSchema)
    pub fn register<T: for<'a> utoipa::ToSchema<'a>>(mut self) -> Self {
        let (name, schema) = schema_of::<T>();
        if let Some(schema) = schema {
            self.components.schemas.insert(name, schema);
        }
        self
    }

    /// Names of the tags referenced by at least one operation
    pub fn used_tags(&self) -> HashSet<&str> {
        self.paths
            .values()
            .flat_map(PathItem::operations)
            .flat_map(|op| op.tags.iter().map(String::as_str))
            .collect()
    }

    /// Drop globally declared tags that no operation references.
    ///
    /// Declaration order of the remaining tags is preserved.
    pub fn retain_used_tags(&mut self) {
        let used: HashSet<String> = self.used_tags().into_iter().map(str::to_string).collect();
        if let Some(tags) = self.tags.as_mut() {
            tags.retain(|tag| used.contains(&tag.name));
        }
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Serialize to the compact JSON body served to clients
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// JSON schema of a `ToSchema` type, keyed by its component name
pub(crate) fn schema_of<T: for<'a> utoipa::ToSchema<'a>>() -> (String, Option<serde_json::Value>) {
    let (name, schema) = T::schema();
    (name.to_string(), serde_json::to_value(schema).ok())
}

impl Operation {
    /// Create a new operation
    pub fn new() -> Self {
        Self {
            tags: Vec::new(),
            summary: None,
            description: None,
            operation_id: None,
            parameters: None,
            request_body: None,
            responses: BTreeMap::from([(
                "200".to_string(),
                ResponseSpec {
                    description: "Successful Response".to_string(),
                    content: None,
                },
            )]),
            deprecated: false,
            schemas: BTreeMap::new(),
        }
    }

    /// Set summary
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Add tags
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Add a single tag, ignoring duplicates
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Mark the operation as deprecated
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// Document a response without body
    pub fn response(mut self, status: u16, description: impl Into<String>) -> Self {
        self.responses.insert(
            status.to_string(),
            ResponseSpec {
                description: description.into(),
                content: None,
            },
        );
        self
    }

    /// Document a JSON request body of type `T`
    pub fn json_body<T: for<'a> utoipa::ToSchema<'a>>(mut self) -> Self {
        let (name, schema) = schema_of::<T>();
        self.request_body = Some(RequestBody {
            required: true,
            content: BTreeMap::from([(
                "application/json".to_string(),
                MediaType {
                    schema: SchemaRef::component(&name),
                },
            )]),
        });
        if let Some(schema) = schema {
            self.schemas.insert(name, schema);
        }
        self
    }

    /// Document a JSON response of type `T` for `status`.
    ///
    /// Documenting a non-200 success status replaces the default
    /// `200 Successful Response` entry.
    pub fn json_response<T: for<'a> utoipa::ToSchema<'a>>(mut self, status: u16) -> Self {
        let (name, schema) = schema_of::<T>();
        if status != 200 && (200..300).contains(&status) {
            self.responses.remove("200");
        }
        self.responses.insert(
            status.to_string(),
            ResponseSpec {
                description: "Successful Response".to_string(),
                content: Some(BTreeMap::from([(
                    "application/json".to_string(),
                    MediaType {
                        schema: SchemaRef::component(&name),
                    },
                )])),
            },
        );
        if let Some(schema) = schema {
            self.schemas.insert(name, schema);
        }
        self
    }

    /// Add a path parameter unless one with the same name exists
    pub fn path_parameter(mut self, name: impl Into<String>) -> Self {
        self.add_path_parameter(name.into());
        self
    }

    pub(crate) fn add_path_parameter(&mut self, name: String) {
        let params = self.parameters.get_or_insert_with(Vec::new);
        if params.iter().any(|p| p.location == "path" && p.name == name) {
            return;
        }
        params.push(Parameter {
            name,
            location: "path".to_string(),
            required: true,
            description: None,
            schema: SchemaRef::Inline(serde_json::json!({ "type": "string" })),
        });
    }
}

impl Default for Operation {
    fn default() -> Self {
        Self::new()
    }
}
