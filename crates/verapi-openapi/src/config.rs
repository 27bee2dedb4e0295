//! OpenAPI configuration

use crate::spec::{Contact, License, Server, Tag, DEFAULT_OPENAPI_VERSION};
use indexmap::IndexMap;

/// Application metadata and documentation endpoints
#[derive(Debug, Clone)]
pub struct OpenApiConfig {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    pub description: Option<String>,
    /// Short API summary
    pub summary: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
    /// Value of the document's `openapi` field
    pub openapi_version: String,
    /// Tag catalogue, `None` leaves `tags` out of the document
    pub tags: Option<Vec<Tag>>,
    pub servers: Vec<Server>,
    /// Path to serve OpenAPI JSON, `None` disables it
    pub openapi_url: Option<String>,
    /// Path to serve Swagger UI, `None` disables it
    pub docs_url: Option<String>,
    /// Path of the Swagger UI OAuth2 redirect page
    pub oauth2_redirect_url: Option<String>,
    /// Extra `SwaggerUIBundle` parameters
    pub swagger_ui_parameters: IndexMap<String, serde_json::Value>,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            title: "VerAPI".to_string(),
            version: "0.1.0".to_string(),
            description: None,
            summary: None,
            terms_of_service: None,
            contact: None,
            license: None,
            openapi_version: DEFAULT_OPENAPI_VERSION.to_string(),
            tags: None,
            servers: Vec::new(),
            openapi_url: Some("/openapi.json".to_string()),
            docs_url: Some("/docs".to_string()),
            oauth2_redirect_url: Some("/docs/oauth2-redirect".to_string()),
            swagger_ui_parameters: IndexMap::new(),
        }
    }
}

impl OpenApiConfig {
    /// Create a new OpenAPI configuration
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Set API description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set API summary
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn terms_of_service(mut self, url: impl Into<String>) -> Self {
        self.terms_of_service = Some(url.into());
        self
    }

    pub fn contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn license(mut self, license: License) -> Self {
        self.license = Some(license);
        self
    }

    pub fn openapi_version(mut self, version: impl Into<String>) -> Self {
        self.openapi_version = version.into();
        self
    }

    /// Declare a tag in the document's tag catalogue
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag);
        self
    }

    pub fn server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    /// Set path for OpenAPI JSON endpoint
    pub fn openapi_url(mut self, path: impl Into<String>) -> Self {
        self.openapi_url = Some(path.into());
        self
    }

    /// Stop serving the OpenAPI JSON. Also disables the docs page.
    pub fn disable_openapi(mut self) -> Self {
        self.openapi_url = None;
        self
    }

    /// Set path for Swagger UI docs
    pub fn docs_url(mut self, path: impl Into<String>) -> Self {
        self.docs_url = Some(path.into());
        self
    }

    pub fn disable_docs(mut self) -> Self {
        self.docs_url = None;
        self
    }

    pub fn oauth2_redirect_url(mut self, path: impl Into<String>) -> Self {
        self.oauth2_redirect_url = Some(path.into());
        self
    }

    pub fn disable_oauth2_redirect(mut self) -> Self {
        self.oauth2_redirect_url = None;
        self
    }

    /// Add a `SwaggerUIBundle` parameter such as `syntaxHighlight.theme`
    pub fn swagger_ui_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.swagger_ui_parameters.insert(key.into(), value.into());
        self
    }
}
