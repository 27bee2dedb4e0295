//! OpenAPI documentation for VerAPI
//!
//! This crate provides the OpenAPI 3.1 document model, the builder turning a
//! route listing into a document (aggregate or scoped to one API version) and
//! the Swagger UI page with its version selector. It knows nothing about
//! routing: callers hand it [`RouteDoc`]s.
//!
//! # Usage
//!
//! ```rust
//! use http::Method;
//! use verapi_openapi::{
//!     DocumentTemplates, OpenApiConfig, Operation, RouteDoc, VersionedSpecBuilder,
//! };
//!
//! let config = OpenApiConfig::new("Bakery", "1.0.0").description("Fresh every day");
//! let route = RouteDoc::new("/v1/cookies", Method::GET, Operation::new()).name("list_cookies");
//! let routes = vec![route];
//!
//! let spec = VersionedSpecBuilder::new(DocumentTemplates::default()).build(&config, "1", &routes);
//! assert_eq!(spec.info.description.as_deref(), Some("## Route version 1\nFresh every day"));
//! ```

mod builder;
mod config;
mod spec;
#[cfg(feature = "swagger-ui")]
mod swagger;

pub use builder::{
    build_spec, operation_id, path_params, render_template, title_case, DocumentTemplates,
    RouteDoc, VersionedSpecBuilder,
};
pub use config::OpenApiConfig;
pub use spec::{
    ApiInfo, Components, Contact, ExternalDocs, License, MediaType, OpenApiSpec, Operation,
    Parameter, PathItem, RequestBody, ResponseSpec, SchemaRef, Server, Tag,
    DEFAULT_OPENAPI_VERSION,
};
#[cfg(feature = "swagger-ui")]
pub use swagger::{oauth2_redirect_html, SpecUrl, SwaggerAssets, SwaggerPage};

// Re-export utoipa's ToSchema derive macro as Schema
pub use utoipa::ToSchema as Schema;

// Re-export utoipa types for advanced usage
pub mod utoipa_types {
    pub use utoipa::{openapi, IntoParams, ToSchema};
}

use bytes::Bytes;
use http::{header, HeaderValue, Response};
use http_body_util::Full;

/// Serve an already serialized OpenAPI document
pub fn openapi_json(body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

