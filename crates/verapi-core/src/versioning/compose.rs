//! Prefixed route groups, one per version

use super::config::VersioningConfig;
use super::label::VersionLabel;
use crate::error::BuildError;
use crate::router::{Route, RouteGroup};
use bytes::Bytes;
use http::Method;
use verapi_openapi::{OpenApiConfig, RouteDoc, VersionedSpecBuilder};

/// Mount the routes of `version` under its prefix
///
/// The routes keep their own paths and handlers: only the mount prefix
/// changes. When the application serves an OpenAPI document, the group
/// also serves the document of this version at the same relative URL.
pub fn compose(
    version: &VersionLabel,
    routes: &[Route],
    config: &VersioningConfig,
    openapi: &OpenApiConfig,
) -> Result<RouteGroup, BuildError> {
    let mut group = RouteGroup::new(config.prefix(version));
    for route in routes {
        group.push(route.clone());
    }

    if let Some(openapi_url) = openapi.openapi_url.as_deref() {
        let docs: Vec<RouteDoc> = group
            .routes()
            .iter()
            .filter(|route| route.include_in_schema() && !route.is_internal())
            .map(Route::doc)
            .collect();

        let spec = VersionedSpecBuilder::new(config.templates())
            .filter_tags(config.filter_tags)
            .build(openapi, version.as_str(), &docs);
        let body = Bytes::from(spec.to_json_bytes()?);

        group.push(Route::internal(Method::GET, openapi_url, move || {
            let body = body.clone();
            async move { verapi_openapi::openapi_json(body) }
        }));
    }

    Ok(group)
}
