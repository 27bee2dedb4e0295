//! Swagger UI page with a version selector

use super::config::VersioningConfig;
use super::label::VersionLabel;
use tracing::warn;
use verapi_openapi::{OpenApiConfig, SpecUrl, SwaggerPage};

pub(crate) const ALL_ROUTES: &str = "All Routes";

pub(crate) fn entry_name(version: &VersionLabel) -> String {
    format!("Version {}", version)
}

/// Build the docs page listing the document of each version
///
/// `versions` must already be sorted. URLs are relative to the root path
/// of the application; [`SwaggerPage::render`] prefixes them per request.
pub fn docs_page(
    versions: &[VersionLabel],
    config: &VersioningConfig,
    openapi: &OpenApiConfig,
) -> Option<SwaggerPage> {
    let openapi_url = openapi.openapi_url.as_deref()?;

    let mut urls = Vec::with_capacity(versions.len() + 1);
    if config.include_all_routes {
        urls.push(SpecUrl::new(ALL_ROUTES, openapi_url));
    }
    for version in versions {
        urls.push(SpecUrl::new(
            entry_name(version),
            format!("{}{}", config.prefix(version), openapi_url),
        ));
    }

    let mut page = SwaggerPage::new(format!("{} - Swagger UI", openapi.title), openapi_url)
        .urls(urls)
        .parameters(&openapi.swagger_ui_parameters)
        .oauth2_redirect_url(openapi.oauth2_redirect_url.clone())
        .assets(config.assets());

    if let Some(primary) = &config.primary_swagger_version {
        if versions.contains(primary) {
            page = page.primary(entry_name(primary));
        } else {
            warn!(version = %primary, "Primary docs version has no routes, using the first entry");
        }
    }

    Some(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<VersionLabel> {
        raw.iter().map(|l| VersionLabel::from(*l)).collect()
    }

    fn names(page: &SwaggerPage) -> Vec<&str> {
        page.spec_urls().iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn lists_aggregate_then_versions() {
        let page = docs_page(
            &labels(&["1", "2"]),
            &VersioningConfig::default(),
            &OpenApiConfig::new("Bakery", "1.0.0"),
        )
        .unwrap();

        assert_eq!(names(&page), vec!["All Routes", "Version 1", "Version 2"]);
        assert_eq!(page.spec_urls()[2].url, "/v2/openapi.json");
        assert_eq!(page.title(), "Bakery - Swagger UI");
    }

    #[test]
    fn aggregate_entry_is_optional() {
        let config = VersioningConfig::new()
            .include_all_routes(false)
            .prefix_format("/version{version}");
        let page = docs_page(&labels(&["1", "2"]), &config, &OpenApiConfig::default()).unwrap();

        assert_eq!(names(&page), vec!["Version 1", "Version 2"]);
        assert_eq!(page.spec_urls()[0].url, "/version1/openapi.json");
    }

    #[test]
    fn primary_version_is_selected() {
        let config = VersioningConfig::new().primary_swagger_version(2);
        let page = docs_page(&labels(&["1", "2"]), &config, &OpenApiConfig::default()).unwrap();

        assert!(page.render("").contains(r#""urls.primaryName": "Version 2""#));
    }

    #[test]
    fn unknown_primary_version_is_ignored() {
        let config = VersioningConfig::new().primary_swagger_version(7);
        let page = docs_page(&labels(&["1"]), &config, &OpenApiConfig::default()).unwrap();

        assert!(!page.render("").contains("urls.primaryName"));
    }

    #[test]
    fn no_page_without_openapi_document() {
        let openapi = OpenApiConfig::default().disable_openapi();
        assert!(docs_page(&labels(&["1"]), &VersioningConfig::default(), &openapi).is_none());
    }
}
