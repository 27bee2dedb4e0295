//! Versioning configuration

use super::label::VersionLabel;
use crate::error::BuildError;
use serde::{Deserialize, Deserializer};
use verapi_openapi::{DocumentTemplates, SwaggerAssets};

/// Configuration of the versioning pass
///
/// Every field has a default, so `VersioningConfig::default()` gives
/// `/v{version}` prefixes with `1` as the version of untagged routes.
///
/// # Environment
///
/// [`VersioningConfig::from_env`] reads `VERAPI_`-prefixed variables named
/// after the fields (`VERAPI_PREFIX_FORMAT`, `VERAPI_FILTER_TAGS`, ...).
/// Lists are comma separated. `VERAPI_DEFAULT_VERSION=none` (or empty)
/// leaves untagged routes unversioned.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Version of routes without a version tag, `None` leaves them in place
    #[serde(deserialize_with = "deserialize_default_version")]
    pub default_version: Option<VersionLabel>,
    /// Path prefix of a version, must contain `{version}`
    pub prefix_format: String,
    /// List the aggregate document as "All Routes" in the docs dropdown
    pub include_all_routes: bool,
    /// Version selected when the docs page loads
    pub primary_swagger_version: Option<VersionLabel>,
    /// Drop catalogue tags no operation of the version uses
    pub filter_tags: bool,
    pub title_format: String,
    pub description_format: String,
    pub summary_format: String,
    pub swagger_js_urls: Vec<String>,
    pub swagger_css_urls: Vec<String>,
    pub swagger_favicon_url: Option<String>,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        let templates = DocumentTemplates::default();
        let assets = SwaggerAssets::default();
        Self {
            default_version: Some(VersionLabel::from("1")),
            prefix_format: "/v{version}".to_string(),
            include_all_routes: true,
            primary_swagger_version: None,
            filter_tags: false,
            title_format: templates.title_format,
            description_format: templates.description_format,
            summary_format: templates.summary_format,
            swagger_js_urls: assets.js_urls,
            swagger_css_urls: assets.css_urls,
            swagger_favicon_url: assets.favicon_url,
        }
    }
}

fn deserialize_default_version<'de, D>(deserializer: D) -> Result<Option<VersionLabel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
        .map(VersionLabel::from))
}

impl VersioningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the configuration from `VERAPI_*` environment variables,
    /// reading a `.env` file first when one exists
    pub fn from_env() -> Result<Self, BuildError> {
        let _ = dotenvy::dotenv();
        Ok(envy::prefixed("VERAPI_").from_env::<Self>()?)
    }

    /// Load the configuration from `VERAPI_*` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed("VERAPI_").from_iter::<_, Self>(vars)?)
    }

    pub fn default_version(mut self, label: impl std::fmt::Display) -> Self {
        self.default_version = Some(VersionLabel::new(label));
        self
    }

    /// Leave untagged routes unversioned
    pub fn no_default_version(mut self) -> Self {
        self.default_version = None;
        self
    }

    pub fn prefix_format(mut self, format: impl Into<String>) -> Self {
        self.prefix_format = format.into();
        self
    }

    pub fn include_all_routes(mut self, include: bool) -> Self {
        self.include_all_routes = include;
        self
    }

    pub fn primary_swagger_version(mut self, label: impl std::fmt::Display) -> Self {
        self.primary_swagger_version = Some(VersionLabel::new(label));
        self
    }

    pub fn filter_tags(mut self, enabled: bool) -> Self {
        self.filter_tags = enabled;
        self
    }

    pub fn title_format(mut self, format: impl Into<String>) -> Self {
        self.title_format = format.into();
        self
    }

    pub fn description_format(mut self, format: impl Into<String>) -> Self {
        self.description_format = format.into();
        self
    }

    pub fn summary_format(mut self, format: impl Into<String>) -> Self {
        self.summary_format = format.into();
        self
    }

    pub fn swagger_js_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.swagger_js_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn swagger_css_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.swagger_css_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn swagger_favicon_url(mut self, url: impl Into<String>) -> Self {
        self.swagger_favicon_url = Some(url.into());
        self
    }

    /// Reject a prefix format that does not render one distinct absolute
    /// path per version
    ///
    /// An escaped `{{version}}` is literal text, so the format is rendered
    /// for two labels rather than searched. The prefix must start with `/`
    /// and must not end with one.
    pub fn validate(&self) -> Result<(), BuildError> {
        let first = self.prefix(&VersionLabel::from("1"));
        let second = self.prefix(&VersionLabel::from("2"));

        if first != second && first.starts_with('/') && !first.ends_with('/') {
            Ok(())
        } else {
            Err(BuildError::InvalidPrefixFormat {
                format: self.prefix_format.clone(),
            })
        }
    }

    /// Path prefix of `label`
    pub fn prefix(&self, label: &VersionLabel) -> String {
        verapi_openapi::render_template(&self.prefix_format, &[("version", label.as_str())])
    }

    pub fn templates(&self) -> DocumentTemplates {
        DocumentTemplates {
            title_format: self.title_format.clone(),
            description_format: self.description_format.clone(),
            summary_format: self.summary_format.clone(),
        }
    }

    pub fn assets(&self) -> SwaggerAssets {
        SwaggerAssets {
            js_urls: self.swagger_js_urls.clone(),
            css_urls: self.swagger_css_urls.clone(),
            favicon_url: self.swagger_favicon_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let config = VersioningConfig::default();
        assert_eq!(config.default_version, Some(VersionLabel::from("1")));
        assert_eq!(config.prefix_format, "/v{version}");
        assert!(config.include_all_routes);
        assert!(!config.filter_tags);
        assert_eq!(config.description_format, "## Route version {version}\n{description}");
        assert_eq!(config.swagger_js_urls.len(), 2);
    }

    #[test]
    fn prefix_substitutes_label() {
        let config = VersioningConfig::new().prefix_format("/version{version}");
        assert_eq!(config.prefix(&VersionLabel::new(2)), "/version2");
    }

    #[test]
    fn prefix_without_placeholder_is_rejected() {
        let config = VersioningConfig::new().prefix_format("/api");
        assert!(matches!(
            config.validate(),
            Err(BuildError::InvalidPrefixFormat { format }) if format == "/api"
        ));
    }

    #[test]
    fn escaped_placeholder_is_rejected() {
        let config = VersioningConfig::new().prefix_format("/v{{version}}");
        assert_eq!(config.prefix(&VersionLabel::new(1)), "/v{version}");
        assert!(matches!(
            config.validate(),
            Err(BuildError::InvalidPrefixFormat { .. })
        ));
    }

    #[test]
    fn prefix_must_be_an_absolute_path_without_trailing_slash() {
        for format in ["v{version}", "/v{version}/", "{version}", "/"] {
            let config = VersioningConfig::new().prefix_format(format);
            assert!(
                matches!(config.validate(), Err(BuildError::InvalidPrefixFormat { .. })),
                "format {:?}",
                format
            );
        }

        for format in ["/v{version}", "/{version}", "/api/v{version}", "/{{v}}{version}"] {
            let config = VersioningConfig::new().prefix_format(format);
            assert!(config.validate().is_ok(), "format {:?}", format);
        }
    }

    #[test]
    fn loads_from_variables() {
        let config = VersioningConfig::from_vars(vars(&[
            ("VERAPI_DEFAULT_VERSION", "2"),
            ("VERAPI_PREFIX_FORMAT", "/version{version}"),
            ("VERAPI_INCLUDE_ALL_ROUTES", "false"),
            ("VERAPI_FILTER_TAGS", "true"),
            ("VERAPI_SWAGGER_CSS_URLS", "https://a.example/ui.css,https://b.example/ui.css"),
            ("UNRELATED", "x"),
        ]))
        .unwrap();

        assert_eq!(config.default_version, Some(VersionLabel::from("2")));
        assert_eq!(config.prefix_format, "/version{version}");
        assert!(!config.include_all_routes);
        assert!(config.filter_tags);
        assert_eq!(config.swagger_css_urls.len(), 2);
        assert_eq!(config.title_format, "{title}");
    }

    #[test]
    fn none_default_version_means_unversioned() {
        for raw in ["none", "NONE", ""] {
            let config =
                VersioningConfig::from_vars(vars(&[("VERAPI_DEFAULT_VERSION", raw)])).unwrap();
            assert_eq!(config.default_version, None, "raw value {:?}", raw);
        }
    }

    #[test]
    fn missing_variables_keep_defaults() {
        let config = VersioningConfig::from_vars(Vec::new()).unwrap();
        assert_eq!(config, VersioningConfig::default());
    }

    #[test]
    fn malformed_variable_is_a_config_error() {
        let err = VersioningConfig::from_vars(vars(&[("VERAPI_FILTER_TAGS", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }

    proptest! {
        #[test]
        fn prefix_contains_label(label in "[a-z0-9.]{1,8}") {
            let config = VersioningConfig::default();
            let prefix = config.prefix(&VersionLabel::from(label.as_str()));
            prop_assert_eq!(prefix, format!("/v{}", label));
        }
    }
}
