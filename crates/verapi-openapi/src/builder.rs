//! Specification builder
//!
//! Turns a list of [`RouteDoc`]s into an [`OpenApiSpec`]. The aggregate
//! document uses the application metadata as-is, versioned documents run the
//! title, description and summary through [`DocumentTemplates`].

use crate::config::OpenApiConfig;
use crate::spec::{ApiInfo, Components, OpenApiSpec, Operation};
use http::Method;
use indexmap::IndexMap;

/// A documented route handed to the spec builder
#[derive(Debug, Clone)]
pub struct RouteDoc {
    /// Full path as served, including any mount prefix
    pub path: String,
    pub method: Method,
    /// Handler name used for the default summary and operation id
    pub name: Option<String>,
    pub operation: Operation,
}

impl RouteDoc {
    pub fn new(path: impl Into<String>, method: Method, operation: Operation) -> Self {
        Self {
            path: path.into(),
            method,
            name: None,
            operation,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Templates applied to the metadata of a per-version document.
///
/// Each template may reference `{version}` and its own field name
/// (`{title}`, `{description}`, `{summary}`). `{{` and `}}` produce literal
/// braces, unknown placeholders are kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTemplates {
    pub title_format: String,
    pub description_format: String,
    pub summary_format: String,
}

impl Default for DocumentTemplates {
    fn default() -> Self {
        Self {
            title_format: "{title}".to_string(),
            description_format: "## Route version {version}\n{description}".to_string(),
            summary_format: "{summary}".to_string(),
        }
    }
}

impl DocumentTemplates {
    pub fn title(&self, title: &str, version: &str) -> String {
        render_template(&self.title_format, &[("title", title), ("version", version)])
    }

    pub fn description(&self, description: &str, version: &str) -> String {
        render_template(
            &self.description_format,
            &[("description", description), ("version", version)],
        )
    }

    pub fn summary(&self, summary: &str, version: &str) -> String {
        render_template(&self.summary_format, &[("summary", summary), ("version", version)])
    }
}

/// Substitute `{name}` placeholders in a single pass.
///
/// Substituted values are never re-scanned, so a title containing
/// `{version}` stays literal.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                let key = &tail[1..end];
                match values.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
                continue;
            }
        }

        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}

/// Build the aggregate document for every documented route
pub fn build_spec(config: &OpenApiConfig, routes: &[RouteDoc]) -> OpenApiSpec {
    let info = ApiInfo {
        title: config.title.clone(),
        summary: config.summary.clone(),
        description: config.description.clone(),
        terms_of_service: config.terms_of_service.clone(),
        contact: config.contact.clone(),
        license: config.license.clone(),
        version: config.version.clone(),
    };
    assemble(config, info, routes)
}

/// Builder for the document of a single API version
#[derive(Debug, Clone, Default)]
pub struct VersionedSpecBuilder {
    templates: DocumentTemplates,
    filter_tags: bool,
}

impl VersionedSpecBuilder {
    pub fn new(templates: DocumentTemplates) -> Self {
        Self {
            templates,
            filter_tags: false,
        }
    }

    /// Only list catalogue tags that an operation of the version uses
    pub fn filter_tags(mut self, enabled: bool) -> Self {
        self.filter_tags = enabled;
        self
    }

    pub fn templates(&self) -> &DocumentTemplates {
        &self.templates
    }

    /// Build the document for `version` from the routes of its group
    pub fn build(
        &self,
        config: &OpenApiConfig,
        version: &str,
        routes: &[RouteDoc],
    ) -> OpenApiSpec {
        let info = ApiInfo {
            title: self.templates.title(&config.title, version),
            summary: config
                .summary
                .as_deref()
                .map(|s| self.templates.summary(s, version)),
            description: Some(
                self.templates
                    .description(config.description.as_deref().unwrap_or(""), version),
            ),
            terms_of_service: config.terms_of_service.clone(),
            contact: config.contact.clone(),
            license: config.license.clone(),
            version: config.version.clone(),
        };

        let mut spec = assemble(config, info, routes);
        if self.filter_tags {
            spec.retain_used_tags();
        }
        spec
    }
}

fn assemble(config: &OpenApiConfig, info: ApiInfo, routes: &[RouteDoc]) -> OpenApiSpec {
    let mut spec = OpenApiSpec {
        openapi: config.openapi_version.clone(),
        info,
        servers: config.servers.clone(),
        paths: IndexMap::new(),
        components: Components::default(),
        tags: config.tags.clone(),
    };

    for route in routes {
        let operation = document_operation(route);
        spec.add_operation(&route.path, &route.method, operation);
    }
    spec
}

/// Fill the defaults a route's operation leaves open
fn document_operation(route: &RouteDoc) -> Operation {
    let mut op = route.operation.clone();

    for param in path_params(&route.path) {
        op.add_path_parameter(param);
    }

    if let Some(name) = route.name.as_deref() {
        if op.summary.is_none() {
            op.summary = Some(title_case(name));
        }
        if op.operation_id.is_none() {
            op.operation_id = Some(operation_id(name, &route.path, &route.method));
        }
    }
    op
}

/// Parameter names of a `{param}` style path
pub fn path_params(path: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current: Option<String> = None;

    for ch in path.chars() {
        match (ch, current.as_mut()) {
            ('{', _) => current = Some(String::new()),
            ('}', Some(_)) => {
                if let Some(name) = current.take().filter(|n| !n.is_empty()) {
                    params.push(name);
                }
            }
            (_, Some(name)) => name.push(ch),
            _ => {}
        }
    }
    params
}

/// `list_items` -> `List Items`
pub fn title_case(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `{name}{path}_{method}` with every non-word character replaced by `_`
pub fn operation_id(name: &str, path: &str, method: &Method) -> String {
    let raw = format!("{}{}", name, path);
    let mut id: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    id.push('_');
    id.push_str(&method.as_str().to_lowercase());
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Tag;
    use proptest::prelude::*;

    fn docs() -> Vec<RouteDoc> {
        vec![
            RouteDoc::new("/v1/cookies", Method::GET, Operation::new().tag("Cookies"))
                .name("list_cookies"),
            RouteDoc::new("/v1/cookies/{cookie_id}", Method::DELETE, Operation::new())
                .name("delete_cookie"),
        ]
    }

    #[test]
    fn default_description_template() {
        let templates = DocumentTemplates::default();
        assert_eq!(
            templates.description("Bakery API", "2"),
            "## Route version 2\nBakery API"
        );
    }

    #[test]
    fn template_values_are_not_rescanned() {
        let rendered = render_template(
            "{title} v{version}",
            &[("title", "{version}"), ("version", "3")],
        );
        assert_eq!(rendered, "{version} v3");
    }

    #[test]
    fn template_keeps_unknown_placeholders_and_escapes() {
        let rendered = render_template("{{literal}} {unknown} {version}", &[("version", "1")]);
        assert_eq!(rendered, "{literal} {unknown} 1");
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(render_template("v{version", &[("version", "1")]), "v{version");
    }

    #[test]
    fn build_fills_summary_operation_id_and_path_params() {
        let config = OpenApiConfig::new("Bakery", "1.0.0");
        let spec = build_spec(&config, &docs());

        let list = spec.paths["/v1/cookies"].get.as_ref().unwrap();
        assert_eq!(list.summary.as_deref(), Some("List Cookies"));
        assert_eq!(list.operation_id.as_deref(), Some("list_cookies_v1_cookies_get"));

        let delete = spec.paths["/v1/cookies/{cookie_id}"].delete.as_ref().unwrap();
        assert_eq!(
            delete.operation_id.as_deref(),
            Some("delete_cookie_v1_cookies__cookie_id__delete")
        );
        let params = delete.parameters.as_ref().unwrap();
        assert_eq!(params[0].name, "cookie_id");
        assert_eq!(params[0].location, "path");
    }

    #[test]
    fn explicit_summary_is_kept() {
        let config = OpenApiConfig::default();
        let routes =
            vec![RouteDoc::new("/a", Method::GET, Operation::new().summary("Mine")).name("a")];
        let spec = build_spec(&config, &routes);
        assert_eq!(spec.paths["/a"].get.as_ref().unwrap().summary.as_deref(), Some("Mine"));
    }

    #[test]
    fn versioned_metadata_uses_templates() {
        let config = OpenApiConfig::new("Bakery", "1.0.0")
            .description("Fresh every day")
            .summary("Bread");
        let builder = VersionedSpecBuilder::new(DocumentTemplates {
            title_format: "{title} - v{version}".to_string(),
            description_format: "{description} ({version})".to_string(),
            summary_format: "[{version}] {summary}".to_string(),
        });

        let spec = builder.build(&config, "2", &docs());
        assert_eq!(spec.info.title, "Bakery - v2");
        assert_eq!(spec.info.description.as_deref(), Some("Fresh every day (2)"));
        assert_eq!(spec.info.summary.as_deref(), Some("[2] Bread"));
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn versioned_description_without_app_description() {
        let config = OpenApiConfig::new("Bakery", "1.0.0");
        let spec = VersionedSpecBuilder::default().build(&config, "1", &[]);
        assert_eq!(spec.info.description.as_deref(), Some("## Route version 1\n"));
        assert!(spec.info.summary.is_none());
    }

    #[test]
    fn tag_filtering_is_opt_in() {
        let config = OpenApiConfig::new("Bakery", "1.0.0")
            .tag(Tag::new("Cookies"))
            .tag(Tag::new("Cake"));

        let unfiltered = VersionedSpecBuilder::default().build(&config, "1", &docs());
        assert_eq!(unfiltered.tags.as_ref().unwrap().len(), 2);

        let filtered = VersionedSpecBuilder::default()
            .filter_tags(true)
            .build(&config, "1", &docs());
        let names: Vec<&str> = filtered
            .tags
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Cookies"]);
    }

    #[test]
    fn title_case_handles_mixed_input() {
        assert_eq!(title_case("get_ITEM_by_id"), "Get Item By Id");
        assert_eq!(title_case("health"), "Health");
        assert_eq!(title_case("__weird__name"), "Weird Name");
    }

    #[test]
    fn path_params_in_order() {
        assert_eq!(path_params("/users/{id}/posts/{post_id}"), vec!["id", "post_id"]);
        assert!(path_params("/plain").is_empty());
        assert!(path_params("/broken/{}").is_empty());
    }

    proptest! {
        #[test]
        fn operation_id_is_word_characters_only(
            name in "[a-z_]{1,12}",
            path in "(/[a-z{}._-]{0,8}){1,4}",
        ) {
            let id = operation_id(&name, &path, &Method::GET);
            prop_assert!(id.chars().all(|c| c.is_alphanumeric() || c == '_'));
            prop_assert!(id.ends_with("_get"));
            prop_assert!(id.starts_with(&name));
        }

        #[test]
        fn template_without_placeholders_is_identity(text in "[^{}]{0,40}") {
            prop_assert_eq!(render_template(&text, &[("version", "1")]), text);
        }
    }
}
