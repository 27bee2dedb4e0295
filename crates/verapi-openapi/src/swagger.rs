//! Swagger UI HTML generation
//!
//! A [`SwaggerPage`] is assembled once. Only the root path of the serving
//! context is applied when it is rendered, so the same page works behind a
//! reverse proxy or inside a mounted sub-application.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SWAGGER_UI_DIST: &str = "https://cdn.jsdelivr.net/npm/swagger-ui-dist@5";

/// Script, stylesheet and favicon URLs of the Swagger UI page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerAssets {
    /// Loaded in order; must define `SwaggerUIBundle` and `SwaggerUIStandalonePreset`
    pub js_urls: Vec<String>,
    pub css_urls: Vec<String>,
    pub favicon_url: Option<String>,
}

impl Default for SwaggerAssets {
    fn default() -> Self {
        Self {
            js_urls: vec![
                format!("{}/swagger-ui-bundle.js", SWAGGER_UI_DIST),
                format!("{}/swagger-ui-standalone-preset.js", SWAGGER_UI_DIST),
            ],
            css_urls: vec![format!("{}/swagger-ui.css", SWAGGER_UI_DIST)],
            favicon_url: Some(format!("{}/favicon-32x32.png", SWAGGER_UI_DIST)),
        }
    }
}

impl SwaggerAssets {
    pub fn js_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.js_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn css_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.css_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn favicon_url(mut self, url: impl Into<String>) -> Self {
        self.favicon_url = Some(url.into());
        self
    }
}

/// One entry of the spec selector dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecUrl {
    pub name: String,
    pub url: String,
}

impl SpecUrl {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Swagger UI page, either for a single spec or with a spec selector
#[derive(Debug, Clone)]
pub struct SwaggerPage {
    title: String,
    openapi_url: String,
    urls: Vec<SpecUrl>,
    primary_name: Option<String>,
    parameters: IndexMap<String, Value>,
    oauth2_redirect_url: Option<String>,
    assets: SwaggerAssets,
}

impl SwaggerPage {
    /// Page showing the document served at `openapi_url`
    pub fn new(title: impl Into<String>, openapi_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            openapi_url: openapi_url.into(),
            urls: Vec::new(),
            primary_name: None,
            parameters: IndexMap::new(),
            oauth2_redirect_url: None,
            assets: SwaggerAssets::default(),
        }
    }

    /// Replace the single document with a dropdown of documents.
    ///
    /// Switches the page to the `StandaloneLayout`, which renders the
    /// selector.
    pub fn urls(mut self, urls: Vec<SpecUrl>) -> Self {
        self.urls = urls;
        self
    }

    /// Name of the dropdown entry selected on load
    pub fn primary(mut self, name: impl Into<String>) -> Self {
        self.primary_name = Some(name.into());
        self
    }

    /// Extra `SwaggerUIBundle` parameters.
    ///
    /// Later calls override earlier keys. `urls`, `urls.primaryName` and
    /// `layout` of a dropdown page cannot be overridden.
    pub fn parameters(mut self, parameters: &IndexMap<String, Value>) -> Self {
        for (key, value) in parameters {
            self.parameters.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn oauth2_redirect_url(mut self, url: Option<String>) -> Self {
        self.oauth2_redirect_url = url;
        self
    }

    pub fn assets(mut self, assets: SwaggerAssets) -> Self {
        self.assets = assets;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Dropdown entries, without root path
    pub fn spec_urls(&self) -> &[SpecUrl] {
        &self.urls
    }

    /// Render the page for a request served under `root_path`
    pub fn render(&self, root_path: &str) -> String {
        let root = root_path.trim_end_matches('/');
        let params = self.bundle_parameters(root);

        let mut html = String::with_capacity(2048);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        for css in &self.assets.css_urls {
            html.push_str(&format!(
                "<link type=\"text/css\" rel=\"stylesheet\" href=\"{}\">\n",
                escape_html(css)
            ));
        }
        if let Some(favicon) = &self.assets.favicon_url {
            html.push_str(&format!(
                "<link rel=\"shortcut icon\" href=\"{}\">\n",
                escape_html(favicon)
            ));
        }
        html.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        html.push_str(
            "</head>\n<body style='margin:0;padding:0'>\n<div id=\"swagger-ui\">\n</div>\n",
        );
        for js in &self.assets.js_urls {
            html.push_str(&format!("<script src=\"{}\"></script>\n", escape_html(js)));
        }

        html.push_str("<script>\nconst ui = SwaggerUIBundle({\n");
        html.push_str(&format!(
            "    url: {},\n",
            script_json(&Value::String(format!("{}{}", root, self.openapi_url)))
        ));
        for (key, value) in &params {
            html.push_str(&format!(
                "    {}: {},\n",
                script_json(&Value::String(key.clone())),
                script_json(value)
            ));
        }
        if let Some(redirect) = &self.oauth2_redirect_url {
            html.push_str(&format!(
                "    oauth2RedirectUrl: window.location.origin + {},\n",
                script_json(&Value::String(format!("{}{}", root, redirect)))
            ));
        }
        html.push_str(
            "    presets: [\n        SwaggerUIBundle.presets.apis,\n        SwaggerUIStandalonePreset\n    ],\n})\n</script>\n</body>\n</html>\n",
        );
        html
    }

    fn bundle_parameters(&self, root: &str) -> IndexMap<String, Value> {
        let dropdown = !self.urls.is_empty();
        let layout = if dropdown { "StandaloneLayout" } else { "BaseLayout" };

        let mut params = IndexMap::new();
        params.insert("dom_id".to_string(), Value::from("#swagger-ui"));
        params.insert("layout".to_string(), Value::from(layout));
        params.insert("deepLinking".to_string(), Value::Bool(true));
        params.insert("showExtensions".to_string(), Value::Bool(true));
        params.insert("showCommonExtensions".to_string(), Value::Bool(true));

        for (key, value) in &self.parameters {
            if dropdown && matches!(key.as_str(), "urls" | "urls.primaryName" | "layout") {
                continue;
            }
            params.insert(key.clone(), value.clone());
        }

        if dropdown {
            let urls = self
                .urls
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "name": entry.name,
                        "url": format!("{}{}", root, entry.url),
                    })
                })
                .collect();
            params.insert("urls".to_string(), Value::Array(urls));
            if let Some(primary) = &self.primary_name {
                params.insert("urls.primaryName".to_string(), Value::from(primary.as_str()));
            }
        }
        params
    }
}

/// JSON literal that is safe inside a `<script>` element
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Page receiving the OAuth2 authorization redirect for Swagger UI
pub fn oauth2_redirect_html() -> &'static str {
    r#"<!doctype html>
<html lang="en-US">
<head>
    <title>Swagger UI: OAuth2 Redirect</title>
</head>
<body>
<script>
    'use strict';
    function run () {
        var oauth2 = window.opener.swaggerUIRedirectOauth2;
        var sentState = oauth2.state;
        var redirectUrl = oauth2.redirectUrl;
        var isValid, qp, arr;

        if (/code|token|error/.test(window.location.hash)) {
            qp = window.location.hash.substring(1).replace('?', '&');
        } else {
            qp = location.search.substring(1);
        }

        arr = qp.split("&");
        arr.forEach(function (v,i,_arr) { _arr[i] = '"' + v.replace('=', '":"') + '"';});
        qp = qp ? JSON.parse('{' + arr.join() + '}',
                function (key, value) {
                    return key === "" ? value : decodeURIComponent(value);
                }
        ) : {};

        isValid = qp.state === sentState;

        if ((
          oauth2.auth.schema.get("flow") === "accessCode" ||
          oauth2.auth.schema.get("flow") === "authorizationCode" ||
          oauth2.auth.schema.get("flow") === "authorization_code"
        ) && !oauth2.auth.code) {
            if (!isValid) {
                oauth2.errCb({
                    authId: oauth2.auth.name,
                    source: "auth",
                    level: "warning",
                    message: "Authorization may be unsafe, passed state was changed in server. The passed state wasn't returned from auth server."
                });
            }

            if (qp.code) {
                delete oauth2.state;
                oauth2.auth.code = qp.code;
                oauth2.callback({auth: oauth2.auth, redirectUrl: redirectUrl});
            } else {
                let oauthErrorMsg;
                if (qp.error) {
                    oauthErrorMsg = "["+qp.error+"]: " +
                        (qp.error_description ? qp.error_description+ ". " : "no accessCode received from the server. ") +
                        (qp.error_uri ? "More info: "+qp.error_uri : "");
                }

                oauth2.errCb({
                    authId: oauth2.auth.name,
                    source: "auth",
                    level: "error",
                    message: oauthErrorMsg || "[Authorization failed]: no accessCode received from the server."
                });
            }
        } else {
            oauth2.callback({auth: oauth2.auth, token: qp, isValid: isValid, redirectUrl: redirectUrl});
        }
        window.close();
    }

    if (document.readyState !== 'loading') {
        run();
    } else {
        document.addEventListener('DOMContentLoaded', function () {
            run();
        });
    }
</script>
</body>
</html>
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropdown_page() -> SwaggerPage {
        SwaggerPage::new("Bakery - Swagger UI", "/openapi.json")
            .urls(vec![
                SpecUrl::new("All Routes", "/openapi.json"),
                SpecUrl::new("Version 1", "/v1/openapi.json"),
            ])
            .oauth2_redirect_url(Some("/docs/oauth2-redirect".to_string()))
    }

    #[test]
    fn single_spec_page_uses_base_layout() {
        let html = SwaggerPage::new("API - Swagger UI", "/openapi.json").render("");
        assert!(html.contains("url: \"/openapi.json\""));
        assert!(html.contains("\"layout\": \"BaseLayout\""));
        assert!(!html.contains("\"urls\""));
        assert!(html.contains("<title>API - Swagger UI</title>"));
    }

    #[test]
    fn dropdown_page_lists_urls_with_standalone_layout() {
        let html = dropdown_page().primary("Version 1").render("");
        assert!(html.contains("\"layout\": \"StandaloneLayout\""));
        assert!(html.contains(r#"{"name":"All Routes","url":"/openapi.json"}"#));
        assert!(html.contains(r#"{"name":"Version 1","url":"/v1/openapi.json"}"#));
        assert!(html.contains("\"urls.primaryName\": \"Version 1\""));
        assert!(html.contains("SwaggerUIStandalonePreset"));
        assert!(!html.contains("SwaggerUIBundle.SwaggerUIStandalonePreset"));
        assert!(html.contains("<body style='margin:0;padding:0'>"));
    }

    #[test]
    fn root_path_prefixes_every_url() {
        let html = dropdown_page().render("/root/path/");
        assert!(html.contains(r#""url":"/root/path/v1/openapi.json""#));
        assert!(html.contains(r#""url":"/root/path/openapi.json""#));
        assert!(html.contains("window.location.origin + \"/root/path/docs/oauth2-redirect\""));
    }

    #[test]
    fn rendering_does_not_accumulate_root_path() {
        let page = dropdown_page();
        let first = page.render("/root");
        let second = page.render("/root");
        assert_eq!(first, second);
        assert!(!second.contains("/root/root"));
    }

    #[test]
    fn user_parameters_cannot_override_owned_keys() {
        let mut user = IndexMap::new();
        user.insert("layout".to_string(), Value::from("BaseLayout"));
        user.insert("urls".to_string(), Value::from("nope"));
        user.insert(
            "syntaxHighlight.theme".to_string(),
            Value::from("obsidian"),
        );

        let html = dropdown_page().parameters(&user).render("");
        assert!(html.contains("\"layout\": \"StandaloneLayout\""));
        assert!(!html.contains("\"nope\""));
        assert!(html.contains("\"syntaxHighlight.theme\": \"obsidian\""));
    }

    #[test]
    fn single_page_parameters_may_override_layout() {
        let mut user = IndexMap::new();
        user.insert("deepLinking".to_string(), Value::Bool(false));
        let html = SwaggerPage::new("API", "/openapi.json")
            .parameters(&user)
            .render("");
        assert!(html.contains("\"deepLinking\": false"));
    }

    #[test]
    fn custom_assets_are_rendered() {
        let assets = SwaggerAssets::default()
            .css_urls(["https://cdn.jsdelivr.net/npm/swagger-ui-dist@5.9.0/swagger-ui.css"])
            .favicon_url("https://example.com/favicon.ico");
        let html = dropdown_page().assets(assets).render("");
        assert!(html.contains("swagger-ui-dist@5.9.0/swagger-ui.css"));
        assert!(
            html.contains("<link rel=\"shortcut icon\" href=\"https://example.com/favicon.ico\">")
        );
        assert!(html.contains("swagger-ui-dist@5/swagger-ui-bundle.js"));
    }

    #[test]
    fn script_content_cannot_close_the_tag() {
        let html = SwaggerPage::new("API", "/x</script>").render("");
        assert!(!html.contains("/x</script>"));
        assert!(html.contains("/x<\\/script>"));
    }

    #[test]
    fn title_is_escaped() {
        let html = SwaggerPage::new("<b>API</b>", "/openapi.json").render("");
        assert!(html.contains("<title>&lt;b&gt;API&lt;/b&gt;</title>"));
    }
}
