//! VerAPI application builder

use crate::error::BuildError;
use crate::extract::RootPath;
use crate::response::Html;
use crate::router::{Dispatcher, MethodRouter, Route, Router};
use crate::server::Server;
use crate::versioning::{Versioner, VersioningConfig};
use bytes::Bytes;
use http::Method;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use verapi_openapi::{build_spec, OpenApiConfig, OpenApiSpec, SwaggerPage, Tag};

/// Main application builder for VerAPI
///
/// # Example
///
/// ```rust,ignore
/// use verapi::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     let mut app = App::new()
///         .title("Bakery")
///         .route("/cookies", get(version([1, 2], list_cookies)));
///
///     app.versionize(VersioningConfig::default())?;
///     app.run("127.0.0.1:8080").await
/// }
/// ```
///
/// The OpenAPI document, the Swagger UI page and its OAuth2 redirect are
/// installed when the app is built, at the URLs of [`OpenApiConfig`],
/// unless a route already serves them.
pub struct App {
    router: Router,
    openapi: OpenApiConfig,
    root_path: String,
    mounts: Vec<(String, App)>,
    versioned: bool,
}

impl App {
    /// Create a new VerAPI application
    pub fn new() -> Self {
        // Initialize tracing if not already done
        let _ = tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,verapi=debug")),
            )
            .with(tracing_subscriber::fmt::layer())
            .try_init();

        Self {
            router: Router::new(),
            openapi: OpenApiConfig::default(),
            root_path: String::new(),
            mounts: Vec::new(),
            versioned: false,
        }
    }

    /// Add a route
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// App::new()
    ///     .route("/", get(index))
    ///     .route("/cookies", get(list_cookies).post(version([2], bake_cookie)))
    ///     .route("/cookies/{id}", get(get_cookie).delete(eat_cookie))
    /// ```
    pub fn route(mut self, path: &str, method_router: MethodRouter) -> Self {
        self.router.add_route(path, method_router);
        self
    }

    /// Nest a router under a prefix, its routes are versioned with the app's
    pub fn nest(mut self, prefix: &str, router: Router) -> Self {
        self.router = self.router.nest(prefix, router);
        self
    }

    /// Mount a separate application under a prefix
    ///
    /// The mounted app keeps its own documents, docs page and versioning:
    /// version it before mounting.
    ///
    /// ```rust,ignore
    /// let mut admin = App::new().route("/", get(dashboard));
    /// admin.versionize(VersioningConfig::default())?;
    ///
    /// let app = App::new().mount("/admin", admin);
    /// // GET /admin/v1/, /admin/docs, /admin/openapi.json
    /// ```
    pub fn mount(mut self, prefix: &str, app: App) -> Self {
        self.mounts.push((prefix.to_string(), app));
        self
    }

    /// Add application state
    ///
    /// State is available to handlers through the
    /// [`State`](crate::State) extractor.
    pub fn state<S>(mut self, state: S) -> Self
    where
        S: Clone + Send + Sync + 'static,
    {
        self.router = self.router.state(state);
        self
    }

    /// Path prefix stripped by a reverse proxy in front of the app
    ///
    /// Routes are matched without it. Documentation URLs are rendered with
    /// it.
    pub fn root_path(mut self, path: impl Into<String>) -> Self {
        self.root_path = path.into();
        self
    }

    /// Replace the application metadata and documentation endpoints
    pub fn openapi(mut self, config: OpenApiConfig) -> Self {
        self.openapi = config;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.openapi.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.openapi.description = Some(description.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.openapi.summary = Some(summary.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.openapi.version = version.into();
        self
    }

    /// Declare a tag in the document's tag catalogue
    pub fn tag(mut self, tag: Tag) -> Self {
        self.openapi = self.openapi.tag(tag);
        self
    }

    pub fn swagger_ui_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.openapi = self.openapi.swagger_ui_parameter(key, value);
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn openapi_config(&self) -> &OpenApiConfig {
        &self.openapi
    }

    /// Whether the versioning pass already ran on this app
    pub fn is_versioned(&self) -> bool {
        self.versioned
    }

    pub(crate) fn mark_versioned(&mut self) {
        self.versioned = true;
    }

    /// Version the routes of the app, see [`crate::versioning`]
    ///
    /// Returns the versions in use, sorted as strings.
    pub fn versionize(&mut self, config: VersioningConfig) -> Result<Vec<String>, BuildError> {
        Versioner::new(config).apply(self)
    }

    /// Aggregate OpenAPI document of the documented routes
    pub fn openapi_spec(&self) -> OpenApiSpec {
        build_spec(&self.openapi, &self.router.route_docs())
    }

    /// Build the final route table
    ///
    /// Installs the documentation routes and resolves mounted apps.
    pub fn into_router(self) -> Result<Router, BuildError> {
        let spec = self.openapi_spec();
        let App {
            mut router,
            openapi,
            mounts,
            ..
        } = self;

        if let Some(openapi_url) = openapi.openapi_url.as_deref() {
            if !router.contains(&Method::GET, openapi_url) {
                let body = Bytes::from(spec.to_json_bytes()?);
                router.push(Route::internal(Method::GET, openapi_url, move || {
                    let body = body.clone();
                    async move { verapi_openapi::openapi_json(body) }
                }));
            }

            if let Some(docs_url) = openapi.docs_url.as_deref() {
                if !router.contains(&Method::GET, docs_url) {
                    let title = format!("{} - Swagger UI", openapi.title);
                    let page = SwaggerPage::new(title, openapi_url)
                        .parameters(&openapi.swagger_ui_parameters)
                        .oauth2_redirect_url(openapi.oauth2_redirect_url.clone());
                    router.push(docs_route(docs_url, page));
                }

                if let Some(redirect_url) = openapi.oauth2_redirect_url.as_deref() {
                    if !router.contains(&Method::GET, redirect_url) {
                        router.push(Route::internal(Method::GET, redirect_url, || async {
                            Html(verapi_openapi::oauth2_redirect_html())
                        }));
                    }
                }
            }
        }

        for (prefix, app) in mounts {
            router = router.nest(&prefix, app.into_router()?);
        }

        Ok(router)
    }

    /// Build the app and compile its route table
    pub fn into_dispatcher(self) -> Result<Dispatcher, BuildError> {
        let root_path = self.root_path.clone();
        let router = self.into_router()?;
        Ok(router.compile()?.with_root_path(&root_path))
    }

    /// Run the server
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// App::new()
    ///     .route("/", get(hello))
    ///     .run("127.0.0.1:8080")
    ///     .await
    /// ```
    pub async fn run(self, addr: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let dispatcher = self.into_dispatcher()?;
        Server::new(dispatcher).run(addr).await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve a Swagger UI page, rendered for the root path of each request
pub(crate) fn docs_route(docs_url: &str, page: SwaggerPage) -> Route {
    let page = Arc::new(page);
    Route::internal(Method::GET, docs_url, move |RootPath(root): RootPath| {
        let page = page.clone();
        async move { Html(page.render(&root)) }
    })
}
