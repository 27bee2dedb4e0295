//! Route table and radix tree dispatch (matchit)
//!
//! A [`Router`] is an ordered table of [`Route`]s, one per HTTP method and
//! path. The table stays editable until the application is built, then it
//! is compiled into a [`Dispatcher`].
//!
//! # Path Patterns
//!
//! Routes support dynamic path parameters using `{param}` syntax:
//!
//! - `/cookies` - Static path
//! - `/cookies/{id}` - Single parameter
//! - `/ovens/{oven_id}/trays/{tray_id}` - Multiple parameters
//!
//! # Example
//!
//! ```rust,ignore
//! use verapi_core::{Router, get, post, version};
//!
//! let router = Router::new()
//!     .route("/cookies", get(list_cookies).post(version([1, 2], bake_cookie)))
//!     .route("/cookies/{id}", get(get_cookie).delete(eat_cookie));
//! ```
//!
//! # Mounting
//!
//! A route's served path is its mount prefix followed by its own path. Mount
//! prefixes are carried by the route, so copies of one route can be served
//! under several prefixes while sharing the same handler.
//!
//! # Route Conflict Detection
//!
//! Registering the same method and path twice keeps the first route. Paths
//! with the same shape but different parameter names cannot share the radix
//! tree and fail [`Router::compile`] with a [`RouteConflictError`].

use crate::extract::RootPath;
use crate::handler::{into_boxed_handler, short_name, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;
use crate::versioning::VersionTag;
use bytes::Bytes;
use http::{Extensions, Method};
use matchit::Router as MatchitRouter;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;
use verapi_openapi::{Operation, RouteDoc};

/// Registration token of a route
///
/// Copies of a route made while versioning keep the token of the original
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(u64);

impl RouteId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "route#{}", self.0)
    }
}

/// Error returned when a route conflict is detected
#[derive(Debug, Clone)]
pub struct RouteConflictError {
    /// The path that was being registered
    pub new_path: String,
    /// The HTTP method that conflicts
    pub method: Option<Method>,
    /// The existing path that conflicts
    pub existing_path: String,
    /// Detailed error message from the underlying router
    pub details: String,
}

impl fmt::Display for RouteConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\n╭─────────────────────────────────────────────────────────────╮"
        )?;
        writeln!(
            f,
            "│                    ROUTE CONFLICT DETECTED                   │"
        )?;
        writeln!(
            f,
            "╰─────────────────────────────────────────────────────────────╯"
        )?;
        writeln!(f)?;
        writeln!(f, "  Conflicting routes:")?;
        writeln!(f, "    → Existing: {}", self.existing_path)?;
        writeln!(f, "    → New:      {}", self.new_path)?;
        writeln!(f)?;
        if let Some(ref method) = self.method {
            writeln!(f, "  HTTP Method: {}", method)?;
            writeln!(f)?;
        }
        writeln!(f, "  Details: {}", self.details)?;
        writeln!(f)?;
        writeln!(f, "  How to resolve:")?;
        writeln!(f, "    1. Use the same parameter names for paths of the same shape")?;
        writeln!(
            f,
            "    2. Check that two versions do not mount under the same prefix"
        )?;
        writeln!(f)?;
        writeln!(f, "  Example:")?;
        writeln!(f, "    Instead of:")?;
        writeln!(f, "      .route(\"/cookies/{{id}}\", get(version([1], handler1)))")?;
        writeln!(f, "      .route(\"/cookies/{{cookie_id}}\", get(version([2], handler2)))")?;
        writeln!(f)?;
        writeln!(f, "    Use:")?;
        writeln!(f, "      .route(\"/cookies/{{id}}\", get(version([1], handler1)))")?;
        writeln!(f, "      .route(\"/cookies/{{id}}\", get(version([2], handler2)))")?;
        Ok(())
    }
}

impl std::error::Error for RouteConflictError {}

/// A single endpoint of the route table
#[derive(Clone)]
pub struct Route {
    pub(crate) id: RouteId,
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) handler: BoxedHandler,
    pub(crate) operation: Operation,
    pub(crate) name: Option<String>,
    pub(crate) include_in_schema: bool,
    pub(crate) internal: bool,
    pub(crate) mount: String,
    pub(crate) root: String,
    pub(crate) state: Option<Arc<Extensions>>,
}

impl Route {
    fn new(method: Method, path: &str, handler: BoxedHandler, operation: Operation) -> Self {
        Self {
            id: RouteId::next(),
            method,
            path: path.to_string(),
            handler,
            operation,
            name: None,
            include_in_schema: true,
            internal: false,
            mount: String::new(),
            root: String::new(),
            state: None,
        }
    }

    /// Framework-owned route: never versioned, never documented
    pub(crate) fn internal<H, T>(method: Method, path: &str, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        let mut route = Self::new(method, path, into_boxed_handler(handler), Operation::new());
        route.internal = true;
        route.include_in_schema = false;
        route
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path as registered, without mount prefix
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path the route is served at
    pub fn full_path(&self) -> String {
        format!("{}{}", self.mount, self.path)
    }

    pub fn mount_prefix(&self) -> &str {
        &self.mount
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn include_in_schema(&self) -> bool {
        self.include_in_schema
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Whether both routes call the same registered handler
    pub fn same_handler(&self, other: &Route) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }

    pub(crate) fn doc(&self) -> RouteDoc {
        RouteDoc {
            path: self.full_path(),
            method: self.method.clone(),
            name: self.name.clone(),
            operation: self.operation.clone(),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("path", &self.full_path())
            .field("name", &self.name)
            .field("internal", &self.internal)
            .finish()
    }
}

/// Routes served together under one mount prefix
#[derive(Debug, Clone)]
pub struct RouteGroup {
    prefix: String,
    routes: Vec<Route>,
}

impl RouteGroup {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            routes: Vec::new(),
        }
    }

    /// Add a route, served at `prefix + route.full_path()`
    pub fn push(&mut self, mut route: Route) {
        route.mount = format!("{}{}", self.prefix, route.mount);
        self.routes.push(route);
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

struct MethodEntry {
    method: Method,
    handler: BoxedHandler,
    operation: Operation,
    version: Option<VersionTag>,
    name: Option<String>,
}

/// Handlers for the methods of a single path
///
/// Documentation builders apply to every method already added.
pub struct MethodRouter {
    entries: Vec<MethodEntry>,
    include_in_schema: bool,
}

impl MethodRouter {
    /// Create a new empty method router
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            include_in_schema: true,
        }
    }

    /// Add a handler for a specific method
    pub fn on<H, T>(mut self, method: Method, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        let version = handler.version_tag();
        let name = short_name(handler.name());
        self.entries.push(MethodEntry {
            method,
            handler: into_boxed_handler(handler),
            operation: Operation::new(),
            version,
            name,
        });
        self
    }

    pub fn get<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on(Method::GET, handler)
    }

    pub fn post<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on(Method::POST, handler)
    }

    pub fn put<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on(Method::PUT, handler)
    }

    pub fn patch<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on(Method::PATCH, handler)
    }

    pub fn delete<H: Handler<T>, T: 'static>(self, handler: H) -> Self {
        self.on(Method::DELETE, handler)
    }

    fn map_operations(mut self, f: impl Fn(Operation) -> Operation) -> Self {
        for entry in &mut self.entries {
            let op = std::mem::take(&mut entry.operation);
            entry.operation = f(op);
        }
        self
    }

    pub fn tag(self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.map_operations(|op| op.tag(tag.clone()))
    }

    pub fn tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        self.map_operations(|op| tags.iter().fold(op, |op, tag| op.tag(tag.clone())))
    }

    pub fn summary(self, summary: impl Into<String>) -> Self {
        let summary = summary.into();
        self.map_operations(|op| op.summary(summary.clone()))
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.map_operations(|op| op.description(description.clone()))
    }

    pub fn deprecated(self) -> Self {
        self.map_operations(Operation::deprecated)
    }

    pub fn response(self, status: u16, description: impl Into<String>) -> Self {
        let description = description.into();
        self.map_operations(|op| op.response(status, description.clone()))
    }

    pub fn json_body<T: for<'a> utoipa::ToSchema<'a>>(self) -> Self {
        self.map_operations(|op| op.json_body::<T>())
    }

    pub fn json_response<T: for<'a> utoipa::ToSchema<'a>>(self, status: u16) -> Self {
        self.map_operations(|op| op.json_response::<T>(status))
    }

    /// Serve the routes but leave them out of every OpenAPI document
    pub fn hidden(mut self) -> Self {
        self.include_in_schema = false;
        self
    }
}

impl Default for MethodRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a GET route handler
pub fn get<H, T>(handler: H) -> MethodRouter
where
    H: Handler<T>,
    T: 'static,
{
    MethodRouter::new().get(handler)
}

/// Create a POST route handler
pub fn post<H, T>(handler: H) -> MethodRouter
where
    H: Handler<T>,
    T: 'static,
{
    MethodRouter::new().post(handler)
}

/// Create a PUT route handler
pub fn put<H, T>(handler: H) -> MethodRouter
where
    H: Handler<T>,
    T: 'static,
{
    MethodRouter::new().put(handler)
}

/// Create a PATCH route handler
pub fn patch<H, T>(handler: H) -> MethodRouter
where
    H: Handler<T>,
    T: 'static,
{
    MethodRouter::new().patch(handler)
}

/// Create a DELETE route handler
pub fn delete<H, T>(handler: H) -> MethodRouter
where
    H: Handler<T>,
    T: 'static,
{
    MethodRouter::new().delete(handler)
}

/// Main router
pub struct Router {
    routes: Vec<Route>,
    versions: HashMap<RouteId, VersionTag>,
    state: Arc<Extensions>,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            versions: HashMap::new(),
            state: Arc::new(Extensions::new()),
        }
    }

    /// Add a route
    pub fn route(mut self, path: &str, method_router: MethodRouter) -> Self {
        self.add_route(path, method_router);
        self
    }

    /// Add a route and return the registration token of every method
    pub fn add_route(&mut self, path: &str, method_router: MethodRouter) -> Vec<RouteId> {
        let path = normalize_path(path);
        let include_in_schema = method_router.include_in_schema;

        method_router
            .entries
            .into_iter()
            .map(|entry| {
                let mut route = Route::new(entry.method, &path, entry.handler, entry.operation);
                route.name = entry.name;
                route.include_in_schema = include_in_schema;
                if let Some(tag) = entry.version {
                    self.versions.insert(route.id, tag);
                }
                let id = route.id;
                self.routes.push(route);
                id
            })
            .collect()
    }

    /// Attach a version tag to a registered route
    pub fn set_version(&mut self, id: RouteId, tag: VersionTag) {
        self.versions.insert(id, tag);
    }

    /// Version tag of a registered route
    pub fn version_of(&self, id: RouteId) -> Option<&VersionTag> {
        self.versions.get(&id)
    }

    /// All routes in registration order
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Add application state
    pub fn state<S: Clone + Send + Sync + 'static>(mut self, state: S) -> Self {
        Arc::make_mut(&mut self.state).insert(state);
        self
    }

    /// Nest another router under a prefix
    ///
    /// Nested routes are served at `prefix + path` and see `prefix` as their
    /// [`RootPath`]. They keep the state of the router they were registered
    /// on, or share this router's state if that one had none.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let admin = Router::new()
    ///     .route("/", get(dashboard))
    ///     .route("/ovens/{id}", get(oven));
    ///
    /// let app = Router::new().nest("/admin", admin);
    ///
    /// // Routes are now:
    /// // GET /admin/
    /// // GET /admin/ovens/{id}
    /// ```
    pub fn nest(mut self, prefix: &str, router: Router) -> Self {
        let prefix = normalize_prefix(prefix);
        let prefix = if prefix == "/" { String::new() } else { prefix };

        self.versions.extend(router.versions);
        for mut route in router.routes {
            route.mount = format!("{}{}", prefix, route.mount);
            route.root = format!("{}{}", prefix, route.root);
            if route.state.is_none() && !router.state.is_empty() {
                route.state = Some(router.state.clone());
            }
            self.routes.push(route);
        }
        self
    }

    /// Append a group of routes served under the group's prefix
    pub fn mount_group(&mut self, group: RouteGroup) {
        debug!(prefix = %group.prefix, routes = group.routes.len(), "Mounting route group");
        self.routes.extend(group.routes);
    }

    /// Remove the routes registered under the given tokens
    pub fn remove_routes(&mut self, ids: &HashSet<RouteId>) -> Vec<Route> {
        let (removed, kept) = std::mem::take(&mut self.routes)
            .into_iter()
            .partition(|route| ids.contains(&route.id));
        self.routes = kept;
        removed
    }

    pub(crate) fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Whether a route serves `method` at `path`
    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.routes
            .iter()
            .any(|route| &route.method == method && route.full_path() == path)
    }

    /// Routes listed in OpenAPI documents
    pub fn route_docs(&self) -> Vec<RouteDoc> {
        self.routes
            .iter()
            .filter(|route| route.include_in_schema && !route.internal)
            .map(Route::doc)
            .collect()
    }

    /// Compile the route table for dispatch
    pub fn compile(&self) -> Result<Dispatcher, RouteConflictError> {
        Dispatcher::build(self)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

struct Endpoint {
    /// Served path in `{param}` syntax
    path: String,
    methods: Vec<MethodTarget>,
}

#[derive(Clone)]
struct MethodTarget {
    method: Method,
    handler: BoxedHandler,
    root: String,
    state: Option<Arc<Extensions>>,
}

/// Compiled, immutable route table
pub struct Dispatcher {
    tree: MatchitRouter<usize>,
    endpoints: Vec<Endpoint>,
    state: Arc<Extensions>,
    root_path: String,
}

/// Result of route matching
pub(crate) enum RouteMatch<'a> {
    Found {
        handler: &'a BoxedHandler,
        params: HashMap<String, String>,
        root: String,
        state: Arc<Extensions>,
    },
    NotFound,
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
}

impl Dispatcher {
    fn build(router: &Router) -> Result<Self, RouteConflictError> {
        let mut tree = MatchitRouter::new();
        let mut endpoints: Vec<Endpoint> = Vec::new();
        let mut by_key: HashMap<String, usize> = HashMap::new();

        for route in &router.routes {
            let path = route.full_path();
            let key = convert_path_params(&path);
            let target = MethodTarget {
                method: route.method.clone(),
                handler: route.handler.clone(),
                root: route.root.clone(),
                state: route.state.clone(),
            };

            if let Some(&index) = by_key.get(&key) {
                let endpoint = &mut endpoints[index];
                if endpoint.methods.iter().any(|t| t.method == route.method) {
                    debug!(
                        method = %route.method,
                        path = %path,
                        "Duplicate route shadowed by earlier registration"
                    );
                } else {
                    endpoint.methods.push(target);
                }
                continue;
            }

            if let Err(e) = tree.insert(key.clone(), endpoints.len()) {
                let existing_path = find_conflicting_path(&endpoints, &key)
                    .unwrap_or_else(|| "<unknown>".to_string());
                return Err(RouteConflictError {
                    new_path: path,
                    method: Some(route.method.clone()),
                    existing_path,
                    details: e.to_string(),
                });
            }

            by_key.insert(key, endpoints.len());
            endpoints.push(Endpoint {
                path,
                methods: vec![target],
            });
        }

        Ok(Self {
            tree,
            endpoints,
            state: router.state.clone(),
            root_path: String::new(),
        })
    }

    /// Serve the application behind a reverse proxy under `root_path`
    pub(crate) fn with_root_path(mut self, root_path: &str) -> Self {
        self.root_path = root_path.trim_end_matches('/').to_string();
        self
    }

    /// Number of distinct paths
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Match a request and return the handler + params
    pub(crate) fn match_route(&self, path: &str, method: &Method) -> RouteMatch<'_> {
        let Ok(matched) = self.tree.at(path) else {
            return RouteMatch::NotFound;
        };
        let endpoint = &self.endpoints[*matched.value];

        match endpoint.methods.iter().find(|t| &t.method == method) {
            Some(target) => {
                let params = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                RouteMatch::Found {
                    handler: &target.handler,
                    params,
                    root: format!("{}{}", self.root_path, target.root),
                    state: target.state.clone().unwrap_or_else(|| self.state.clone()),
                }
            }
            None => RouteMatch::MethodNotAllowed {
                allowed: endpoint.methods.iter().map(|t| t.method.clone()).collect(),
            },
        }
    }

    /// Run the handler matching `parts`, 404 and 405 responses included
    pub async fn dispatch(&self, mut parts: http::request::Parts, body: Bytes) -> Response {
        use crate::error::ApiError;
        use crate::response::IntoResponse;

        let method = parts.method.clone();
        let path = parts.uri.path().to_string();

        match self.match_route(&path, &method) {
            RouteMatch::Found {
                handler,
                params,
                root,
                state,
            } => {
                let handler = handler.clone();
                parts.extensions.insert(RootPath(root));
                let request = Request::new(parts, body, state, params);
                handler(request).await
            }
            RouteMatch::NotFound => {
                ApiError::not_found(format!("No route found for {} {}", method, path))
                    .into_response()
            }
            RouteMatch::MethodNotAllowed { allowed } => {
                let allowed_str: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
                let mut response = ApiError::method_not_allowed(format!(
                    "Method {} not allowed for {}",
                    method, path
                ))
                .into_response();
                if let Ok(value) = http::HeaderValue::from_str(&allowed_str.join(", ")) {
                    response.headers_mut().insert(http::header::ALLOW, value);
                }
                response
            }
        }
    }
}

fn find_conflicting_path(endpoints: &[Endpoint], key: &str) -> Option<String> {
    let normalized_new = normalize_path_for_comparison(key);
    endpoints
        .iter()
        .find(|endpoint| {
            normalize_path_for_comparison(&convert_path_params(&endpoint.path)) == normalized_new
        })
        .map(|endpoint| endpoint.path.clone())
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Convert {param} style to :param for matchit
fn convert_path_params(path: &str) -> String {
    let mut result = String::with_capacity(path.len());

    for ch in path.chars() {
        match ch {
            '{' => result.push(':'),
            '}' => {}
            _ => result.push(ch),
        }
    }

    result
}

/// Normalize a path for conflict comparison by replacing parameter names with a placeholder
fn normalize_path_for_comparison(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut in_param = false;

    for ch in path.chars() {
        match ch {
            ':' => {
                in_param = true;
                result.push_str(":_");
            }
            '/' => {
                in_param = false;
                result.push('/');
            }
            _ if in_param => {}
            _ => result.push(ch),
        }
    }

    result
}

/// Normalize a mount prefix
///
/// ```text
/// normalize_prefix("/api/")   == "/api"
/// normalize_prefix("//api//") == "/api"
/// normalize_prefix("")        == "/"
/// ```
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    let segments: Vec<&str> = prefix.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut result = String::with_capacity(prefix.len() + 1);
    for segment in segments {
        result.push('/');
        result.push_str(segment);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioning::version;

    async fn handler1() -> &'static str {
        "handler1"
    }

    async fn handler2() -> &'static str {
        "handler2"
    }

    #[test]
    fn test_convert_path_params() {
        assert_eq!(convert_path_params("/users/{id}"), "/users/:id");
        assert_eq!(
            convert_path_params("/users/{user_id}/posts/{post_id}"),
            "/users/:user_id/posts/:post_id"
        );
        assert_eq!(convert_path_params("/static/path"), "/static/path");
    }

    #[test]
    fn test_normalize_path_for_comparison() {
        assert_eq!(normalize_path_for_comparison("/users/:id"), "/users/:_");
        assert_eq!(normalize_path_for_comparison("/users/:user_id"), "/users/:_");
        assert_eq!(
            normalize_path_for_comparison("/users/:id/posts/:post_id"),
            "/users/:_/posts/:_"
        );
        assert_eq!(normalize_path_for_comparison("/static/path"), "/static/path");
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/api"), "/api");
        assert_eq!(normalize_prefix("/api/"), "/api");
        assert_eq!(normalize_prefix("api/v1"), "/api/v1");
        assert_eq!(normalize_prefix(""), "/");
        assert_eq!(normalize_prefix("/"), "/");
        assert_eq!(normalize_prefix("//api//v1//"), "/api/v1");
        assert_eq!(normalize_prefix("///"), "/");
    }

    #[test]
    fn test_route_conflict_detection() {
        let router = Router::new()
            .route("/users/{id}", get(handler1))
            .route("/users/{user_id}", get(handler2));

        let err = router.compile().err().expect("conflict expected");
        assert_eq!(err.existing_path, "/users/{id}");
        assert_eq!(err.new_path, "/users/{user_id}");
        assert!(err.to_string().contains("ROUTE CONFLICT DETECTED"));
    }

    #[test]
    fn test_no_conflict_different_paths() {
        let router = Router::new()
            .route("/users/{id}", get(handler1))
            .route("/users/{id}/profile", get(handler2));

        let dispatcher = router.compile().unwrap();
        assert_eq!(dispatcher.len(), 2);
    }

    #[test]
    fn methods_of_one_path_become_separate_routes() {
        let mut router = Router::new();
        let ids = router.add_route("/cookies", get(handler1).post(handler2));

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(router.routes()[0].method(), &Method::GET);
        assert_eq!(router.routes()[1].method(), &Method::POST);
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let router = Router::new()
            .route("/cookies", get(handler1))
            .route("/cookies", get(handler2));

        let dispatcher = router.compile().unwrap();
        match dispatcher.match_route("/cookies", &Method::GET) {
            RouteMatch::Found { handler, .. } => {
                assert!(Arc::ptr_eq(handler, &router.routes()[0].handler));
            }
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn version_tags_move_to_side_table() {
        let mut router = Router::new();
        let ids = router.add_route("/cookies", get(version([1, 2], handler1)));
        let plain = router.add_route("/cake", get(handler2));

        let tag = router.version_of(ids[0]).unwrap();
        assert_eq!(tag, &VersionTag::labels([1, 2]));
        assert!(router.version_of(plain[0]).is_none());

        router.set_version(plain[0], VersionTag::labels(["beta"]));
        assert_eq!(router.version_of(plain[0]), Some(&VersionTag::labels(["beta"])));
    }

    #[test]
    fn handler_names_are_recorded() {
        let router = Router::new().route("/one", get(handler1));
        assert_eq!(router.routes()[0].name(), Some("handler1"));
    }

    #[test]
    fn doc_builders_apply_to_all_methods() {
        let router = Router::new().route(
            "/cookies",
            get(handler1).post(handler2).tag("Cookies").deprecated(),
        );
        for route in router.routes() {
            assert_eq!(route.operation().tags, vec!["Cookies".to_string()]);
            assert!(route.operation().deprecated);
        }
    }

    #[test]
    fn hidden_routes_are_served_but_not_documented() {
        let router = Router::new()
            .route("/secret", get(handler1).hidden())
            .route("/public", get(handler2));

        let docs = router.route_docs();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, "/public");
        assert!(router.compile().unwrap().len() == 2);
    }

    #[test]
    fn group_copies_share_handler_and_token() {
        let router = Router::new().route("/cookies", get(handler1));
        let original = router.routes()[0].clone();

        let mut v1 = RouteGroup::new("/v1");
        v1.push(original.clone());
        let mut v2 = RouteGroup::new("/v2");
        v2.push(original.clone());

        let a = &v1.routes()[0];
        let b = &v2.routes()[0];
        assert_eq!(a.full_path(), "/v1/cookies");
        assert_eq!(b.full_path(), "/v2/cookies");
        assert_eq!(a.path(), "/cookies");
        assert!(a.same_handler(b));
        assert!(a.same_handler(&original));
        assert_eq!(a.id(), original.id());
    }

    #[test]
    fn root_route_under_prefix_keeps_trailing_slash() {
        let router = Router::new().route("/", get(handler1));
        let mut group = RouteGroup::new("/v1");
        group.push(router.routes()[0].clone());
        assert_eq!(group.routes()[0].full_path(), "/v1/");
    }

    #[test]
    fn nest_sets_mount_and_root() {
        let admin = Router::new().route("/ovens/{id}", get(handler1));
        let app = Router::new().nest("/admin/", admin);

        let route = &app.routes()[0];
        assert_eq!(route.full_path(), "/admin/ovens/{id}");
        assert_eq!(route.root, "/admin");
    }

    #[test]
    fn remove_routes_returns_removed_in_order() {
        let mut router = Router::new()
            .route("/a", get(handler1))
            .route("/b", get(handler2))
            .route("/c", get(handler1));
        let ids: HashSet<RouteId> = [router.routes()[0].id(), router.routes()[2].id()]
            .into_iter()
            .collect();

        let removed = router.remove_routes(&ids);
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0].path(), "/a");
        assert_eq!(router.routes().len(), 1);
        assert_eq!(router.routes()[0].path(), "/b");
    }

    #[test]
    fn method_not_allowed_lists_methods() {
        let dispatcher = Router::new()
            .route("/cookies", get(handler1).post(handler2))
            .compile()
            .unwrap();

        match dispatcher.match_route("/cookies", &Method::DELETE) {
            RouteMatch::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, vec![Method::GET, Method::POST]);
            }
            _ => panic!("expected 405"),
        }
        assert!(matches!(
            dispatcher.match_route("/nothing", &Method::GET),
            RouteMatch::NotFound
        ));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalized_prefix_is_canonical(
            segments in prop::collection::vec("[a-z0-9]{1,6}", 0..4),
            slashes in 1usize..4,
        ) {
            let sep = "/".repeat(slashes);
            let raw = format!("{}{}{}", sep, segments.join(&sep), sep);
            let normalized = normalize_prefix(&raw);

            prop_assert!(normalized.starts_with('/'));
            prop_assert!(!normalized.contains("//"));
            prop_assert!(normalized == "/" || !normalized.ends_with('/'));
            prop_assert_eq!(normalize_prefix(&normalized), normalized.clone());
        }

        #[test]
        fn param_names_do_not_change_comparison_shape(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
            let shape = |name: &str| {
                normalize_path_for_comparison(&convert_path_params(&format!("/x/{{{}}}", name)))
            };
            let left = shape(a.as_str());
            let right = shape(b.as_str());
            prop_assert_eq!(left, right);
        }
    }
}
