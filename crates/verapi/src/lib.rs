//! # VerAPI
//!
//! Route versioning for web APIs.
//!
//! Tag handlers with the API versions they belong to, then version the
//! application once: every route is remounted under the prefix of each of
//! its versions, each version gets its own OpenAPI document, and the
//! Swagger UI page gets a dropdown to switch between them.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use verapi::prelude::*;
//!
//! async fn health() -> &'static str {
//!     "ok"
//! }
//!
//! async fn list_cookies() -> Json<Vec<String>> {
//!     Json(vec!["Oatmeal".to_string()])
//! }
//!
//! async fn get_cookie(Path(id): Path<u32>) -> String {
//!     format!("cookie {}", id)
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut app = App::new()
//!         .title("Bakery")
//!         .route("/health", get(unversioned(health)))
//!         .route("/cookies", get(version([1, 2], list_cookies)))
//!         .route("/cookies/{id}", get(version([1], get_cookie)));
//!
//!     let versions = app.versionize(VersioningConfig::default())?;
//!     assert_eq!(versions, ["1", "2"]);
//!
//!     app.run("127.0.0.1:8080").await
//! }
//! ```
//!
//! The app now serves `/health`, `/v1/cookies`, `/v2/cookies` and
//! `/v1/cookies/{id}`, the documents `/openapi.json`, `/v1/openapi.json`
//! and `/v2/openapi.json`, and the docs page at `/docs`.
//!
//! ## Configuration
//!
//! [`VersioningConfig`] is built in code or loaded from `VERAPI_*`
//! environment variables with [`VersioningConfig::from_env`]:
//!
//! ```text
//! VERAPI_DEFAULT_VERSION=2
//! VERAPI_PREFIX_FORMAT=/version{version}
//! VERAPI_INCLUDE_ALL_ROUTES=false
//! VERAPI_FILTER_TAGS=true
//! ```

// Re-export core functionality
pub use verapi_core::*;

/// OpenAPI document model and Swagger UI page
pub mod openapi {
    pub use verapi_openapi::*;
}

/// Prelude module - import everything you need with `use verapi::prelude::*`
pub mod prelude {
    // Core types
    pub use verapi_core::{
        delete,
        get,
        patch,
        post,
        put,
        // Error handling
        ApiError,
        App,
        Body,
        BuildError,
        Created,
        Html,
        // Response types
        IntoResponse,
        // Extractors
        Json,
        MethodRouter,
        NoContent,
        Path,
        Query,
        Request,
        Response,
        Result,
        RootPath,
        Router,
        State,
        StatusCode,
        WithStatus,
        // Versioning
        unversioned,
        version,
        VersionLabel,
        VersioningConfig,
    };

    // OpenAPI metadata
    pub use verapi_openapi::{Contact, License, OpenApiConfig, Schema, Server, Tag};

    // Re-export common external crates
    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, trace, warn};
}
