//! Route versioning
//!
//! Versioning takes an assembled [`App`] whose handlers carry version
//! labels and remounts every route under the prefix of each of its
//! versions. Each version gets its own OpenAPI document, and the docs page
//! gets a dropdown to switch between them.
//!
//! ```rust,ignore
//! use verapi_core::{get, unversioned, version, App, VersioningConfig};
//!
//! let mut app = App::new()
//!     .route("/health", get(unversioned(health)))
//!     .route("/cookies", get(version([1, 2], list_cookies)))
//!     .route("/cookies/{id}", get(version([1], get_cookie)));
//!
//! let versions = app.versionize(VersioningConfig::default())?;
//! assert_eq!(versions, ["1", "2"]);
//! // GET /health, /v1/cookies, /v2/cookies, /v1/cookies/{id}
//! // GET /v1/openapi.json, /v2/openapi.json, /docs
//! ```
//!
//! Untagged routes join [`VersioningConfig::default_version`]. The pass
//! runs once: versioning an app twice fails with
//! [`BuildError::AlreadyVersioned`].

mod classify;
mod compose;
mod config;
mod docs;
mod label;

pub use classify::{classify, Classification};
pub use compose::compose;
pub use config::VersioningConfig;
pub use docs::docs_page;
pub use label::{unversioned, version, VersionLabel, VersionMark, VersionTag, Versioned};

use crate::app::{docs_route, App};
use crate::error::BuildError;
use tracing::{debug, info};

/// Versioning pass over an [`App`]
#[derive(Debug, Clone, Default)]
pub struct Versioner {
    config: VersioningConfig,
}

impl Versioner {
    pub fn new(config: VersioningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VersioningConfig {
        &self.config
    }

    /// Version the routes of `app` and return the versions in use, sorted
    /// as strings
    pub fn apply(&self, app: &mut App) -> Result<Vec<String>, BuildError> {
        if app.is_versioned() {
            return Err(BuildError::AlreadyVersioned);
        }
        self.config.validate()?;

        let openapi = app.openapi_config().clone();
        let classification = classify(app.router(), &self.config, openapi.docs_url.as_deref());
        let versions = classification.versions();

        let mut groups = Vec::with_capacity(classification.groups.len());
        for (version, routes) in &classification.groups {
            groups.push(compose(version, routes, &self.config, &openapi)?);
        }

        let router = app.router_mut();
        for route in router.remove_routes(&classification.removable) {
            debug!(
                method = %route.method(),
                path = %route.full_path(),
                "Route moved to versioned groups"
            );
        }
        for group in groups {
            router.mount_group(group);
        }

        if let (Some(docs_url), Some(page)) = (
            openapi.docs_url.as_deref(),
            docs_page(&versions, &self.config, &openapi),
        ) {
            router.push(docs_route(docs_url, page));
        }

        app.mark_versioned();

        let versions: Vec<String> = versions.iter().map(ToString::to_string).collect();
        info!(
            versions = ?versions,
            routes = classification.removable.len(),
            "API versioning applied"
        );
        Ok(versions)
    }
}
