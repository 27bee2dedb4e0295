//! # VerAPI Core
//!
//! Core library providing the web framework types and the route versioning
//! engine of VerAPI.
//!
//! This crate is not meant to be used directly. Use `verapi` instead.

mod app;
mod error;
mod extract;
mod handler;
mod request;
mod response;
mod router;
mod server;
#[cfg(any(test, feature = "test-utils"))]
mod test_client;
pub mod versioning;

// Public API
pub use app::App;
pub use error::{ApiError, BuildError, Result};
pub use extract::{Body, FromRequest, FromRequestParts, Json, Path, Query, RootPath, State};
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{Created, Html, IntoResponse, NoContent, Response, WithStatus};
pub use router::{
    delete, get, patch, post, put, Dispatcher, MethodRouter, Route, RouteConflictError,
    RouteGroup, RouteId, Router,
};
#[cfg(any(test, feature = "test-utils"))]
pub use test_client::{TestClient, TestRequest, TestResponse};
pub use versioning::{
    unversioned, version, VersionLabel, VersionTag, Versioned, Versioner, VersioningConfig,
};
