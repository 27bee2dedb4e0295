//! TestClient for integration testing without network binding
//!
//! This module provides a test client that sends simulated HTTP requests
//! through the compiled route table of an [`App`] without starting a real
//! server.
//!
//! # Example
//!
//! ```rust,ignore
//! use verapi_core::{get, version, App, TestClient, VersioningConfig};
//!
//! async fn list_cookies() -> &'static str {
//!     "cookies"
//! }
//!
//! #[tokio::test]
//! async fn test_versioned_cookies() {
//!     let mut app = App::new().route("/cookies", get(version([2], list_cookies)));
//!     app.versionize(VersioningConfig::default()).unwrap();
//!     let client = TestClient::new(app);
//!
//!     let response = client.get("/v2/cookies").await;
//!     response.assert_status(200);
//!     assert_eq!(response.text(), "cookies");
//! }
//! ```

use crate::app::App;
use crate::error::BuildError;
use crate::response::Response;
use crate::router::Dispatcher;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use http_body_util::BodyExt;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Test client for integration testing without network binding
pub struct TestClient {
    dispatcher: Arc<Dispatcher>,
}

impl TestClient {
    /// Create a new test client from an App
    ///
    /// # Panics
    ///
    /// Panics if the app fails to build, see [`TestClient::try_new`].
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let app = App::new().route("/", get(handler));
    /// let client = TestClient::new(app);
    /// ```
    pub fn new(app: App) -> Self {
        match Self::try_new(app) {
            Ok(client) => client,
            Err(err) => panic!("Failed to build app: {}", err),
        }
    }

    /// Create a new test client, returning the build error if any
    pub fn try_new(app: App) -> Result<Self, BuildError> {
        Ok(Self {
            dispatcher: Arc::new(app.into_dispatcher()?),
        })
    }

    /// Send a GET request
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let response = client.get("/v1/cookies").await;
    /// ```
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(TestRequest::get(path)).await
    }

    /// Send a POST request with JSON body
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let response = client.post_json("/v1/cookies", &NewCookie { name: "Oatmeal" }).await;
    /// ```
    pub async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> TestResponse {
        self.request(TestRequest::post(path).json(body)).await
    }

    /// Send a request with full control
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let response = client.request(
    ///     TestRequest::put("/v1/cookies/1")
    ///         .header("Authorization", "Bearer token")
    ///         .json(&NewCookie { name: "Oatmeal" })
    /// ).await;
    /// ```
    pub async fn request(&self, req: TestRequest) -> TestResponse {
        let mut http_req = http::Request::new(());
        *http_req.method_mut() = req.method;
        *http_req.uri_mut() = req.path.parse().unwrap_or_default();
        *http_req.headers_mut() = req.headers;
        let (parts, _) = http_req.into_parts();

        let response = self
            .dispatcher
            .dispatch(parts, req.body.unwrap_or_default())
            .await;

        TestResponse::from_response(response).await
    }
}

/// Test request builder
///
/// Provides a fluent API for building test requests with custom methods,
/// headers, and body content.
#[derive(Debug, Clone)]
pub struct TestRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl TestRequest {
    /// Create a new request with the given method and path
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a PUT request
    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Create a PATCH request
    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Create a DELETE request
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a header to the request
    pub fn header(mut self, key: &str, value: &str) -> Self {
        if let (Ok(name), Ok(val)) = (
            key.parse::<http::header::HeaderName>(),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, val);
        }
        self
    }

    /// Set the request body as JSON
    ///
    /// This automatically sets the Content-Type header to `application/json`.
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        if let Ok(bytes) = serde_json::to_vec(body) {
            self.body = Some(Bytes::from(bytes));
            self.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }
        self
    }

    /// Set the request body as raw bytes
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Test response with assertion helpers
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    async fn from_response(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map(|b| b.to_bytes())
            .unwrap_or_default();

        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Get the response status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the response body as bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Get the response body as a string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse the response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Assert that the response has the expected status code
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// response.assert_status(200);
    /// ```
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Assert that the response has the expected header value
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, key: &str, expected: &str) -> &Self {
        let actual = self
            .headers
            .get(key)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        assert_eq!(
            actual, expected,
            "Expected header '{}' to be '{}', got '{}'",
            key, expected, actual
        );
        self
    }

    /// Assert that the response body contains the expected string
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't contain the expected string.
    pub fn assert_body_contains(&self, expected: &str) -> &Self {
        let body = self.text();
        assert!(
            body.contains(expected),
            "Expected body to contain '{}', got '{}'",
            expected,
            body
        );
        self
    }
}
