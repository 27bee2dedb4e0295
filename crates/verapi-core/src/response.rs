//! Response types for VerAPI
//!
//! This module provides types for building HTTP responses. The core trait is
//! [`IntoResponse`], which allows any type to be converted into an HTTP response.
//!
//! # Built-in Response Types
//!
//! | Type | Status | Content-Type | Description |
//! |------|--------|--------------|-------------|
//! | `String` / `&str` | 200 | text/plain | Plain text response |
//! | `()` | 200 | - | Empty response |
//! | [`Json<T>`] | 200 | application/json | JSON response |
//! | [`Created<T>`] | 201 | application/json | Created resource |
//! | [`NoContent`] | 204 | - | No content response |
//! | [`Html<T>`] | 200 | text/html | HTML response |
//! | [`WithStatus<T, N>`] | N | varies | Custom status code |
//! | [`ApiError`] | varies | application/json | Error response |
//!
//! Tuples `(StatusCode, R)` and `(StatusCode, HeaderMap, R)` override the
//! status and headers of `R`.

use crate::error::{ApiError, ErrorResponse};
use crate::extract::Json;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::Full;
use serde::Serialize;

/// HTTP Response type
pub type Response = http::Response<Full<Bytes>>;

/// Trait for types that can be converted into an HTTP response
pub trait IntoResponse {
    /// Convert self into a Response
    fn into_response(self) -> Response;
}

fn body_response(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> Response {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => body_response(status, Some("application/json"), Bytes::from(body)),
        Err(err) => ApiError::internal("Failed to serialize response")
            .with_internal(err.to_string())
            .into_response(),
    }
}

// Implement for Response itself
impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

// Implement for () - returns 200 OK with empty body
impl IntoResponse for () {
    fn into_response(self) -> Response {
        body_response(StatusCode::OK, None, Bytes::new())
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        body_response(
            StatusCode::OK,
            Some("text/plain; charset=utf-8"),
            Bytes::from_static(self.as_bytes()),
        )
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        body_response(
            StatusCode::OK,
            Some("text/plain; charset=utf-8"),
            Bytes::from(self),
        )
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Response {
        body_response(self, None, Bytes::new())
    }
}

// Implement for (StatusCode, impl IntoResponse)
impl<R: IntoResponse> IntoResponse for (StatusCode, R) {
    fn into_response(self) -> Response {
        let mut response = self.1.into_response();
        *response.status_mut() = self.0;
        response
    }
}

// Implement for (StatusCode, HeaderMap, impl IntoResponse)
impl<R: IntoResponse> IntoResponse for (StatusCode, HeaderMap, R) {
    fn into_response(self) -> Response {
        let mut response = self.2.into_response();
        *response.status_mut() = self.0;
        response.headers_mut().extend(self.1);
        response
    }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let error_response = ErrorResponse::from(self);
        let body = serde_json::to_vec(&error_response).unwrap_or_else(|_| {
            br#"{"error":{"type":"internal_error","message":"Failed to serialize error"}}"#
                .to_vec()
        });

        body_response(status, Some("application/json"), Bytes::from(body))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        json_response(StatusCode::OK, &self.0)
    }
}

/// 201 Created response wrapper
///
/// Returns HTTP 201 with JSON body.
#[derive(Debug, Clone)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        json_response(StatusCode::CREATED, &self.0)
    }
}

/// 204 No Content response
#[derive(Debug, Clone, Copy)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        body_response(StatusCode::NO_CONTENT, None, Bytes::new())
    }
}

/// HTML response wrapper
#[derive(Debug, Clone)]
pub struct Html<T>(pub T);

impl<T: Into<String>> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        body_response(
            StatusCode::OK,
            Some("text/html; charset=utf-8"),
            Bytes::from(self.0.into()),
        )
    }
}

/// Response with a status code fixed at compile time
///
/// ```rust,ignore
/// async fn accepted() -> WithStatus<&'static str, 202> {
///     WithStatus("queued for baking")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct WithStatus<T, const CODE: u16>(pub T);

impl<T: IntoResponse, const CODE: u16> IntoResponse for WithStatus<T, CODE> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        if let Ok(status) = StatusCode::from_u16(CODE) {
            *response.status_mut() = status;
        }
        response
    }
}
