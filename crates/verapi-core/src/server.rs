//! HTTP server implementation

use crate::error::ApiError;
use crate::response::{IntoResponse, Response};
use crate::router::Dispatcher;
use http::StatusCode;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Internal server struct
pub(crate) struct Server {
    dispatcher: Arc<Dispatcher>,
}

impl Server {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Run the server
    pub async fn run(self, addr: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = addr.parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!(routes = self.dispatcher.len(), "VerAPI server running on http://{}", addr);

        loop {
            let (stream, _remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let dispatcher = self.dispatcher.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: hyper::Request<Incoming>| {
                    let dispatcher = dispatcher.clone();
                    async move { Ok::<_, Infallible>(handle_request(dispatcher, req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Connection error: {}", err);
                }
            });
        }
    }
}

/// Handle a single HTTP request
async fn handle_request(dispatcher: Arc<Dispatcher>, req: hyper::Request<Incoming>) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = std::time::Instant::now();

    let (parts, body) = req.into_parts();
    let response = match body.collect().await {
        Ok(collected) => dispatcher.dispatch(parts, collected.to_bytes()).await,
        Err(err) => ApiError::bad_request("Failed to read request body")
            .with_internal(err.to_string())
            .into_response(),
    };

    log_request(&method, &path, response.status(), start);
    response
}

/// Log request completion
fn log_request(method: &http::Method, path: &str, status: StatusCode, start: std::time::Instant) {
    let elapsed = start.elapsed();

    if status.is_success() {
        info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request completed"
        );
    } else {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request failed"
        );
    }
}
