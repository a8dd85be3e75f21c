//! Request middleware: CORS headers and access logging.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::info;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "content-type";

/// Shared CORS configuration for the middleware.
#[derive(Clone)]
pub struct CorsState {
    pub allow_origin: HeaderValue,
}

impl CorsState {
    pub fn new(origin: &str) -> anyhow::Result<Self> {
        let allow_origin = HeaderValue::from_str(origin)
            .map_err(|e| anyhow::anyhow!("invalid CORS origin {:?}: {}", origin, e))?;
        Ok(Self { allow_origin })
    }
}

/// Answers preflight `OPTIONS` requests for mounted routes and stamps the
/// allowed origin on every other response.
///
/// No route handles `OPTIONS`, so the router's own reply tells mounted
/// paths (405) apart from unknown ones (404).
pub async fn cors_middleware(
    State(cors): State<Arc<CorsState>>,
    request: Request,
    next: Next,
) -> Response {
    let preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;

    if preflight && response.status() != StatusCode::NOT_FOUND {
        response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    }
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, cors.allow_origin.clone());
    response
}

/// Logs method, path, status and latency of every request.
pub async fn log_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}
