//! API Middleware
//!
//! Request context and access logging.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::domain::OperationContext;

/// Header carrying the caller's correlation id, echoed on the response
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extract the correlation id sent by the caller, if it is a valid UUID
pub fn correlation_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
}

// =========================================================================
// Context middleware
// =========================================================================

/// Attach an `OperationContext` to every request and echo its correlation id
pub async fn context_middleware(mut request: Request<Body>, next: Next) -> Response {
    let mut context = OperationContext::new();
    if let Some(correlation_id) = correlation_id_from_headers(request.headers()) {
        context = context.with_correlation_id(correlation_id);
    }
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        context = context.with_client_ip(addr.ip());
    }
    let correlation_id = context.ensure_correlation_id();

    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

// =========================================================================
// Logging middleware
// =========================================================================

/// Log request and response with timing
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let correlation_id = request
        .extensions()
        .get::<OperationContext>()
        .and_then(|ctx| ctx.correlation_id);

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        correlation_id = ?correlation_id,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}
